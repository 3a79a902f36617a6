//! Disk Resolver
//!
//! Splits the disks declared on an instance into pre-existing disks, which
//! are attached by their `source`, and disks this pass creates as standalone
//! resources. Attachments keep the input order.

use super::defaults::Defaults;
use super::descriptor::{AttachedDisk, DiskProperties, DiskSource, Resource};
use super::properties::MetadataItem;
use crate::error::{Result, ValidationError};
use crate::gcp::links::{referenced_name, ComputeLinks};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Metadata key listing the disks created for the instance
pub const ATTACHED_DISKS: &str = "ATTACHED_DISKS";

/// Parameters for a disk that must be created
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    #[serde(default, alias = "sizeGb", skip_serializing_if = "Option::is_none")]
    pub disk_size_gb: Option<u64>,
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub disk_type: Option<String>,
}

/// A disk as declared by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_name: Option<String>,
    /// Link or reference to a disk that already exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initialize_params: Option<InitializeParams>,
}

/// Creation parameters with defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInitializeParams {
    pub disk_size_gb: u64,
    pub disk_type: String,
}

/// Where an attached disk comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiskOrigin {
    /// Attach the disk behind this link or reference
    Existing(String),
    /// Create a standalone disk resource
    Create(ResolvedInitializeParams),
}

/// A disk with defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDisk {
    pub device_name: Option<String>,
    pub disk_name: Option<String>,
    pub origin: DiskOrigin,
}

impl DiskSpec {
    /// Fill in creation defaults; a disk with a source is attached as-is
    pub fn resolve(&self, defaults: &Defaults) -> ResolvedDisk {
        let origin = match &self.source {
            Some(source) => DiskOrigin::Existing(source.clone()),
            None => {
                let params = self.initialize_params.clone().unwrap_or_default();
                DiskOrigin::Create(ResolvedInitializeParams {
                    disk_size_gb: params.disk_size_gb.unwrap_or(defaults.data_disk_size_gb),
                    disk_type: params
                        .disk_type
                        .unwrap_or_else(|| defaults.disk_type.clone()),
                })
            }
        };

        ResolvedDisk {
            device_name: self.device_name.clone(),
            disk_name: self.disk_name.clone(),
            origin,
        }
    }
}

impl From<ResolvedDisk> for DiskSpec {
    fn from(disk: ResolvedDisk) -> Self {
        let (source, initialize_params) = match disk.origin {
            DiskOrigin::Existing(source) => (Some(source), None),
            DiskOrigin::Create(params) => (
                None,
                Some(InitializeParams {
                    disk_size_gb: Some(params.disk_size_gb),
                    disk_type: Some(params.disk_type),
                }),
            ),
        };
        Self {
            device_name: disk.device_name,
            disk_name: disk.disk_name,
            source,
            initialize_params,
        }
    }
}

impl ResolvedDisk {
    /// `diskName` if given, otherwise `deviceName`
    pub fn name(&self) -> Option<&str> {
        self.disk_name.as_deref().or(self.device_name.as_deref())
    }
}

/// Output of [`resolve_disks`]
#[derive(Debug, Clone, PartialEq)]
pub struct DiskPlan {
    /// One entry per declared disk, input order
    pub attachments: Vec<AttachedDisk>,
    /// The accumulator passed in, followed by the disks created here
    pub disk_resources: Vec<Resource>,
    /// Names of the created disks, for the instance metadata
    pub attached_disks: MetadataItem,
}

/// Resolve every declared disk into an attachment entry
///
/// New disk resources are appended to `accumulator`. Its existing entries
/// take part in the duplicate-name check.
pub fn resolve_disks(
    links: &ComputeLinks,
    disks: &[ResolvedDisk],
    accumulator: Vec<Resource>,
) -> Result<DiskPlan> {
    let mut disk_resources = accumulator;
    let mut taken: HashSet<String> = disk_resources.iter().map(|r| r.name.clone()).collect();
    let mut created = Vec::new();
    let mut attachments = Vec::with_capacity(disks.len());

    for (index, disk) in disks.iter().enumerate() {
        let attachment = match &disk.origin {
            DiskOrigin::Existing(source) => {
                let device_name = disk
                    .name()
                    .map(str::to_string)
                    .unwrap_or_else(|| device_name_from_source(source));
                tracing::debug!("Attaching existing disk {} as {}", source, device_name);
                AttachedDisk::data(&device_name, DiskSource::Existing(source.clone()))
            }
            DiskOrigin::Create(params) => {
                let Some(name) = disk.name() else {
                    return Err(ValidationError::UnnamedDisk { index });
                };
                if !taken.insert(name.to_string()) {
                    return Err(ValidationError::DuplicateDiskName(name.to_string()));
                }
                tracing::debug!(
                    "Creating disk {} ({} GB, {})",
                    name,
                    params.disk_size_gb,
                    params.disk_type
                );
                disk_resources.push(Resource::disk(
                    name,
                    DiskProperties {
                        disk_type: links.zonal_link("diskTypes", &params.disk_type),
                        size_gb: params.disk_size_gb,
                        zone: links.zone.clone(),
                    },
                ));
                created.push(name.to_string());
                AttachedDisk::data(name, DiskSource::Created(name.to_string()))
            }
        };
        attachments.push(attachment);
    }

    Ok(DiskPlan {
        attachments,
        disk_resources,
        attached_disks: MetadataItem {
            key: ATTACHED_DISKS.to_string(),
            value: created.join(","),
        },
    })
}

/// Device name for an unnamed existing disk: the referenced resource name,
/// or the last segment of its link
fn device_name_from_source(source: &str) -> String {
    if let Some(name) = referenced_name(source) {
        return name.to_string();
    }
    source
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(source)
        .to_string()
}
