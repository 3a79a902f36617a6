//! Request context and property resolution
//!
//! User properties are sparse. [`Properties::resolve`] merges them over a
//! [`Defaults`] table into [`ResolvedProperties`], which every later step
//! reads. A value the caller supplied is never replaced by a default, so
//! resolving an already resolved set changes nothing.

use super::defaults::{Defaults, DEFAULT_SCOPES};
use super::descriptor::Resource;
use super::disks::{DiskSpec, ResolvedDisk};
use super::kind::ResourceType;
use crate::gcp::links::auto_name;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Deployment environment of a generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Env {
    /// Deployment-level name, base for generated names
    pub name: String,
    pub project: String,
}

/// Everything a generation pass reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub env: Env,
    #[serde(default)]
    pub properties: Properties,
}

impl Context {
    pub fn new(name: &str, project: &str, properties: Properties) -> Self {
        Self {
            env: Env {
                name: name.to_string(),
                project: project.to_string(),
            },
            properties,
        }
    }
}

/// A service account attached to the instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccount {
    pub email: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl ServiceAccount {
    /// The project's default account with the minimal scopes a VM needs
    pub fn default_account() -> Self {
        Self {
            email: "default".to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataItem {
    pub key: String,
    pub value: String,
}

/// Instance metadata; keys other than `items` are forwarded as-is
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// `None` when the caller never supplied `items`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<MetadataItem>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Metadata {
    pub fn entries(&self) -> &[MetadataItem] {
        self.items.as_deref().unwrap_or_default()
    }

    pub fn push(&mut self, item: MetadataItem) {
        self.items.get_or_insert_with(Vec::new).push(item);
    }
}

/// Network tags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tags {
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Caller-supplied properties
///
/// Keys the generator does not interpret land in `extra` and are forwarded
/// verbatim into the instance properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Properties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boot_disk_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boot_disk_size_gb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_ip_forward: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disks: Option<Vec<DiskSpec>>,
    /// Disk resources emitted alongside the instance without changes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_resources: Option<Vec<Resource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    /// Explicit instance name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provide_boot: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_image: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_accounts: Option<Vec<ServiceAccount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_scope: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Effective property set of one generation pass
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProperties {
    pub source_image: Option<String>,
    pub boot_disk_type: String,
    /// Always equal to `boot_disk_type`
    pub disk_type: String,
    pub boot_disk_size_gb: u64,
    pub can_ip_forward: bool,
    pub disks: Vec<ResolvedDisk>,
    pub disk_resources: Vec<Resource>,
    pub machine_type: String,
    pub metadata: Metadata,
    pub network: String,
    pub instance_name: String,
    pub provide_boot: bool,
    pub tags: Tags,
    pub zone: String,
    pub dev_image: bool,
    /// `None` only when `no_scope` is set
    pub service_accounts: Option<Vec<ServiceAccount>>,
    pub no_scope: bool,
    pub extra: Map<String, Value>,
}

impl Properties {
    /// Merge these properties over `defaults`
    pub fn resolve(&self, env: &Env, defaults: &Defaults) -> ResolvedProperties {
        let boot_disk_type = self
            .boot_disk_type
            .clone()
            .or_else(|| self.disk_type.clone())
            .unwrap_or_else(|| defaults.disk_type.clone());

        let instance_name = match &self.name {
            Some(name) => name.clone(),
            None => auto_name(&env.name, &[], ResourceType::Instance.short_name()),
        };

        let no_scope = self.no_scope.unwrap_or(false);
        let service_accounts = if no_scope {
            if self.service_accounts.is_some() {
                tracing::debug!("noScope set, dropping caller-supplied service accounts");
            }
            None
        } else {
            // Cloned per pass so no two outputs share the default account
            Some(
                self.service_accounts
                    .clone()
                    .unwrap_or_else(|| defaults.service_accounts.clone()),
            )
        };

        ResolvedProperties {
            source_image: self.source_image.clone(),
            disk_type: boot_disk_type.clone(),
            boot_disk_type,
            boot_disk_size_gb: self.boot_disk_size_gb.unwrap_or(defaults.boot_disk_size_gb),
            can_ip_forward: self.can_ip_forward.unwrap_or(defaults.can_ip_forward),
            disks: self
                .disks
                .iter()
                .flatten()
                .map(|disk| disk.resolve(defaults))
                .collect(),
            disk_resources: self.disk_resources.clone().unwrap_or_default(),
            machine_type: self
                .machine_type
                .clone()
                .unwrap_or_else(|| defaults.machine_type.clone()),
            metadata: self.metadata.clone().unwrap_or_default(),
            network: self
                .network
                .clone()
                .unwrap_or_else(|| defaults.network.clone()),
            instance_name,
            provide_boot: self.provide_boot.unwrap_or(defaults.provide_boot),
            tags: self.tags.clone().unwrap_or_default(),
            zone: self.zone.clone().unwrap_or_else(|| defaults.zone.clone()),
            dev_image: self.dev_image.unwrap_or(false),
            service_accounts,
            no_scope,
            extra: self.extra.clone(),
        }
    }
}

impl From<ResolvedProperties> for Properties {
    fn from(resolved: ResolvedProperties) -> Self {
        Self {
            source_image: resolved.source_image,
            boot_disk_type: Some(resolved.boot_disk_type),
            disk_type: Some(resolved.disk_type),
            boot_disk_size_gb: Some(resolved.boot_disk_size_gb),
            can_ip_forward: Some(resolved.can_ip_forward),
            disks: Some(resolved.disks.into_iter().map(DiskSpec::from).collect()),
            disk_resources: Some(resolved.disk_resources),
            machine_type: Some(resolved.machine_type),
            metadata: Some(resolved.metadata),
            network: Some(resolved.network),
            name: Some(resolved.instance_name),
            provide_boot: Some(resolved.provide_boot),
            tags: Some(resolved.tags),
            zone: Some(resolved.zone),
            dev_image: Some(resolved.dev_image),
            service_accounts: resolved.service_accounts,
            no_scope: Some(resolved.no_scope),
            extra: resolved.extra,
        }
    }
}
