//! Resource list assembly
//!
//! Runs a full generation pass: resolve properties, build the instance and
//! its disks, then check that every disk reference the pass emitted names a
//! resource in the same batch.

use super::defaults::Defaults;
use super::descriptor::{DiskSource, Resource};
use super::instance::generate_instance;
use super::kind::ResourceType;
use super::properties::{Context, ResolvedProperties};
use crate::error::{Result, ValidationError};
use crate::gcp::links::referenced_name;
use anyhow::Context as _;
use serde::Serialize;
use std::collections::HashSet;

/// Serialization format of the resource document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// Result of one generation pass
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    /// Instance first, then disk resources
    pub resources: Vec<Resource>,
    /// Effective property set the resources were built from
    pub properties: ResolvedProperties,
}

/// Generate the resource list for a request
pub fn generate_resource_list(context: &Context, defaults: &Defaults) -> Result<Vec<Resource>> {
    generate(context, defaults).map(|g| g.resources)
}

/// Generate the resource list, keeping the effective properties
pub fn generate(context: &Context, defaults: &Defaults) -> Result<Generation> {
    let properties = context.properties.resolve(&context.env, defaults);
    let (instance, disk_resources) = generate_instance(&context.env, &properties)?;

    let mut resources = Vec::with_capacity(1 + disk_resources.len());
    resources.push(instance);
    resources.extend(disk_resources);

    check_references(&resources)?;

    tracing::info!(
        "Generated {} resources for {} in project {}",
        resources.len(),
        context.env.name,
        context.env.project
    );

    Ok(Generation {
        resources,
        properties,
    })
}

/// Check that every created-disk reference resolves inside `resources`
///
/// References supplied by the caller may point at resources defined
/// elsewhere in the deployment, so those are only logged.
pub fn check_references(resources: &[Resource]) -> Result<()> {
    let disks: HashSet<&str> = resources
        .iter()
        .filter(|r| r.resource_type == ResourceType::Disk)
        .map(|r| r.name.as_str())
        .collect();
    let names: HashSet<&str> = resources.iter().map(|r| r.name.as_str()).collect();

    for instance in resources.iter().filter_map(Resource::as_instance) {
        for disk in &instance.disks {
            match &disk.source {
                Some(DiskSource::Created(name)) if !disks.contains(name.as_str()) => {
                    return Err(ValidationError::UnresolvedReference(name.clone()));
                }
                Some(DiskSource::Existing(source)) => {
                    if let Some(name) = referenced_name(source) {
                        if !names.contains(name) {
                            tracing::warn!(
                                "Disk {} references {} outside this resource list",
                                disk.device_name,
                                name
                            );
                        }
                    }
                }
                _ => {}
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct ResourceDocument<'a> {
    resources: &'a [Resource],
}

/// Serialize resources as a `{resources: [...]}` document
pub fn make_resource(resources: &[Resource], format: OutputFormat) -> anyhow::Result<String> {
    let document = ResourceDocument { resources };
    match format {
        OutputFormat::Yaml => {
            serde_yaml::to_string(&document).context("Failed to serialize resources as YAML")
        }
        OutputFormat::Json => serde_json::to_string_pretty(&document)
            .context("Failed to serialize resources as JSON"),
    }
}
