//! Configuration Management
//!
//! Persistent configuration for gcevm: the default project and the
//! defaults table applied to properties a request leaves out.

use crate::resource::Defaults;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variables consulted for a project, in order
const PROJECT_ENV_VARS: &[&str] = &["CLOUDSDK_CORE_PROJECT", "GOOGLE_CLOUD_PROJECT", "GCLOUD_PROJECT"];

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Project used when a request does not name one
    #[serde(default)]
    pub project_id: Option<String>,
    /// Overrides for the built-in defaults
    #[serde(default)]
    pub defaults: Defaults,
    /// File this config was loaded from
    #[serde(skip)]
    pub(crate) path: Option<PathBuf>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gcevm").join("config.json"))
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from `path`, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        let mut config = if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    tracing::warn!("Ignoring unreadable config {:?}: {}", path, e);
                    Self::default()
                }),
                Err(_) => Self::default(),
            }
        } else {
            Self::default()
        };
        config.path = Some(path.to_path_buf());
        config
    }

    /// Save configuration back to the file it was loaded from
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Get effective project (config > environment)
    pub fn effective_project(&self) -> Option<String> {
        self.project_id.clone().or_else(default_project_from_env)
    }

    /// Set project and save
    pub fn set_project(&mut self, project_id: &str) -> Result<()> {
        if !validate_project_id(project_id) {
            return Err(anyhow::anyhow!("Invalid project ID: {}", project_id));
        }
        self.project_id = Some(project_id.to_string());
        self.save()
    }

    /// Set default zone and save
    pub fn set_zone(&mut self, zone: &str) -> Result<()> {
        if zone.split('-').count() < 3 {
            return Err(anyhow::anyhow!("Invalid zone: {}", zone));
        }
        self.defaults.zone = zone.to_string();
        self.save()
    }
}

/// Validate a GCP project ID format
/// Project IDs must be 6-30 characters, lowercase letters, digits, and hyphens
/// Must start with a letter and cannot end with a hyphen
pub fn validate_project_id(project: &str) -> bool {
    if project.len() < 6 || project.len() > 30 {
        return false;
    }

    let mut chars = project.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }

    if project.ends_with('-') {
        return false;
    }

    project
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Read the default project from the gcloud environment variables
fn default_project_from_env() -> Option<String> {
    for var in PROJECT_ENV_VARS {
        if let Ok(project) = std::env::var(var) {
            if validate_project_id(&project) {
                return Some(project);
            }
            tracing::warn!("Invalid project ID format in {}", var);
        }
    }
    None
}
