//! Request documents
//!
//! The CLI reads a YAML or JSON document of the form
//! `{env: {name, project}, properties: {...}}` and turns it into a
//! [`Context`], filling gaps in `env` from flags and configuration.

use crate::config::Config;
use crate::resource::{Context, Env, Properties};
use anyhow::{Context as _, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestEnv {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestDocument {
    #[serde(default)]
    pub env: RequestEnv,
    #[serde(default)]
    pub properties: Properties,
}

impl RequestDocument {
    /// Parse a request; JSON is accepted as YAML
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let document = serde_yaml::from_str(text)?;
        Ok(document)
    }

    /// Build the generation context
    ///
    /// Flags win over the document; the project falls back to the
    /// configured one.
    pub fn into_context(
        self,
        name: Option<&str>,
        project: Option<&str>,
        config: &Config,
    ) -> Result<Context> {
        let name = name
            .map(str::to_string)
            .or(self.env.name)
            .context("Request has no deployment name. Set env.name or use --name")?;
        let project = project
            .map(str::to_string)
            .or(self.env.project)
            .or_else(|| config.effective_project())
            .context("No GCP project configured. Set env.project or use --project flag")?;

        tracing::debug!("Request context: name={}, project={}", name, project);

        Ok(Context {
            env: Env { name, project },
            properties: self.properties,
        })
    }
}
