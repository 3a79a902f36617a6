//! Errors
//!
//! Validation failures raised while generating resources, and the
//! formatting applied before they reach the user.

/// A generation pass was rejected; nothing is emitted
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("\"sourceImage\" is a mandatory property")]
    MissingSourceImage,
    #[error("deviceName or diskName is needed for each disk at index {index} that has no source")]
    UnnamedDisk { index: usize },
    #[error("name \"{0}\" is used by more than one resource")]
    DuplicateDiskName(String),
    #[error("property \"{0}\" is generated and cannot be set directly")]
    ReservedProperty(String),
    #[error("reference to \"{0}\" does not resolve to a resource in this deployment")]
    UnresolvedReference(String),
}

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Format a generation error for display
///
/// Every failure reaching the CLI goes through here so messages share one
/// shape regardless of where they were raised.
pub fn format_error(error: &anyhow::Error) -> String {
    if let Some(validation) = error.downcast_ref::<ValidationError>() {
        return format!("Invalid deployment properties: {}", validation);
    }
    if let Some(yaml) = error.downcast_ref::<serde_yaml::Error>() {
        return format!("Malformed request document: {}", yaml);
    }
    if let Some(json) = error.downcast_ref::<serde_json::Error>() {
        return format!("Malformed request document: {}", json);
    }

    // Keep the outermost context, then the root cause
    let root = error.root_cause().to_string();
    let top = error.to_string();
    if top == root {
        format!("Error: {}", top)
    } else {
        format!("Error: {}: {}", top, root)
    }
}
