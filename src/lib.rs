//! gcevm
//!
//! Expands a sparse VM property set into the Compute Engine resources a
//! deployment needs: the instance, its boot disk and any data disks.

pub mod config;
pub mod error;
pub mod gcp;
pub mod request;
pub mod resource;

pub use error::{format_error, ValidationError};
pub use resource::{generate_resource_list, make_resource, Context, Defaults, OutputFormat};
