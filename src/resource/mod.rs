//! Resource generation
//!
//! Turns a sparse property set into a complete list of Compute Engine
//! resource descriptors: one VM instance, its boot disk, and a standalone
//! disk resource for every data disk that has to be created.
//!
//! # Architecture
//!
//! - [`properties`] - Request context, user properties and their resolution
//! - [`defaults`] - The defaults table merged under user properties
//! - [`disks`] - Disk Resolver: attachments and standalone disk resources
//! - [`instance`] - Instance Resolver: the VM descriptor
//! - [`generator`] - Full pass, reference check and document serialization
//! - [`descriptor`] / [`kind`] - Output types
//!
//! # Example
//!
//! ```
//! use gcevm::resource::{generate_resource_list, Context, Defaults, Properties};
//!
//! let properties = Properties {
//!     source_image: Some("debian-9".to_string()),
//!     ..Default::default()
//! };
//! let context = Context::new("web", "my-project", properties);
//! let resources = generate_resource_list(&context, &Defaults::default()).unwrap();
//! assert_eq!(resources.len(), 1);
//! assert_eq!(resources[0].name, "web-vm");
//! ```

pub mod defaults;
pub mod descriptor;
pub mod disks;
pub mod generator;
pub mod instance;
pub mod kind;
pub mod properties;

pub use defaults::Defaults;
pub use descriptor::{AttachedDisk, DiskSource, InstanceProperties, Resource, ResourceProperties};
pub use disks::{resolve_disks, DiskPlan, DiskSpec, ATTACHED_DISKS};
pub use generator::{
    check_references, generate, generate_resource_list, make_resource, Generation, OutputFormat,
};
pub use instance::generate_instance;
pub use kind::ResourceType;
pub use properties::{Context, Env, Properties, ResolvedProperties};
