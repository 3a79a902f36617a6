//! Compute Engine naming
//!
//! String formats shared with the provisioning engine: fully-qualified
//! compute links, deployment-internal references and generated names.
//!
//! # Module Structure
//!
//! - [`links`] - Zonal/global link builders, references, auto names
//!
//! # Example
//!
//! ```
//! use gcevm::gcp::links::{reference, ComputeLinks};
//!
//! let links = ComputeLinks::new("my-project", "us-central1-f");
//! assert_eq!(
//!     links.global_url("networks", "default"),
//!     "https://www.googleapis.com/compute/v1/projects/my-project/global/networks/default"
//! );
//! assert_eq!(reference("data1"), "$(ref.data1.selfLink)");
//! ```

pub mod links;
