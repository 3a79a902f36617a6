//! Link and name builders
//!
//! These formats are resolved by the provisioning engine at apply time and
//! must not change.

/// Compute Engine API base for fully-qualified links
pub const COMPUTE_URL_BASE: &str = "https://www.googleapis.com/compute/v1/";

/// Prefix of a deployment-internal reference
pub const REFERENCE_PREFIX: &str = "$(ref.";

/// Project hosting the public click-to-deploy images
pub const C2D_IMAGES: &str = "click-to-deploy-images";

/// Builds links scoped to one project and zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeLinks {
    pub project: String,
    pub zone: String,
}

impl ComputeLinks {
    pub fn new(project: &str, zone: &str) -> Self {
        Self {
            project: project.to_string(),
            zone: zone.to_string(),
        }
    }

    /// Build a project-scoped Compute Engine link
    pub fn compute_url(&self, path: &str) -> String {
        format!("{}projects/{}/{}", COMPUTE_URL_BASE, self.project, path)
    }

    /// Build a zonal link, e.g. `.../zones/us-central1-f/machineTypes/n1-standard-1`
    pub fn zonal_url(&self, collection: &str, name: &str) -> String {
        self.compute_url(&format!("zones/{}/{}/{}", self.zone, collection, name))
    }

    /// Build a global link, e.g. `.../global/networks/default`
    pub fn global_url(&self, collection: &str, name: &str) -> String {
        self.compute_url(&format!("global/{}/{}", collection, name))
    }

    /// Zonal link unless `value` already is a link or a reference
    pub fn zonal_link(&self, collection: &str, value: &str) -> String {
        if is_compute_link(value) {
            value.to_string()
        } else {
            self.zonal_url(collection, value)
        }
    }

    /// Global link unless `value` already is a link or a reference
    pub fn global_link(&self, collection: &str, value: &str) -> String {
        if is_compute_link(value) {
            value.to_string()
        } else {
            self.global_url(collection, value)
        }
    }
}

/// True for fully-qualified compute links and deployment references
pub fn is_compute_link(value: &str) -> bool {
    value.starts_with(COMPUTE_URL_BASE) || value.starts_with(REFERENCE_PREFIX)
}

/// Reference to the `selfLink` of another resource in the same deployment
pub fn reference(name: &str) -> String {
    format!("{}{}.selfLink)", REFERENCE_PREFIX, name)
}

/// Name of the resource a reference points to, if `value` is a reference
pub fn referenced_name(value: &str) -> Option<&str> {
    let inner = value.strip_prefix(REFERENCE_PREFIX)?.strip_suffix(')')?;
    let name = inner.split('.').next()?;
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Deterministic name: `<base>-<parts...>-<suffix>`
///
/// `auto_name("web", &["boot"], "disk")` yields `web-boot-disk`.
pub fn auto_name(base: &str, parts: &[&str], suffix: &str) -> String {
    let mut segments: Vec<&str> = parts.to_vec();
    segments.push(suffix);
    format!("{}-{}", base, segments.join("-"))
}

/// Resolve a source image to the link handed to the boot disk
pub fn image_link(image: &str, dev_mode: bool) -> String {
    if image.starts_with("projects/") || image.starts_with("global/") || image.starts_with("http")
    {
        image.to_string()
    } else if dev_mode {
        format!("global/images/{}", image)
    } else {
        ComputeLinks::new(C2D_IMAGES, "").global_url("images", image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links() -> ComputeLinks {
        ComputeLinks::new("my-project", "us-central1-f")
    }

    #[test]
    fn test_zonal_url_format() {
        assert_eq!(
            links().zonal_url("machineTypes", "n1-standard-1"),
            "https://www.googleapis.com/compute/v1/projects/my-project/zones/us-central1-f/machineTypes/n1-standard-1"
        );
    }

    #[test]
    fn test_global_url_format() {
        assert_eq!(
            links().global_url("networks", "default"),
            "https://www.googleapis.com/compute/v1/projects/my-project/global/networks/default"
        );
    }

    #[test]
    fn test_existing_links_are_not_rewrapped() {
        let full = "https://www.googleapis.com/compute/v1/projects/other/global/networks/vpc";
        assert_eq!(links().global_link("networks", full), full);
        assert_eq!(
            links().zonal_link("diskTypes", "$(ref.custom.selfLink)"),
            "$(ref.custom.selfLink)"
        );
    }

    #[test]
    fn test_reference_round_trip() {
        let r = reference("data1");
        assert_eq!(r, "$(ref.data1.selfLink)");
        assert_eq!(referenced_name(&r), Some("data1"));
        assert_eq!(referenced_name("$(ref.net.selfLink)"), Some("net"));
        assert_eq!(referenced_name("projects/p/zones/z/disks/d"), None);
        assert_eq!(referenced_name("$(ref.)"), None);
    }

    #[test]
    fn test_auto_name() {
        assert_eq!(auto_name("web", &[], "vm"), "web-vm");
        assert_eq!(auto_name("web", &["boot"], "disk"), "web-boot-disk");
    }

    #[test]
    fn test_image_link_variants() {
        assert_eq!(
            image_link("debian-9", false),
            "https://www.googleapis.com/compute/v1/projects/click-to-deploy-images/global/images/debian-9"
        );
        assert_eq!(image_link("debian-9", true), "global/images/debian-9");
        assert_eq!(
            image_link("projects/debian-cloud/global/images/family/debian-12", false),
            "projects/debian-cloud/global/images/family/debian-12"
        );
        assert_eq!(image_link("global/images/mine", true), "global/images/mine");
        let url = "https://www.googleapis.com/compute/v1/projects/x/global/images/y";
        assert_eq!(image_link(url, false), url);
    }
}
