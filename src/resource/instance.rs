//! Instance Resolver
//!
//! Builds the VM instance descriptor from resolved properties.

use super::descriptor::{
    AttachedDisk, BootDiskParams, InstanceProperties, NetworkInterface, Resource, INSTANCE_FIELDS,
};
use super::disks::resolve_disks;
use super::kind::ResourceType;
use super::properties::{Env, ResolvedProperties};
use crate::error::{Result, ValidationError};
use crate::gcp::links::{auto_name, image_link, ComputeLinks};

/// Build the instance descriptor
///
/// Returns the instance together with the disk resources to emit beside
/// it: caller-supplied `diskResources` first, then disks created here.
pub fn generate_instance(
    env: &Env,
    resolved: &ResolvedProperties,
) -> Result<(Resource, Vec<Resource>)> {
    let source_image = match (&resolved.source_image, resolved.provide_boot) {
        (None, true) => return Err(ValidationError::MissingSourceImage),
        (image, _) => image.as_deref(),
    };

    if let Some(key) = resolved.extra.keys().find(|k| INSTANCE_FIELDS.contains(&k.as_str())) {
        return Err(ValidationError::ReservedProperty(key.clone()));
    }

    let links = ComputeLinks::new(&env.project, &resolved.zone);
    let mut metadata = resolved.metadata.clone();

    let (mut disks, disk_resources) = if resolved.disks.is_empty() {
        (Vec::new(), resolved.disk_resources.clone())
    } else {
        let plan = resolve_disks(&links, &resolved.disks, resolved.disk_resources.clone())?;
        metadata.push(plan.attached_disks);
        (plan.attachments, plan.disk_resources)
    };

    // Resources resolve by name, so no disk may share the instance's
    if disk_resources.iter().any(|r| r.name == resolved.instance_name) {
        return Err(ValidationError::DuplicateDiskName(resolved.instance_name.clone()));
    }

    if let (true, Some(image)) = (resolved.provide_boot, source_image) {
        let boot_name = auto_name(&env.name, &["boot"], ResourceType::Disk.short_name());
        let boot = AttachedDisk::boot(
            &boot_name,
            BootDiskParams {
                disk_type: links.zonal_link("diskTypes", &resolved.disk_type),
                disk_size_gb: resolved.boot_disk_size_gb,
                source_image: image_link(image, resolved.dev_image),
            },
        );
        disks.insert(0, boot);
    } else {
        tracing::debug!("Boot disk provisioning disabled for {}", resolved.instance_name);
    }

    let properties = InstanceProperties {
        zone: resolved.zone.clone(),
        machine_type: links.zonal_link("machineTypes", &resolved.machine_type),
        can_ip_forward: resolved.can_ip_forward,
        disks,
        network_interfaces: vec![NetworkInterface::with_external_nat(
            links.global_link("networks", &resolved.network),
        )],
        tags: resolved.tags.clone(),
        metadata,
        service_accounts: resolved.service_accounts.clone(),
        extra: resolved.extra.clone(),
    };

    Ok((
        Resource::instance(&resolved.instance_name, properties),
        disk_resources,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::defaults::Defaults;
    use crate::resource::properties::Properties;
    use serde_json::{json, Value};

    fn env() -> Env {
        Env {
            name: "web".to_string(),
            project: "my-project".to_string(),
        }
    }

    fn build(value: Value) -> Result<(Resource, Vec<Resource>)> {
        let props: Properties = serde_json::from_value(value).unwrap();
        generate_instance(&env(), &props.resolve(&env(), &Defaults::default()))
    }

    #[test]
    fn test_minimal_instance() {
        let (instance, disks) = build(json!({"sourceImage": "debian-9"})).unwrap();
        assert!(disks.is_empty());
        assert_eq!(
            serde_json::to_value(&instance).unwrap(),
            json!({
                "name": "web-vm",
                "type": "compute.v1.instance",
                "properties": {
                    "zone": "us-central1-f",
                    "machineType": "https://www.googleapis.com/compute/v1/projects/my-project/zones/us-central1-f/machineTypes/n1-standard-1",
                    "canIpForward": false,
                    "disks": [{
                        "deviceName": "web-boot-disk",
                        "autoDelete": true,
                        "boot": true,
                        "initializeParams": {
                            "diskType": "https://www.googleapis.com/compute/v1/projects/my-project/zones/us-central1-f/diskTypes/pd-standard",
                            "diskSizeGb": 10,
                            "sourceImage": "https://www.googleapis.com/compute/v1/projects/click-to-deploy-images/global/images/debian-9"
                        },
                        "type": "PERSISTENT"
                    }],
                    "networkInterfaces": [{
                        "network": "https://www.googleapis.com/compute/v1/projects/my-project/global/networks/default",
                        "accessConfigs": [{"name": "External NAT", "type": "ONE_TO_ONE_NAT"}]
                    }],
                    "tags": {"items": []},
                    "metadata": {},
                    "serviceAccounts": [{
                        "email": "default",
                        "scopes": [
                            "https://www.googleapis.com/auth/cloud.useraccounts.readonly",
                            "https://www.googleapis.com/auth/devstorage.read_only",
                            "https://www.googleapis.com/auth/logging.write"
                        ]
                    }]
                }
            })
        );
    }

    #[test]
    fn test_missing_source_image_is_rejected() {
        let err = build(json!({"machineType": "n1-standard-2"})).unwrap_err();
        assert_eq!(err, ValidationError::MissingSourceImage);
    }

    #[test]
    fn test_source_image_optional_without_boot_disk() {
        let (instance, _) = build(json!({
            "provideBoot": false,
            "disks": [{"deviceName": "root", "source": "$(ref.root.selfLink)"}]
        }))
        .unwrap();
        let props = instance.as_instance().unwrap();
        assert_eq!(props.disks.len(), 1);
        assert!(!props.disks[0].boot);
    }

    #[test]
    fn test_boot_disk_is_prepended() {
        let (instance, disks) = build(json!({
            "sourceImage": "debian-9",
            "disks": [{"deviceName": "a"}, {"deviceName": "b", "source": "projects/p/zones/z/disks/b"}]
        }))
        .unwrap();
        let props = instance.as_instance().unwrap();
        let names: Vec<&str> = props.disks.iter().map(|d| d.device_name.as_str()).collect();
        assert_eq!(names, vec!["web-boot-disk", "a", "b"]);
        assert!(props.disks[0].boot);
        assert_eq!(disks.len(), 1);
        assert_eq!(props.metadata.entries().len(), 1);
        assert_eq!(props.metadata.entries()[0].value, "a");
    }

    #[test]
    fn test_dev_image_and_sizes() {
        let (instance, _) = build(json!({
            "sourceImage": "my-image",
            "devImage": true,
            "bootDiskSizeGb": 50,
            "bootDiskType": "pd-ssd"
        }))
        .unwrap();
        let boot = &instance.as_instance().unwrap().disks[0];
        let params = boot.initialize_params.as_ref().unwrap();
        assert_eq!(params.source_image, "global/images/my-image");
        assert_eq!(params.disk_size_gb, 50);
        assert!(params.disk_type.ends_with("/diskTypes/pd-ssd"));
    }

    #[test]
    fn test_links_not_rewrapped() {
        let network = "https://www.googleapis.com/compute/v1/projects/shared/global/networks/vpc";
        let (instance, _) = build(json!({
            "sourceImage": "debian-9",
            "network": network,
            "machineType": "$(ref.custom-type.selfLink)"
        }))
        .unwrap();
        let props = instance.as_instance().unwrap();
        assert_eq!(props.network_interfaces[0].network, network);
        assert_eq!(props.machine_type, "$(ref.custom-type.selfLink)");
    }

    #[test]
    fn test_explicit_name_and_service_accounts() {
        let (instance, _) = build(json!({
            "sourceImage": "debian-9",
            "name": "frontend",
            "serviceAccounts": [{"email": "svc@my-project.iam.gserviceaccount.com", "scopes": ["https://www.googleapis.com/auth/cloud-platform"]}]
        }))
        .unwrap();
        assert_eq!(instance.name, "frontend");
        let accounts = instance.as_instance().unwrap().service_accounts.as_ref().unwrap();
        assert_eq!(accounts[0].email, "svc@my-project.iam.gserviceaccount.com");
    }

    #[test]
    fn test_no_scope_removes_service_accounts_key() {
        let (instance, _) = build(json!({"sourceImage": "debian-9", "noScope": true})).unwrap();
        let value = serde_json::to_value(&instance).unwrap();
        assert!(value["properties"].get("serviceAccounts").is_none());
    }

    #[test]
    fn test_extra_properties_forwarded() {
        let (instance, _) = build(json!({
            "sourceImage": "debian-9",
            "labels": {"env": "prod"},
            "scheduling": {"preemptible": true}
        }))
        .unwrap();
        let value = serde_json::to_value(&instance).unwrap();
        assert_eq!(value["properties"]["labels"], json!({"env": "prod"}));
        assert_eq!(value["properties"]["scheduling"]["preemptible"], true);
    }

    #[test]
    fn test_user_metadata_keeps_items() {
        let (instance, _) = build(json!({
            "sourceImage": "debian-9",
            "metadata": {"items": [{"key": "startup-script", "value": "apt-get update"}]},
            "disks": [{"deviceName": "data"}]
        }))
        .unwrap();
        let value = serde_json::to_value(&instance).unwrap();
        assert_eq!(
            value["properties"]["metadata"]["items"],
            json!([
                {"key": "startup-script", "value": "apt-get update"},
                {"key": "ATTACHED_DISKS", "value": "data"}
            ])
        );
    }

    #[test]
    fn test_generated_keys_cannot_be_passed_through() {
        let err = build(json!({
            "sourceImage": "debian-9",
            "networkInterfaces": [{"network": "x"}]
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::ReservedProperty("networkInterfaces".to_string())
        );
    }

    #[test]
    fn test_disk_named_like_instance_is_rejected() {
        let err = build(json!({"sourceImage": "debian-9", "disks": [{"deviceName": "web-vm"}]}))
            .unwrap_err();
        assert_eq!(err, ValidationError::DuplicateDiskName("web-vm".to_string()));

        let err = build(json!({
            "sourceImage": "debian-9",
            "name": "scratch",
            "diskResources": [{"name": "scratch", "type": "compute.v1.disk", "properties": {}}]
        }))
        .unwrap_err();
        assert_eq!(err, ValidationError::DuplicateDiskName("scratch".to_string()));
    }

    #[test]
    fn test_explicit_empty_metadata_items_kept() {
        let (instance, _) =
            build(json!({"sourceImage": "debian-9", "metadata": {"items": []}})).unwrap();
        let value = serde_json::to_value(&instance).unwrap();
        assert_eq!(value["properties"]["metadata"], json!({"items": []}));
    }
}
