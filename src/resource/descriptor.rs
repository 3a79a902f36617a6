//! Resource descriptors
//!
//! The uniform `{name, type, properties}` unit handed to the provisioning
//! engine. Descriptors point at each other only through name references.

use super::kind::ResourceType;
use super::properties::{Metadata, ServiceAccount, Tags};
use crate::gcp::links::reference;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Attachment type of every disk the generator emits
pub const PERSISTENT: &str = "PERSISTENT";

/// Instance property keys the generator writes itself
pub const INSTANCE_FIELDS: &[&str] = &[
    "zone",
    "machineType",
    "canIpForward",
    "disks",
    "networkInterfaces",
    "tags",
    "metadata",
    "serviceAccounts",
];

/// One entry of the resource list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub properties: ResourceProperties,
}

impl Resource {
    pub fn instance(name: &str, properties: InstanceProperties) -> Self {
        Self {
            name: name.to_string(),
            resource_type: ResourceType::Instance,
            properties: ResourceProperties::Instance(Box::new(properties)),
        }
    }

    pub fn disk(name: &str, properties: DiskProperties) -> Self {
        Self {
            name: name.to_string(),
            resource_type: ResourceType::Disk,
            properties: ResourceProperties::Disk(properties),
        }
    }

    /// Instance payload, if this is an instance built by the generator
    pub fn as_instance(&self) -> Option<&InstanceProperties> {
        match &self.properties {
            ResourceProperties::Instance(props) => Some(props.as_ref()),
            _ => None,
        }
    }
}

/// Type-specific payload
///
/// Descriptors read from input (caller-supplied disk resources) always
/// deserialize as `Verbatim` and are written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResourceProperties {
    Instance(Box<InstanceProperties>),
    Disk(DiskProperties),
    Verbatim(Map<String, Value>),
}

impl<'de> Deserialize<'de> for ResourceProperties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::deserialize(deserializer).map(Self::Verbatim)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceProperties {
    pub zone: String,
    pub machine_type: String,
    pub can_ip_forward: bool,
    /// Boot disk first when present
    pub disks: Vec<AttachedDisk>,
    pub network_interfaces: Vec<NetworkInterface>,
    pub tags: Tags,
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_accounts: Option<Vec<ServiceAccount>>,
    /// Caller properties forwarded without interpretation
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    pub network: String,
    pub access_configs: Vec<AccessConfig>,
}

impl NetworkInterface {
    /// Interface on `network` with an ephemeral external address
    pub fn with_external_nat(network: String) -> Self {
        Self {
            network,
            access_configs: vec![AccessConfig::external_nat()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub access_type: String,
}

impl AccessConfig {
    pub fn external_nat() -> Self {
        Self {
            name: "External NAT".to_string(),
            access_type: "ONE_TO_ONE_NAT".to_string(),
        }
    }
}

/// Properties of a standalone disk resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskProperties {
    /// Zonal `diskTypes` link
    #[serde(rename = "type")]
    pub disk_type: String,
    pub size_gb: u64,
    pub zone: String,
}

/// Where an attachment's disk comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiskSource {
    /// Link or reference supplied by the caller, emitted verbatim
    Existing(String),
    /// Name of a disk resource created in the same batch
    Created(String),
}

impl Serialize for DiskSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Existing(link) => serializer.serialize_str(link),
            Self::Created(name) => serializer.serialize_str(&reference(name)),
        }
    }
}

/// Parameters of the boot disk created with the instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootDiskParams {
    pub disk_type: String,
    pub disk_size_gb: u64,
    pub source_image: String,
}

/// Instance-side record of a mounted disk
///
/// Carries either a `source` or, for the boot disk, `initializeParams`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedDisk {
    pub device_name: String,
    pub auto_delete: bool,
    pub boot: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<DiskSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initialize_params: Option<BootDiskParams>,
    #[serde(rename = "type")]
    pub attachment_type: String,
}

impl AttachedDisk {
    /// Boot disk created from an image and deleted with the instance
    pub fn boot(device_name: &str, params: BootDiskParams) -> Self {
        Self {
            device_name: device_name.to_string(),
            auto_delete: true,
            boot: true,
            source: None,
            initialize_params: Some(params),
            attachment_type: PERSISTENT.to_string(),
        }
    }

    pub fn data(device_name: &str, source: DiskSource) -> Self {
        Self {
            device_name: device_name.to_string(),
            auto_delete: true,
            boot: false,
            source: Some(source),
            initialize_params: None,
            attachment_type: PERSISTENT.to_string(),
        }
    }
}
