//! Resource kinds understood by the provisioning engine

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Provider resource type of a descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Instance,
    Disk,
    /// Any type the generator forwards without interpreting
    Other(String),
}

impl ResourceType {
    pub fn from_str(s: &str) -> Self {
        match s {
            "compute.v1.instance" => Self::Instance,
            "compute.v1.disk" => Self::Disk,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Instance => "compute.v1.instance",
            Self::Disk => "compute.v1.disk",
            Self::Other(s) => s,
        }
    }

    /// Suffix used when generating names for this kind
    pub fn short_name(&self) -> &str {
        match self {
            Self::Instance => "vm",
            Self::Disk => "disk",
            Self::Other(s) => s.rsplit('.').next().unwrap_or(s),
        }
    }
}

impl Serialize for ResourceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResourceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_str(&s))
    }
}
