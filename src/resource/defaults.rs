//! Default values applied to properties the caller leaves out

use super::properties::ServiceAccount;
use serde::{Deserialize, Serialize};

/// Scopes granted to the default service account
pub const DEFAULT_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/cloud.useraccounts.readonly",
    "https://www.googleapis.com/auth/devstorage.read_only",
    "https://www.googleapis.com/auth/logging.write",
];

/// Defaults table
///
/// Every field can be overridden from the config file; keys missing there
/// keep the values below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub disk_type: String,
    pub can_ip_forward: bool,
    pub machine_type: String,
    pub network: String,
    pub zone: String,
    pub provide_boot: bool,
    pub boot_disk_size_gb: u64,
    pub data_disk_size_gb: u64,
    pub service_accounts: Vec<ServiceAccount>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            disk_type: "pd-standard".to_string(),
            can_ip_forward: false,
            machine_type: "n1-standard-1".to_string(),
            network: "default".to_string(),
            zone: "us-central1-f".to_string(),
            provide_boot: true,
            boot_disk_size_gb: 10,
            data_disk_size_gb: 500,
            service_accounts: vec![ServiceAccount::default_account()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_table_keeps_remaining_defaults() {
        let defaults: Defaults =
            serde_json::from_str(r#"{"zone": "europe-west1-b", "boot_disk_size_gb": 20}"#).unwrap();
        assert_eq!(defaults.zone, "europe-west1-b");
        assert_eq!(defaults.boot_disk_size_gb, 20);
        assert_eq!(defaults.machine_type, "n1-standard-1");
        assert_eq!(defaults.service_accounts.len(), 1);
    }

    #[test]
    fn test_default_account_scopes() {
        let account = &Defaults::default().service_accounts[0];
        assert_eq!(account.email, "default");
        assert_eq!(account.scopes, DEFAULT_SCOPES);
    }
}
