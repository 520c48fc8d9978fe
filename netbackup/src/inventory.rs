//! Device inventory manifest.
//!
//! The manifest is a YAML document with a shared `credentials` section and a
//! `devices` list:
//!
//! ```yaml
//! credentials:
//!   username: backup
//!   password: secret
//!   api_key: default-token      # optional
//! devices:
//!   - name: core1
//!     hostip: 10.0.0.1
//!     platform: cisco_ios
//!     groups: core
//!   - name: fw1
//!     hostip: 10.0.0.2
//!     platform: fortinet
//!     groups: firewall
//!     api_key: per-device-token # optional
//!     api_port: 8443            # optional
//! ```

use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{InventoryError, Result};

/// Default SSH port.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Shared login material, read-only for the whole run.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// SSH username.
    pub username: String,

    /// SSH password, also used for in-band logins.
    pub password: SecretString,

    /// Default API key for HTTPS exports.
    #[serde(default)]
    pub api_key: Option<SecretString>,
}

/// One inventory entry.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceDescriptor {
    /// Device name, used in the backup file name.
    pub name: String,

    /// Management address.
    #[serde(rename = "hostip")]
    pub address: String,

    /// Platform identifier selecting the command profile.
    pub platform: String,

    /// Group label, used as the backup sub-directory.
    #[serde(rename = "groups")]
    pub group: String,

    /// SSH port override.
    #[serde(default)]
    pub port: Option<u16>,

    /// Per-device API key override.
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Per-device API port override.
    #[serde(default)]
    pub api_port: Option<u16>,
}

impl DeviceDescriptor {
    /// Create a descriptor with no overrides.
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        platform: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            platform: platform.into(),
            group: group.into(),
            port: None,
            api_key: None,
            api_port: None,
        }
    }

    /// Set the API key override.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Set the API port override.
    pub fn with_api_port(mut self, port: u16) -> Self {
        self.api_port = Some(port);
        self
    }

    /// SSH port, falling back to 22.
    pub fn ssh_port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_SSH_PORT)
    }
}

/// A loaded inventory manifest.
#[derive(Debug, Deserialize)]
pub struct Inventory {
    pub credentials: Credentials,

    #[serde(default)]
    pub devices: Vec<DeviceDescriptor>,
}

impl Inventory {
    /// Parse a manifest from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text).map_err(InventoryError::Parse)?)
    }

    /// Load a manifest from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| InventoryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    const MANIFEST: &str = r#"
credentials:
  username: backup
  password: s3cret
devices:
  - name: core1
    hostip: 10.0.0.1
    platform: cisco_ios
    groups: core
  - name: fw1
    hostip: 10.0.0.2
    platform: fortinet
    groups: firewall
    api_key: token
    api_port: 8443
"#;

    #[test]
    fn test_parse_manifest() {
        let inventory = Inventory::from_yaml(MANIFEST).unwrap();
        assert_eq!(inventory.credentials.username, "backup");
        assert_eq!(inventory.credentials.password.expose_secret(), "s3cret");
        assert!(inventory.credentials.api_key.is_none());
        assert_eq!(inventory.devices.len(), 2);

        let core = &inventory.devices[0];
        assert_eq!(core.address, "10.0.0.1");
        assert_eq!(core.group, "core");
        assert_eq!(core.ssh_port(), 22);
        assert!(core.api_port.is_none());

        let fw = &inventory.devices[1];
        assert_eq!(fw.api_key.as_ref().unwrap().expose_secret(), "token");
        assert_eq!(fw.api_port, Some(8443));
    }

    #[test]
    fn test_password_not_in_debug() {
        let inventory = Inventory::from_yaml(MANIFEST).unwrap();
        let debug = format!("{:?}", inventory.credentials);
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let err = Inventory::from_yaml("devices: []").unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Inventory(InventoryError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Inventory::load("/nonexistent/device_list.yaml").unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Inventory(InventoryError::Read { .. })
        ));
    }
}
