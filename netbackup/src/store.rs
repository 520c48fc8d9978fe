//! Backup file layout and writing.
//!
//! Files land at `<root>/<group>/<name>_<address>_<YYYYMMDD_HHMM>.<ext>`,
//! with the dots of the address replaced by underscores. Terminal captures
//! use `cfg`, API exports `conf`.

use std::path::PathBuf;

use chrono::{DateTime, Local};
use log::debug;

use crate::error::{PersistenceError, Result};
use crate::inventory::DeviceDescriptor;

/// Extension for sanitized terminal captures.
pub const CAPTURE_EXTENSION: &str = "cfg";

/// Extension for verbatim API exports.
pub const EXPORT_EXTENSION: &str = "conf";

/// Writes backups under a root directory.
#[derive(Debug, Clone)]
pub struct BackupStore {
    root: PathBuf,
}

impl BackupStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Destination path for a device backup taken at `timestamp`.
    pub fn path_for(
        &self,
        device: &DeviceDescriptor,
        extension: &str,
        timestamp: &DateTime<Local>,
    ) -> PathBuf {
        let file_name = format!(
            "{}_{}_{}.{}",
            device.name,
            device.address.replace('.', "_"),
            timestamp.format("%Y%m%d_%H%M"),
            extension
        );
        self.root.join(&device.group).join(file_name)
    }

    /// Write `contents` for `device`, creating the group directory as needed.
    pub async fn write(
        &self,
        device: &DeviceDescriptor,
        extension: &str,
        contents: &[u8],
    ) -> Result<PathBuf> {
        let path = self.path_for(device, extension, &Local::now());

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| PersistenceError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| PersistenceError::Io {
                path: path.clone(),
                source,
            })?;

        debug!("wrote {} bytes to {}", contents.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_path_layout() {
        let store = BackupStore::new("/backups");
        let device = DeviceDescriptor::new("core1", "10.0.0.1", "cisco_ios", "core");
        let ts = Local.with_ymd_and_hms(2024, 3, 5, 9, 7, 0).unwrap();

        assert_eq!(
            store.path_for(&device, CAPTURE_EXTENSION, &ts),
            PathBuf::from("/backups/core/core1_10_0_0_1_20240305_0907.cfg")
        );
        assert_eq!(
            store.path_for(&device, EXPORT_EXTENSION, &ts),
            PathBuf::from("/backups/core/core1_10_0_0_1_20240305_0907.conf")
        );
    }

    #[tokio::test]
    async fn test_write_creates_group_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let store = BackupStore::new(tmp.path());
        let device = DeviceDescriptor::new("sw1", "192.168.1.10", "huawei", "access");

        let path = store
            .write(&device, CAPTURE_EXTENSION, b"sysname sw1\n")
            .await
            .unwrap();

        assert_eq!(path.parent().unwrap(), tmp.path().join("access"));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("sw1_192_168_1_10_"));
        assert!(name.ends_with(".cfg"));
        assert_eq!(std::fs::read(&path).unwrap(), b"sysname sw1\n");
    }

    #[tokio::test]
    async fn test_write_failure_is_persistence_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"").unwrap();

        let store = BackupStore::new(&blocker);
        let device = DeviceDescriptor::new("sw1", "10.0.0.9", "huawei", "access");

        let err = store
            .write(&device, CAPTURE_EXTENSION, b"x")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Persistence(PersistenceError::Io { .. })
        ));
    }
}
