//! FortiGate profile.
//!
//! FortiOS exposes a full configuration export over its REST API, which is
//! cleaner than scraping `show` output, so FortiGates are backed up over
//! HTTPS only.

use crate::platform::{ApiExport, CommandProfile};

pub const PLATFORM_NAME: &str = "fortinet";

/// Global-scope configuration backup endpoint.
pub const BACKUP_PATH: &str = "/api/v2/monitor/system/config/backup?scope=global";

pub fn profiles() -> Vec<(&'static str, CommandProfile)> {
    vec![(
        PLATFORM_NAME,
        CommandProfile::ApiExport(ApiExport {
            path: BACKUP_PATH.to_string(),
            default_port: 443,
        }),
    )]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fortinet_uses_api() {
        let (name, profile) = profiles().remove(0);
        assert_eq!(name, "fortinet");
        match profile {
            CommandProfile::ApiExport(api) => {
                assert_eq!(api.path, BACKUP_PATH);
                assert_eq!(api.default_port, 443);
            }
            other => panic!("expected API export, got {other:?}"),
        }
    }
}
