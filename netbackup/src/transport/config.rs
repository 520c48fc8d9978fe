//! SSH connection configuration.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::config::BackupConfig;

/// Host key verification mode, analogous to OpenSSH's `StrictHostKeyChecking`.
#[derive(Debug, Clone, Default)]
pub enum HostKeyVerification {
    /// Reject unknown and changed keys.
    Strict,

    /// Accept and record unknown keys, reject changed keys.
    #[default]
    AcceptNew,

    /// Accept all keys without checking.
    Disabled,
}

/// Per-device SSH connection settings.
#[derive(Debug)]
pub struct SshConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    /// SSH port.
    pub port: u16,

    /// Username for authentication.
    pub username: String,

    /// Password for authentication.
    pub password: SecretString,

    /// TCP connect + handshake timeout.
    pub connect_timeout: Duration,

    /// Authentication timeout.
    pub auth_timeout: Duration,

    /// Keep-alive interval so idle middleboxes don't drop long captures.
    pub keepalive: Duration,

    /// Terminal width for the PTY.
    pub terminal_width: u32,

    /// Terminal height for the PTY.
    pub terminal_height: u32,

    /// Host key verification mode.
    pub host_key_verification: HostKeyVerification,

    /// Path to known_hosts file (defaults to ~/.ssh/known_hosts).
    pub known_hosts_path: Option<PathBuf>,
}

impl SshConfig {
    /// Build a config for one device using the run-wide timeouts.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: SecretString,
        backup: &BackupConfig,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password,
            connect_timeout: backup.connect_timeout,
            auth_timeout: backup.auth_timeout,
            keepalive: backup.keepalive,
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }

    /// Get the socket address for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
