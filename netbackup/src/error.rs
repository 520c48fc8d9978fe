//! Error types for netbackup.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for netbackup operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Connection error: {0}")]
    Transport(#[from] TransportError),

    /// Command profile lookup and definition errors
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Interactive capture errors
    #[error("Interaction error: {0}")]
    Interaction(#[from] InteractionError),

    /// HTTPS export errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Backup file write errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Inventory manifest errors
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// Host key differs from the one recorded in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// Host is not in known_hosts and strict checking is enabled
    #[error("Host key for {host}:{port} is unknown")]
    HostKeyUnknown { host: String, port: u16 },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// No shell or exec stream has been opened yet
    #[error("No open channel")]
    NoChannel,

    /// Operation timed out
    #[error("{stage} timed out after {timeout:?}")]
    Timeout { stage: &'static str, timeout: Duration },
}

/// Command profile errors.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// No command profile exists for the platform identifier
    #[error("Unsupported platform '{name}'")]
    UnsupportedPlatform { name: String },

    /// A profile with this identifier was already registered
    #[error("Platform '{name}' is already registered")]
    AlreadyRegistered { name: String },

    /// The profile is not captured over a terminal session
    #[error("Profile has no terminal commands")]
    NoTerminalCommands,

    /// Invalid regex pattern in a profile
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Failures of the interaction automaton while capturing output.
#[derive(Error, Debug)]
pub enum InteractionError {
    /// No terminal pattern matched within the wait budget
    #[error("No completion within {budget:?} while {state}")]
    Timeout { budget: Duration, state: String },

    /// The channel closed before the capture completed
    #[error("Channel closed while {state}")]
    ChannelClosed { state: String },

    /// The device produced no output at all
    #[error("Device returned no output")]
    EmptyCapture,
}

/// HTTPS configuration export errors.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Neither the device nor the shared credentials carry an API key
    #[error("No API key configured for '{device}'")]
    MissingApiKey { device: String },

    /// The endpoint answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request could not be completed
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Backup file write errors.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// I/O failure creating a directory or writing a file
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Inventory manifest errors.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// The manifest file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The manifest is not valid YAML for the expected layout
    #[error("Invalid manifest: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Result type alias using netbackup's Error.
pub type Result<T> = std::result::Result<T, Error>;
