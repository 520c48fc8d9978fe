//! Session transport layer.
//!
//! [`SessionTransport`] is the byte-stream seam the interaction automaton
//! drives; [`Connector`] opens one per device. The SSH implementation wraps
//! russh, and tests substitute scripted transports.

pub mod config;
mod ssh;

use std::time::Duration;

use async_trait::async_trait;

pub use config::{HostKeyVerification, SshConfig};
pub use ssh::{SshConnector, SshTransport};

use crate::error::Result;
use crate::inventory::{Credentials, DeviceDescriptor};

/// One authenticated session to a device.
///
/// Output is read through a single active stream: either the interactive
/// shell opened by [`open_shell`](Self::open_shell) or the most recent
/// [`exec`](Self::exec) stream.
#[async_trait]
pub trait SessionTransport: Send {
    /// Open a PTY shell and make it the active stream.
    async fn open_shell(&mut self) -> Result<()>;

    /// Run a command on a fresh exec stream and make it the active stream.
    async fn exec(&mut self, command: &str) -> Result<()>;

    /// Write text to the active stream.
    async fn send(&mut self, text: &str) -> Result<()>;

    /// Wait up to `wait` for data; `true` once something is buffered.
    ///
    /// Returns `false` on timeout or end of stream.
    async fn poll(&mut self, wait: Duration) -> Result<bool>;

    /// Whether buffered data can be taken without waiting.
    fn is_data_available(&self) -> bool;

    /// Take up to `max_bytes` of buffered data without waiting.
    fn receive(&mut self, max_bytes: usize) -> Vec<u8>;

    /// Whether the device closed the active stream.
    fn is_eof(&self) -> bool;

    /// Close the session.
    async fn close(&mut self) -> Result<()>;
}

/// Opens sessions to devices.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect and authenticate to one device. Never retries.
    async fn connect(
        &self,
        device: &DeviceDescriptor,
        credentials: &Credentials,
    ) -> Result<Box<dyn SessionTransport>>;
}
