//! SSH transport implementation using russh.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use russh::client::{self, Handle, Msg};
use russh::keys::PublicKey;
use russh::{Channel, ChannelMsg};
use secrecy::{ExposeSecret, SecretString};

use super::config::{HostKeyVerification, SshConfig};
use super::{Connector, SessionTransport};
use crate::config::BackupConfig;
use crate::error::{Result, TransportError};
use crate::inventory::{Credentials, DeviceDescriptor};

/// SSH transport wrapping a russh client session.
pub struct SshTransport {
    /// The russh session handle.
    session: Handle<SshHandler>,

    /// The active shell or exec stream.
    channel: Option<Channel<Msg>>,

    /// Output of the active stream not yet taken by `receive`.
    stream: StreamState,

    terminal_width: u32,
    terminal_height: u32,
}

impl SshTransport {
    /// Connect to the SSH server and authenticate with a password.
    pub async fn connect(config: &SshConfig) -> Result<Self> {
        let ssh_config = Arc::new(client::Config {
            keepalive_interval: Some(config.keepalive),
            keepalive_max: 3,
            ..Default::default()
        });

        let host_key_error: Arc<Mutex<Option<TransportError>>> = Arc::new(Mutex::new(None));

        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
            host_key_verification: config.host_key_verification.clone(),
            known_hosts_path: config.known_hosts_path.clone(),
            host_key_error: host_key_error.clone(),
        };

        debug!("connecting to {}", config.socket_addr());

        let mut session = tokio::time::timeout(
            config.connect_timeout,
            client::connect(ssh_config, (config.host.as_str(), config.port), handler),
        )
        .await
        .map_err(|_| TransportError::Timeout {
            stage: "connect",
            timeout: config.connect_timeout,
        })?
        .map_err(|e| {
            let detailed = host_key_error.lock().ok().and_then(|mut slot| slot.take());
            match (detailed, e) {
                (Some(hk_err), _) => hk_err,
                (None, russh::Error::IO(source)) => TransportError::ConnectionFailed {
                    host: config.host.clone(),
                    port: config.port,
                    source,
                },
                (None, e) => TransportError::Ssh(e),
            }
        })?;

        let authenticated = tokio::time::timeout(
            config.auth_timeout,
            session.authenticate_password(&config.username, config.password.expose_secret()),
        )
        .await
        .map_err(|_| TransportError::Timeout {
            stage: "authentication",
            timeout: config.auth_timeout,
        })?
        .map_err(TransportError::Ssh)?
        .success();

        if !authenticated {
            return Err(TransportError::AuthenticationFailed {
                user: config.username.clone(),
            }
            .into());
        }

        Ok(Self {
            session,
            channel: None,
            stream: StreamState::default(),
            terminal_width: config.terminal_width,
            terminal_height: config.terminal_height,
        })
    }

    /// Make `channel` the active stream, discarding any previous one.
    fn activate(&mut self, channel: Channel<Msg>, kind: StreamKind) {
        self.channel = Some(channel);
        self.stream = StreamState::new(kind);
    }

    fn absorb(&mut self, msg: Option<ChannelMsg>) {
        match msg {
            Some(ChannelMsg::Data { data }) => self.stream.stdout(&data),
            Some(ChannelMsg::ExtendedData { data, .. }) => self.stream.stderr(&data),
            Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => self.stream.end(),
            Some(_) => {}
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum StreamKind {
    #[default]
    Shell,
    Exec,
}

/// Buffered output and end-of-stream flag of the active stream.
///
/// Exec streams keep stdout only: a device rejecting the command answers on
/// stderr, and that must read as an empty capture rather than a config.
#[derive(Debug, Default)]
struct StreamState {
    kind: StreamKind,
    pending: Vec<u8>,
    eof: bool,
}

impl StreamState {
    fn new(kind: StreamKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    fn stdout(&mut self, data: &[u8]) {
        self.pending.extend_from_slice(data);
    }

    fn stderr(&mut self, data: &[u8]) {
        match self.kind {
            StreamKind::Shell => self.pending.extend_from_slice(data),
            StreamKind::Exec => debug!("exec stderr: {}", String::from_utf8_lossy(data).trim_end()),
        }
    }

    fn end(&mut self) {
        self.eof = true;
    }

    fn take(&mut self, max_bytes: usize) -> Vec<u8> {
        let n = max_bytes.min(self.pending.len());
        self.pending.drain(..n).collect()
    }
}

#[async_trait]
impl SessionTransport for SshTransport {
    async fn open_shell(&mut self) -> Result<()> {
        let channel = self
            .session
            .channel_open_session()
            .await
            .map_err(TransportError::Ssh)?;

        channel
            .request_pty(
                true,
                "xterm",
                self.terminal_width,
                self.terminal_height,
                0,
                0,
                &[],
            )
            .await
            .map_err(TransportError::Ssh)?;

        channel
            .request_shell(true)
            .await
            .map_err(TransportError::Ssh)?;

        self.activate(channel, StreamKind::Shell);
        Ok(())
    }

    async fn exec(&mut self, command: &str) -> Result<()> {
        let channel = self
            .session
            .channel_open_session()
            .await
            .map_err(TransportError::Ssh)?;

        channel
            .exec(true, command)
            .await
            .map_err(TransportError::Ssh)?;

        self.activate(channel, StreamKind::Exec);
        Ok(())
    }

    async fn send(&mut self, text: &str) -> Result<()> {
        let channel = self.channel.as_ref().ok_or(TransportError::NoChannel)?;
        channel
            .data(text.as_bytes())
            .await
            .map_err(TransportError::Ssh)?;
        Ok(())
    }

    async fn poll(&mut self, wait: Duration) -> Result<bool> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            if !self.stream.pending.is_empty() {
                return Ok(true);
            }
            if self.stream.eof {
                return Ok(false);
            }

            let channel = self.channel.as_mut().ok_or(TransportError::NoChannel)?;
            let received = tokio::time::timeout_at(deadline, channel.wait()).await;
            match received {
                Ok(msg) => self.absorb(msg),
                Err(_) => return Ok(false),
            }
        }
    }

    fn is_data_available(&self) -> bool {
        !self.stream.pending.is_empty()
    }

    fn receive(&mut self, max_bytes: usize) -> Vec<u8> {
        self.stream.take(max_bytes)
    }

    fn is_eof(&self) -> bool {
        self.stream.eof
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(channel) = self.channel.take() {
            if let Err(e) = channel.close().await {
                debug!("channel close failed: {}", e);
            }
        }
        self.session
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
            .map_err(TransportError::Ssh)?;
        Ok(())
    }
}

/// Opens [`SshTransport`] sessions using the shared credentials.
#[derive(Debug, Clone)]
pub struct SshConnector {
    config: BackupConfig,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
}

impl SshConnector {
    /// Create a connector using the run-wide timeouts.
    pub fn new(config: BackupConfig) -> Self {
        Self {
            config,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }

    /// Set the host key verification mode.
    pub fn with_host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Use a specific known_hosts file.
    pub fn with_known_hosts(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }
}

#[async_trait]
impl Connector for SshConnector {
    async fn connect(
        &self,
        device: &DeviceDescriptor,
        credentials: &Credentials,
    ) -> Result<Box<dyn SessionTransport>> {
        let mut ssh_config = SshConfig::new(
            device.address.clone(),
            device.ssh_port(),
            credentials.username.clone(),
            SecretString::from(credentials.password.expose_secret().to_owned()),
            &self.config,
        );
        ssh_config.host_key_verification = self.host_key_verification.clone();
        ssh_config.known_hosts_path = self.known_hosts_path.clone();

        let transport = SshTransport::connect(&ssh_config).await?;
        Ok(Box::new(transport))
    }
}

/// Serializes known_hosts reads and appends across concurrent sessions.
static KNOWN_HOSTS_LOCK: Mutex<()> = Mutex::new(());

/// SSH client handler for russh.
struct SshHandler {
    host: String,
    port: u16,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    /// Detailed host-key failure surfaced by `connect` in place of the
    /// generic russh error.
    host_key_error: Arc<Mutex<Option<TransportError>>>,
}

impl SshHandler {
    /// `Ok(true)` if the key is known, `Ok(false)` if the host is not recorded.
    fn check_known_hosts(&self, pubkey: &PublicKey) -> std::result::Result<bool, TransportError> {
        let result = match self.known_hosts_path {
            Some(ref path) => russh::keys::check_known_hosts_path(&self.host, self.port, pubkey, path),
            None => russh::keys::check_known_hosts(&self.host, self.port, pubkey),
        };

        match result {
            Ok(matched) => Ok(matched),
            Err(russh::keys::Error::KeyChanged { line }) => Err(TransportError::HostKeyChanged {
                host: self.host.clone(),
                port: self.port,
                line,
            }),
            Err(e) => Err(TransportError::KnownHosts(e.to_string())),
        }
    }

    fn learn_host_key(&self, pubkey: &PublicKey) {
        let result = match self.known_hosts_path {
            Some(ref path) => {
                russh::keys::known_hosts::learn_known_hosts_path(&self.host, self.port, pubkey, path)
            }
            None => russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, pubkey),
        };

        if let Err(e) = result {
            warn!("{}:{} failed to save host key: {}", self.host, self.port, e);
        }
    }

    fn reject(&self, error: TransportError) -> bool {
        if let Ok(mut slot) = self.host_key_error.lock() {
            *slot = Some(error);
        }
        false
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        if matches!(self.host_key_verification, HostKeyVerification::Disabled) {
            return Ok(true);
        }

        let _guard = KNOWN_HOSTS_LOCK
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let accepted = match (self.check_known_hosts(server_public_key), &self.host_key_verification) {
            (Ok(true), _) => true,
            (Ok(false), HostKeyVerification::AcceptNew) => {
                self.learn_host_key(server_public_key);
                true
            }
            (Ok(false), _) => self.reject(TransportError::HostKeyUnknown {
                host: self.host.clone(),
                port: self.port,
            }),
            (Err(e), _) => self.reject(e),
        };

        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_A: &str = "AAAAC3NzaC1lZDI1NTE5AAAAIO+bX5WPl1nEKq2H2DGAHQnATQ5U2wPLSezF2lUDz9rF";
    const KEY_B: &str = "AAAAC3NzaC1lZDI1NTE5AAAAIEe7yr84sbnM2Gk038E2lUX63U/PnYFrqc2jMjA8ejNA";

    fn handler(host: &str, port: u16, known_hosts: &std::path::Path) -> SshHandler {
        SshHandler {
            host: host.to_string(),
            port,
            host_key_verification: HostKeyVerification::AcceptNew,
            known_hosts_path: Some(known_hosts.to_path_buf()),
            host_key_error: Arc::new(Mutex::new(None)),
        }
    }

    #[test]
    fn test_exec_stream_drops_stderr() {
        let mut stream = StreamState::new(StreamKind::Exec);
        stream.stderr(b"% Invalid input detected at '^' marker.\n");
        assert!(stream.pending.is_empty());

        stream.stdout(b"hostname R1\n");
        stream.end();
        assert_eq!(stream.take(1024), b"hostname R1\n");
        assert!(stream.eof);
    }

    #[test]
    fn test_shell_stream_keeps_stderr() {
        let mut stream = StreamState::new(StreamKind::Shell);
        stream.stdout(b"asa# ");
        stream.stderr(b"warning\n");
        assert_eq!(stream.take(3), b"asa");
        assert_eq!(stream.take(1024), b"# warning\n");
    }

    #[tokio::test]
    async fn test_concurrent_accept_new_records_every_host() {
        let tmp = tempfile::tempdir().unwrap();
        let known_hosts = tmp.path().join("known_hosts");
        let key_a = russh::keys::parse_public_key_base64(KEY_A).unwrap();
        let key_b = russh::keys::parse_public_key_base64(KEY_B).unwrap();

        let tasks = (0..8u16).map(|i| {
            let known_hosts = known_hosts.clone();
            let key = if i % 2 == 0 { key_a.clone() } else { key_b.clone() };
            tokio::spawn(async move {
                let mut handler = handler(&format!("10.0.0.{i}"), 2200 + i, &known_hosts);
                client::Handler::check_server_key(&mut handler, &key).await
            })
        });
        for accepted in futures_util::future::join_all(tasks).await {
            assert!(accepted.unwrap().unwrap());
        }

        let recorded = std::fs::read_to_string(&known_hosts).unwrap();
        assert_eq!(recorded.lines().filter(|l| !l.is_empty()).count(), 8);
        for i in 0..8u16 {
            let key = if i % 2 == 0 { &key_a } else { &key_b };
            let handler = handler(&format!("10.0.0.{i}"), 2200 + i, &known_hosts);
            assert!(handler.check_known_hosts(key).unwrap());
        }
    }

    #[test]
    fn test_changed_key_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let known_hosts = tmp.path().join("known_hosts");
        let key_a = russh::keys::parse_public_key_base64(KEY_A).unwrap();
        let key_b = russh::keys::parse_public_key_base64(KEY_B).unwrap();

        let first = handler("10.0.0.1", 22, &known_hosts);
        first.learn_host_key(&key_a);

        let err = first.check_known_hosts(&key_b).unwrap_err();
        assert!(matches!(err, TransportError::HostKeyChanged { .. }));
    }
}
