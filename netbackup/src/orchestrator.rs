//! Batch orchestrator: backs up every device of an inventory concurrently.
//!
//! Each device runs in its own tokio task with its own transport and capture
//! buffer; a semaphore caps how many are in flight. A failing or panicking
//! task only affects its own [`BackupResult`].

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local};
use futures_util::future::join_all;
use log::{debug, error, info, warn};
use tokio::sync::Semaphore;

use crate::api::{ApiClient, fetch_export};
use crate::config::BackupConfig;
use crate::driver::Automaton;
use crate::error::Result;
use crate::inventory::{Credentials, DeviceDescriptor};
use crate::platform::{CommandProfile, ProfileRegistry};
use crate::store::{BackupStore, CAPTURE_EXTENSION, EXPORT_EXTENSION};
use crate::transport::Connector;

/// Outcome of one device backup.
#[derive(Debug, Clone)]
pub struct BackupResult {
    /// Device name.
    pub device: String,

    /// Device management address.
    pub address: String,

    /// Path of the written backup, or the failure description.
    pub outcome: std::result::Result<PathBuf, String>,

    /// When the task finished.
    pub finished_at: DateTime<Local>,
}

impl BackupResult {
    fn new(device: &DeviceDescriptor, outcome: std::result::Result<PathBuf, String>) -> Self {
        Self {
            device: device.name.clone(),
            address: device.address.clone(),
            outcome,
            finished_at: Local::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Aggregate of a whole run.
#[derive(Debug, Clone, Default)]
pub struct BackupSummary {
    pub results: Vec<BackupResult>,
    pub success: usize,
    pub total: usize,
}

impl BackupSummary {
    pub fn from_results(results: Vec<BackupResult>) -> Self {
        let success = results.iter().filter(|r| r.is_success()).count();
        let total = results.len();
        Self {
            results,
            success,
            total,
        }
    }

    /// Results that did not produce a backup.
    pub fn failures(&self) -> impl Iterator<Item = &BackupResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

/// Runs backups for a batch of devices.
///
/// Cheap to clone; every field is shared read-only between device tasks.
#[derive(Clone)]
pub struct Orchestrator {
    registry: Arc<ProfileRegistry>,
    credentials: Arc<Credentials>,
    connector: Arc<dyn Connector>,
    api: Arc<dyn ApiClient>,
    store: Arc<BackupStore>,
    config: Arc<BackupConfig>,
}

impl Orchestrator {
    pub fn new(
        registry: ProfileRegistry,
        credentials: Credentials,
        connector: Arc<dyn Connector>,
        api: Arc<dyn ApiClient>,
        store: BackupStore,
        config: BackupConfig,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            credentials: Arc::new(credentials),
            connector,
            api,
            store: Arc::new(store),
            config: Arc::new(config),
        }
    }

    /// Back up every device and wait for all of them.
    ///
    /// Never fails; per-device errors are reported in the summary.
    pub async fn run(&self, devices: &[DeviceDescriptor]) -> BackupSummary {
        let permits = Arc::new(Semaphore::new(self.config.workers.max(1)));

        let handles = devices.iter().cloned().map(|device| {
            let this = self.clone();
            let permits = Arc::clone(&permits);
            tokio::spawn(async move {
                // The semaphore is never closed; a closed one just stops limiting.
                let _permit = permits.acquire_owned().await.ok();
                let outcome = this.backup_device(&device).await;
                this.report(&device, outcome)
            })
        });

        let results = join_all(handles)
            .await
            .into_iter()
            .zip(devices)
            .map(|(joined, device)| match joined {
                Ok(result) => result,
                Err(e) => {
                    error!("[FAILED] {} ({}): task aborted: {}", device.name, device.address, e);
                    BackupResult::new(device, Err(format!("task aborted: {e}")))
                }
            })
            .collect();

        let summary = BackupSummary::from_results(results);
        info!("backup complete: success {}/{}", summary.success, summary.total);
        summary
    }

    fn report(&self, device: &DeviceDescriptor, outcome: Result<PathBuf>) -> BackupResult {
        match outcome {
            Ok(path) => {
                info!("[SUCCESS] {} backup -> {}", device.name, path.display());
                BackupResult::new(device, Ok(path))
            }
            Err(e) => {
                error!("[FAILED] {} ({}): {}", device.name, device.address, e);
                BackupResult::new(device, Err(e.to_string()))
            }
        }
    }

    /// Back up one device.
    pub async fn backup_device(&self, device: &DeviceDescriptor) -> Result<PathBuf> {
        let profile = self.registry.lookup(&device.platform).require(&device.platform)?;
        debug!("{}: platform {}", device.name, device.platform);

        if let CommandProfile::ApiExport(export) = profile {
            let body = fetch_export(self.api.as_ref(), device, &self.credentials, export).await?;
            return self.store.write(device, EXPORT_EXTENSION, &body).await;
        }

        let mut transport = self.connector.connect(device, &self.credentials).await?;
        let captured = Automaton::new(profile, &self.credentials, &self.config)
            .run(transport.as_mut())
            .await;
        if let Err(e) = transport.close().await {
            warn!("{}: error closing session: {}", device.name, e);
        }

        let capture = captured?;
        debug!(
            "{}: captured {} bytes, {} pages in {:?}",
            device.name,
            capture.raw.len(),
            capture.pages,
            capture.elapsed
        );
        let config = capture.config();
        self.store
            .write(device, CAPTURE_EXTENSION, config.as_bytes())
            .await
    }
}
