//! # netbackup
//!
//! Async configuration backup for multi-vendor network fleets.
//!
//! netbackup logs into switches, routers, firewalls and wireless controllers
//! over SSH, captures their running configuration and writes it to a
//! timestamped file grouped by device category. Platforms that expose an
//! HTTPS export endpoint are backed up through it instead.
//!
//! ## Features
//!
//! - Async SSH sessions via russh, exec or PTY shell delivery
//! - Data-driven command profiles per platform (login steps, pagination, prompt)
//! - Efficient pattern buffer matching (tail-limited search)
//! - Bounded-concurrency batch runs with per-device failure isolation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use netbackup::{
//!     BackupConfig, BackupStore, HttpApiClient, Inventory, Orchestrator, ProfileRegistry,
//!     SshConnector,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), netbackup::Error> {
//!     let inventory = Inventory::load("device_list.yaml")?;
//!     let config = BackupConfig::default().with_workers(8);
//!
//!     let orchestrator = Orchestrator::new(
//!         ProfileRegistry::builtin(),
//!         inventory.credentials,
//!         Arc::new(SshConnector::new(config.clone())),
//!         Arc::new(HttpApiClient::new(&config)?),
//!         BackupStore::new(&config.output_dir),
//!         config,
//!     );
//!
//!     let summary = orchestrator.run(&inventory.devices).await;
//!     println!("{}/{} devices backed up", summary.success, summary.total);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod channel;
pub mod config;
pub mod driver;
pub mod error;
pub mod inventory;
pub mod logging;
pub mod orchestrator;
pub mod platform;
pub mod store;
pub mod transport;

// Re-export main types for convenience
pub use api::{ApiClient, ApiResponse, HttpApiClient};
pub use config::BackupConfig;
pub use driver::{Automaton, Capture, State, sanitize};
pub use error::{Error, Result};
pub use inventory::{Credentials, DeviceDescriptor, Inventory};
pub use orchestrator::{BackupResult, BackupSummary, Orchestrator};
pub use platform::{CommandProfile, ProfileLookup, ProfileRegistry};
pub use store::BackupStore;
pub use transport::{Connector, SessionTransport, SshConfig, SshConnector};
