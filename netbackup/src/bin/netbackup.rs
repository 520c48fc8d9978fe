//! netbackup command line: back up every device of an inventory manifest.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use netbackup::logging;
use netbackup::transport::HostKeyVerification;
use netbackup::{
    BackupConfig, BackupStore, HttpApiClient, Inventory, Orchestrator, ProfileRegistry,
    SshConnector,
};

#[derive(Debug, Parser)]
#[command(name = "netbackup", version, about = "Back up network device configurations")]
struct Args {
    /// Inventory manifest (YAML)
    #[arg(short, long, default_value = "device_list.yaml")]
    inventory: PathBuf,

    /// Backup root directory
    #[arg(short, long, default_value = "backup")]
    output: PathBuf,

    /// Maximum number of devices backed up concurrently
    #[arg(short, long, default_value_t = 8)]
    workers: usize,

    /// SSH host key checking
    #[arg(long, value_enum, default_value_t = HostKeyMode::AcceptNew)]
    host_key: HostKeyMode,

    /// known_hosts file (defaults to ~/.ssh/known_hosts)
    #[arg(long)]
    known_hosts: Option<PathBuf>,

    /// Also append logs to this file, rotated at 5 MB with 5 old files kept
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HostKeyMode {
    Strict,
    AcceptNew,
    Disabled,
}

impl From<HostKeyMode> for HostKeyVerification {
    fn from(mode: HostKeyMode) -> Self {
        match mode {
            HostKeyMode::Strict => HostKeyVerification::Strict,
            HostKeyMode::AcceptNew => HostKeyVerification::AcceptNew,
            HostKeyMode::Disabled => HostKeyVerification::Disabled,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = &args.log_file {
        let file = logging::open_log_file(path, logging::DEFAULT_MAX_BYTES, logging::DEFAULT_KEEP)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        logger.target(env_logger::Target::Pipe(Box::new(logging::Tee::new(file))));
    }
    logger.init();

    let inventory = Inventory::load(&args.inventory)
        .with_context(|| format!("failed to load inventory {}", args.inventory.display()))?;
    info!(
        "loaded {} devices from {}",
        inventory.devices.len(),
        args.inventory.display()
    );

    let config = BackupConfig::default()
        .with_workers(args.workers)
        .with_output_dir(&args.output);

    let mut connector =
        SshConnector::new(config.clone()).with_host_key_verification(args.host_key.into());
    if let Some(path) = args.known_hosts {
        connector = connector.with_known_hosts(path);
    }
    let api = HttpApiClient::new(&config).context("failed to build HTTPS client")?;

    let orchestrator = Orchestrator::new(
        ProfileRegistry::builtin(),
        inventory.credentials,
        Arc::new(connector),
        Arc::new(api),
        BackupStore::new(&config.output_dir),
        config,
    );

    let summary = orchestrator.run(&inventory.devices).await;
    for failed in summary.failures() {
        if let Err(reason) = &failed.outcome {
            info!("  failed: {} ({}): {}", failed.device, failed.address, reason);
        }
    }

    Ok(())
}
