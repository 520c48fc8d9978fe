//! Run-wide settings for a backup batch.

use std::path::PathBuf;
use std::time::Duration;

/// Settings shared by every device task in a run.
///
/// Built once and passed explicitly; nothing here is mutated after the
/// orchestrator starts.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// Maximum number of devices backed up at the same time.
    pub workers: usize,

    /// Root directory for backup files.
    pub output_dir: PathBuf,

    /// TCP connect + SSH handshake timeout.
    pub connect_timeout: Duration,

    /// SSH authentication timeout.
    pub auth_timeout: Duration,

    /// SSH keep-alive interval.
    pub keepalive: Duration,

    /// Timeout for the HTTPS export request.
    pub api_timeout: Duration,

    /// How long a single poll waits for new data.
    pub poll_interval: Duration,

    /// Quiet period after which a shell-delivered command is considered drained.
    pub settle: Duration,

    /// Delay inserted between consecutive commands of a simple profile.
    pub command_delay: Duration,

    /// Overall wait budget for simple profiles.
    pub exec_budget: Duration,

    /// Maximum bytes taken from the transport per read.
    pub read_chunk: usize,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            output_dir: PathBuf::from("backup"),
            connect_timeout: Duration::from_secs(30),
            auth_timeout: Duration::from_secs(30),
            keepalive: Duration::from_secs(10),
            api_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(1),
            settle: Duration::from_secs(2),
            command_delay: Duration::from_secs(1),
            exec_budget: Duration::from_secs(60),
            read_chunk: 65535,
        }
    }
}

impl BackupConfig {
    /// Set the worker count (at least one).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the backup root directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the polling cadence used while reading device output.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the quiet period for shell-delivered commands.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Set the delay between commands.
    pub fn with_command_delay(mut self, delay: Duration) -> Self {
        self.command_delay = delay;
        self
    }

    /// Set the overall wait budget for simple profiles.
    pub fn with_exec_budget(mut self, budget: Duration) -> Self {
        self.exec_budget = budget;
        self
    }
}
