//! `dirserve stop` — signal the daemon and wait for it to exit.
//!
//! Exit status 0 means the daemon is confirmed stopped (including the case
//! where it was never running); any fatal outcome (probe failure, signal
//! failure, exhausted poll budget) exits 1 with the diagnostic on stderr.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use dirserve_daemon::lifecycle::{
    self, CommandProbe, CommandSignaller, StopConfig, StopOutcome, DEFAULT_MAX_POLLS,
    DEFAULT_POLL_MS,
};
use dirserve_daemon::paths;

use super::{helper_command, home_dir, PROBE_HELPER, SIGNAL_HELPER};

#[derive(Args, Debug)]
pub struct StopArgs {
    /// PID file of the daemon instance to stop.
    #[arg(long)]
    pub pid_file: Option<PathBuf>,

    /// Status probe command (defaults to the bundled dirserve-probe).
    #[arg(long)]
    pub probe_cmd: Option<PathBuf>,

    /// Signal delivery command (defaults to the bundled dirserve-signal).
    #[arg(long)]
    pub signal_cmd: Option<PathBuf>,

    /// Milliseconds between exit-confirmation polls.
    #[arg(long, default_value_t = DEFAULT_POLL_MS)]
    pub interval_ms: u64,

    /// Number of exit-confirmation polls before giving up.
    #[arg(long, default_value_t = DEFAULT_MAX_POLLS)]
    pub max_polls: u32,
}

impl StopArgs {
    pub fn run(self) -> Result<()> {
        let pid_file = match self.pid_file {
            Some(path) => path,
            None => paths::pid_path(&home_dir()?),
        };
        let probe = CommandProbe::new(match self.probe_cmd {
            Some(path) => path,
            None => helper_command(PROBE_HELPER)?,
        });
        let signaller = CommandSignaller::new(match self.signal_cmd {
            Some(path) => path,
            None => helper_command(SIGNAL_HELPER)?,
        });
        let config = StopConfig {
            poll_interval: Duration::from_millis(self.interval_ms),
            max_polls: self.max_polls,
        };

        let outcome = lifecycle::stop_blocking(&probe, &signaller, &pid_file, &config)
            .context("failed to stop daemon")?;

        match outcome {
            StopOutcome::AlreadyStopped => println!("daemon is not running"),
            StopOutcome::Stopped { polls } => println!("daemon stopped (confirmed after {polls} polls)"),
        }
        Ok(())
    }
}
