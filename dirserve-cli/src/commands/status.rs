//! `dirserve status` — probe the daemon process and report liveness.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use dirserve_daemon::lifecycle::{self, CommandProbe, ProcessStatus};
use dirserve_daemon::paths;

use super::{helper_command, home_dir, PROBE_HELPER};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// PID file of the daemon instance to probe.
    #[arg(long)]
    pub pid_file: Option<PathBuf>,

    /// Status probe command (defaults to the bundled dirserve-probe).
    #[arg(long)]
    pub probe_cmd: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusJson {
    running: bool,
    pid_file: String,
    socket: String,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;
        let pid_file = self.pid_file.unwrap_or_else(|| paths::pid_path(&home));
        let probe = CommandProbe::new(match self.probe_cmd {
            Some(path) => path,
            None => helper_command(PROBE_HELPER)?,
        });

        let status = lifecycle::probe_blocking(&probe, &pid_file)
            .context("failed to probe daemon status")?;
        let running = status == ProcessStatus::Running;

        if self.json {
            let payload = StatusJson {
                running,
                pid_file: pid_file.display().to_string(),
                socket: paths::socket_path(&home).display().to_string(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload)
                    .context("failed to render status JSON")?
            );
            return Ok(());
        }

        if running {
            println!("daemon is {} ({})", "running".green(), pid_file.display());
        } else {
            println!("daemon is {}", "stopped".red());
        }
        Ok(())
    }
}
