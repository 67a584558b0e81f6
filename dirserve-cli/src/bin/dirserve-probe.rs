//! dirserve-probe — PID-file liveness plumbing.
//!
//! Exit codes form the probe facility contract: 0 when the recorded process
//! is alive, 100 when it is definitively not running (missing PID file or
//! dead pid), 2 when the probe itself failed (unreadable or garbled PID
//! file). Stdout carries a one-word status for humans; scripts should rely
//! on the exit code only.

use std::path::PathBuf;
use std::process::exit;

use clap::Parser;

use dirserve_daemon::lifecycle::{ProcessStatus, PROBE_EXIT_NOT_RUNNING, PROBE_EXIT_RUNNING};
use dirserve_daemon::pidfile;

const PROBE_EXIT_ERROR: i32 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "dirserve-probe",
    version,
    about = "Report whether the process recorded in a PID file is alive"
)]
struct ProbeArgs {
    /// Path to the daemon PID file.
    pid_file: PathBuf,
}

fn main() {
    let args = ProbeArgs::parse();
    match pidfile::check_pid_file(&args.pid_file) {
        Ok(ProcessStatus::Running) => {
            println!("running");
            exit(PROBE_EXIT_RUNNING);
        }
        Ok(ProcessStatus::Stopped) => {
            println!("not running");
            exit(PROBE_EXIT_NOT_RUNNING);
        }
        Err(err) => {
            eprintln!("dirserve-probe: {err}");
            exit(PROBE_EXIT_ERROR);
        }
    }
}
