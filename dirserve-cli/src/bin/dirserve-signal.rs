//! dirserve-signal — signal delivery plumbing.
//!
//! Invoked as `dirserve-signal <pid-file> <signal-name>`; delivers the named
//! signal (TERM, INT, HUP, KILL — `SIG` prefix optional) to the process
//! recorded in the PID file. Exit 0 on delivery, 1 on any failure.

use std::path::PathBuf;
use std::process::exit;

use clap::Parser;

use dirserve_daemon::pidfile;

#[derive(Parser, Debug)]
#[command(
    name = "dirserve-signal",
    version,
    about = "Deliver a named signal to the process recorded in a PID file"
)]
struct SignalArgs {
    /// Path to the daemon PID file.
    pid_file: PathBuf,

    /// Signal name, e.g. TERM or SIGTERM.
    signal: String,
}

fn main() {
    let args = SignalArgs::parse();
    if let Err(err) = pidfile::signal_pid_file(&args.pid_file, &args.signal) {
        eprintln!("dirserve-signal: {err}");
        exit(1);
    }
}
