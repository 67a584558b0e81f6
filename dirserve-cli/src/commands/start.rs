//! `dirserve start` — run the daemon in the foreground.

use anyhow::{Context, Result};

use super::home_dir;

pub fn run() -> Result<()> {
    let home = home_dir()?;
    dirserve_daemon::start_blocking(&home).context("daemon exited with error")
}
