pub mod get;
pub mod query;
pub mod start;
pub mod status;
pub mod stop;

use std::path::PathBuf;

use anyhow::{Context, Result};

pub const PROBE_HELPER: &str = "dirserve-probe";
pub const SIGNAL_HELPER: &str = "dirserve-signal";

/// Resolve a bundled helper binary: prefer a sibling of the running
/// executable, fall back to a bare name for `$PATH` lookup.
pub fn helper_command(name: &str) -> Result<PathBuf> {
    let exe = std::env::current_exe().context("could not locate the running executable")?;
    let sibling = exe
        .parent()
        .map(|dir| dir.join(name))
        .unwrap_or_else(|| PathBuf::from(name));
    if sibling.exists() {
        Ok(sibling)
    } else {
        Ok(PathBuf::from(name))
    }
}

/// Home directory for the well-known daemon paths.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}
