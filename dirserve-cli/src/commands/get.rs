//! `dirserve get` — one directory lookup over the daemon socket.

use anyhow::{Context, Result};
use clap::Args;

use dirserve_daemon::client;

use super::home_dir;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Directory key to look up (e.g. /users/alice).
    pub key: String,
}

impl GetArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;
        let value = client::request_get(&home, &self.key)
            .with_context(|| format!("failed to look up {}", self.key))?;
        println!(
            "{}",
            serde_json::to_string_pretty(&value).context("failed to render lookup result")?
        );
        Ok(())
    }
}
