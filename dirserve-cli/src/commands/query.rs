//! `dirserve query` — match directory entries by attribute value.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use dirserve_daemon::client;

use super::home_dir;

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Attribute name to match on (e.g. shell).
    pub attribute: String,

    /// Value to match; parsed as JSON, or taken as a plain string.
    pub value: String,
}

impl QueryArgs {
    pub fn run(self) -> Result<()> {
        let value = serde_json::from_str(&self.value)
            .unwrap_or_else(|_| Value::String(self.value.clone()));

        let home = home_dir()?;
        let matches = client::request_query(&home, &self.attribute, value)
            .with_context(|| format!("failed to query on {}", self.attribute))?;
        println!(
            "{}",
            serde_json::to_string_pretty(&matches).context("failed to render query result")?
        );
        Ok(())
    }
}
