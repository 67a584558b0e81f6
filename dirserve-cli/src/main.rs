//! dirserve — directory service daemon control CLI.
//!
//! # Usage
//!
//! ```text
//! dirserve start
//! dirserve stop [--pid-file <path>] [--interval-ms <ms>] [--max-polls <n>]
//! dirserve status [--json]
//! dirserve get <key>
//! dirserve query <attribute> <value>
//! ```
//!
//! `stop` and `status` drive the daemon process through its PID file and the
//! external probe/signal facilities (bundled as `dirserve-probe` and
//! `dirserve-signal`); `get` and `query` talk to a running daemon over its
//! Unix socket.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{get::GetArgs, query::QueryArgs, status::StatusArgs, stop::StopArgs};

#[derive(Parser, Debug)]
#[command(
    name = "dirserve",
    version,
    about = "Control and query the directory service daemon",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the daemon in the foreground (socket server + dispatcher).
    Start,

    /// Stop a running daemon and wait for it to exit.
    Stop(StopArgs),

    /// Report whether the daemon process is running.
    Status(StatusArgs),

    /// Look up a single directory key.
    Get(GetArgs),

    /// List directory entries whose attribute equals a value.
    Query(QueryArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Start => commands::start::run(),
        Commands::Stop(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Get(args) => args.run(),
        Commands::Query(args) => args.run(),
    }
}
