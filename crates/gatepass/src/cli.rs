// ── CLI definition ──

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "gatepass", version, about = "Event admission token service")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the config file (defaults to the platform config dir).
    #[arg(long, global = true, env = "GATEPASS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP service.
    Serve(ServeArgs),

    /// Print the resolved configuration and exit.
    Config,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the configured bind address (e.g. 127.0.0.1:9090).
    #[arg(long)]
    pub bind: Option<String>,
}
