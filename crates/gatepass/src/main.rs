mod cli;
mod error;

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gatepass_config::Config;
use gatepass_core::{MemoryStore, TokenService};
use gatepass_server::{AppState, InitUrlRenderer, router};

use crate::cli::{Cli, Command, ServeArgs};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;

    match cli.command {
        Command::Serve(args) => serve(config, args).await,
        Command::Config => {
            let rendered = toml::to_string_pretty(&config)
                .map_err(gatepass_config::ConfigError::from)?;
            print!("{rendered}");
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let config = match &cli.global.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

async fn serve(mut config: Config, args: ServeArgs) -> Result<(), CliError> {
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    let addr = config.bind_addr()?;

    // All state is built here once and handed to the router; handlers
    // hold references, never globals.
    let store = Arc::new(MemoryStore::new());
    let service = TokenService::new(store);
    let renderer = Arc::new(InitUrlRenderer::new(config.base_url.clone()));
    let state = AppState::new(
        service,
        renderer,
        config.default_batch_size,
        config.default_max_scans,
    );
    let app = router(state, &config.cors_origins);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, base_url = %config.base_url, "gatepass listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    // Serve until interrupted; failing to install the handler would mean
    // never shutting down cleanly, so treat it as fatal.
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to install ctrl-c handler");
    }
    info!("shutdown signal received");
}
