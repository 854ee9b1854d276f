// ── Binary-level errors with exit codes ──

use miette::Diagnostic;
use thiserror::Error;

use gatepass_config::ConfigError;

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("configuration error")]
    #[diagnostic(code(gatepass::config))]
    Config(#[from] ConfigError),

    #[error("server failed: {0}")]
    #[diagnostic(code(gatepass::server))]
    Server(#[from] std::io::Error),
}

impl CliError {
    /// Exit code for the shell: 2 for operator mistakes, 1 for runtime
    /// failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Server(_) => 1,
        }
    }
}
