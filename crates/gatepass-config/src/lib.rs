//! Configuration for the gatepass service.
//!
//! TOML file merged with `GATEPASS_*` environment overrides via figment.
//! The binary translates this into server state at startup; nothing in
//! here is read again after boot.

use std::net::SocketAddr;
use std::path::PathBuf;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config ──────────────────────────────────────────────────────────

/// Top-level service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Socket address the HTTP server binds to.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Public base URL encoded into every badge
    /// (`{base_url}/init?code={id}`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Scan quota for newly issued tokens.
    #[serde(default = "default_max_scans")]
    pub default_max_scans: u32,

    /// Batch size when an issuance request does not specify a count.
    #[serde(default = "default_batch_size")]
    pub default_batch_size: u32,

    /// Origins allowed by the CORS layer. Empty means same-origin only.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            base_url: default_base_url(),
            default_max_scans: default_max_scans(),
            default_batch_size: default_batch_size(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".into()
}
fn default_base_url() -> String {
    "http://localhost:8080".into()
}
fn default_max_scans() -> u32 {
    2
}
fn default_batch_size() -> u32 {
    200
}

impl Config {
    /// Load from the default path plus `GATEPASS_*` env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path())
    }

    /// Load from an explicit TOML path plus env overrides. A missing
    /// file is fine: defaults plus env apply.
    pub fn load_from(path: &PathBuf) -> Result<Self, ConfigError> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("GATEPASS_"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Parsed bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind.parse().map_err(|_| ConfigError::Validation {
            field: "bind".into(),
            reason: format!("not a socket address: {}", self.bind),
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;

        url::Url::parse(&self.base_url).map_err(|e| ConfigError::Validation {
            field: "base_url".into(),
            reason: e.to_string(),
        })?;

        if self.default_max_scans == 0 {
            return Err(ConfigError::Validation {
                field: "default_max_scans".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.default_batch_size == 0 {
            return Err(ConfigError::Validation {
                field: "default_batch_size".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Default config file location (`~/.config/gatepass/config.toml` on Linux).
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "gatepass", "gatepass")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("gatepass.toml"))
}
