//! # Demo Setup
//!
//! Logging and configuration shared by the demo binaries.

use std::path::Path;

use tessera_core::{ConfigError, RegistryConfig};
use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber filtered by `RUST_LOG`.
///
/// Defaults to `info` when `RUST_LOG` is unset.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

/// Loads the registry config named by the first command-line argument.
///
/// Without an argument the default config is used.
///
/// # Errors
///
/// Returns the [`ConfigError`] of a config file that cannot be loaded.
pub fn config_from_args() -> Result<RegistryConfig, ConfigError> {
    config_from(std::env::args().nth(1))
}

fn config_from(path: Option<String>) -> Result<RegistryConfig, ConfigError> {
    match path {
        Some(path) => {
            let config = RegistryConfig::load(Path::new(&path))?;
            tracing::info!("loaded config from {path}");
            Ok(config)
        }
        None => Ok(RegistryConfig::default()),
    }
}
