//! # Registry Configuration
//!
//! Capacity hints loaded once at startup from TOML.
//!
//! ```toml
//! entity_capacity = 100000
//! storage_capacity = 1024
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Capacity hints for a registry.
///
/// Both values only pre-reserve memory; a registry grows past them as needed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Entity table slots reserved up front.
    pub entity_capacity: usize,
    /// Components reserved by each storage when it is first created.
    pub storage_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            entity_capacity: 1024,
            storage_capacity: 64,
        }
    }
}

impl RegistryConfig {
    /// Parses and validates a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for zero capacities.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`RegistryConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks that the capacities are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a capacity is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entity_capacity == 0 {
            return Err(ConfigError::Invalid("entity_capacity must be greater than zero".into()));
        }
        if self.storage_capacity == 0 {
            return Err(ConfigError::Invalid("storage_capacity must be greater than zero".into()));
        }
        Ok(())
    }
}
