//! # ECS Error Types
//!
//! Storage primitives never fail: absence is reported with `Option`. Only the
//! registry's required accessors and view construction return these errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::entity::{BasicEntity, EntityRepr};

/// Errors raised by the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The entity handle is stale, destroyed, null or out of range.
    #[error("invalid entity {id}v{version}")]
    InvalidEntity {
        /// Id part of the offending handle.
        id: u64,
        /// Version part of the offending handle.
        version: u64,
    },

    /// A required component is not attached to a valid entity.
    #[error("entity {id}v{version} has no component {component}")]
    ComponentNotPresent {
        /// Id part of the entity.
        id: u64,
        /// Version part of the entity.
        version: u64,
        /// Name of the missing component type.
        component: &'static str,
    },

    /// A view named the same component type twice.
    #[error("component {component} appears more than once in a view")]
    AliasedComponent {
        /// Name of the repeated component type.
        component: &'static str,
    },

    /// A storage registered under a type id is not the expected storage type.
    #[error("storage for {component} has an unexpected type")]
    StorageTypeMismatch {
        /// Name of the component type that was looked up.
        component: &'static str,
    },
}

impl EcsError {
    pub(crate) fn invalid_entity<R: EntityRepr>(entity: BasicEntity<R>) -> Self {
        Self::InvalidEntity {
            id: entity.id(),
            version: entity.version(),
        }
    }

    pub(crate) fn component_not_present<R: EntityRepr>(
        entity: BasicEntity<R>,
        component: &'static str,
    ) -> Self {
        Self::ComponentNotPresent {
            id: entity.id(),
            version: entity.version(),
            component,
        }
    }
}

/// Result type for registry operations.
pub type EcsResult<T> = Result<T, EcsError>;

/// Errors raised while loading a [`RegistryConfig`](crate::RegistryConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The config is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config parsed but holds unusable values.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
