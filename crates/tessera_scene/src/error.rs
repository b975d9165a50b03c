//! # Scene Error Types

use tessera_core::{EcsError, Entity};
use thiserror::Error;

/// Errors that can occur in a scene.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The node was destroyed or belongs to another scene.
    #[error("invalid node {id}v{version}")]
    InvalidNode {
        /// Id part of the node's entity.
        id: u64,
        /// Version part of the node's entity.
        version: u64,
    },

    /// The scene ran out of entity ids.
    #[error("scene is full: no entity id left for a new node")]
    Exhausted,

    /// An error from the underlying registry.
    #[error(transparent)]
    Ecs(#[from] EcsError),
}

impl SceneError {
    pub(crate) fn invalid_node(entity: Entity) -> Self {
        Self::InvalidNode {
            id: entity.id(),
            version: entity.version(),
        }
    }
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
