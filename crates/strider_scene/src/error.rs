//! Error types for the scene

use crate::prefab::PrefabKind;
use strider_core::Id;
use thiserror::Error;

/// Scene errors
#[derive(Debug, Error)]
pub enum SceneError {
    /// Node not found, or already destroyed
    #[error("Scene node not found: {0:?}")]
    NodeNotFound(Id),

    /// No template registered for the prefab kind
    #[error("No prefab registered for {0:?}")]
    PrefabNotFound(PrefabKind),

    /// Reparenting would make a node its own ancestor
    #[error("Cannot parent {child:?} under its descendant {parent:?}")]
    CyclicParent { child: Id, parent: Id },
}

/// Result type for scene operations
pub type Result<T> = std::result::Result<T, SceneError>;
