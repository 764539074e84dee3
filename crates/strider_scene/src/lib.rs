//! # strider_scene - Scene Collaborators
//!
//! The surface the streaming core consumes from its host scene:
//!
//! - [`WorldProbe`]: line probes against solid colliders
//! - [`ContentFactory`]: prefab instantiation, destruction, reparenting
//! - [`SceneGraph`]: hierarchy, transforms, tags, colliders
//!
//! [`Scene`] is an in-memory implementation of all three, with sensor
//! contact tracking, used by the runtime and by tests.

pub mod collider;
pub mod contact;
pub mod error;
pub mod prefab;
pub mod scene;
pub mod traits;

pub use collider::{Collider, ColliderKind};
pub use contact::{Contact, ContactKind, ContactTracker};
pub use error::{Result, SceneError};
pub use prefab::{Prefab, PrefabKind, PrefabLibrary, CHUNK_WRAPPER_TAG, MARKER_NAME};
pub use scene::Scene;
pub use traits::{ContentFactory, SceneGraph, Stage, WorldProbe};

pub mod prelude {
    pub use crate::{
        Collider, Contact, ContentFactory, PrefabKind, PrefabLibrary, Scene, SceneError,
        SceneGraph, Stage, WorldProbe,
    };
}
