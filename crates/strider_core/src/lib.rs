//! # strider_core - Strider Core
//!
//! Primitives every other Strider crate builds on:
//! - **Ids**: generational entity identifiers for scene nodes
//! - **Shared state**: the `Arc<Mutex<_>>` handle used to reach scene and
//!   coordinator state from event listeners

pub mod id;
pub mod shared;

pub use id::*;
pub use shared::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::id::{Id, IdGenerator};
    pub use crate::shared::{shared, Shared};
}
