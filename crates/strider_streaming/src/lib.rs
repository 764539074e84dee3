//! # strider_streaming - Endless Chunk Streaming
//!
//! Keeps fixed-width chunks of level content loaded around a moving host:
//!
//! - [`Checker`]: probes a point and reports [`ChunkMissing`] when nothing
//!   is there
//! - [`Destroyer`]: a trigger region reporting [`ChunkDestroying`] when a
//!   chunk wrapper's marker enters it
//! - [`ChunkStreamer`]: lays out checkers and destroyers, loads and removes
//!   chunks in response to their events, and follows facing changes
//!
//! Detection and reaction only meet on the [`EventBus`](strider_event::EventBus),
//! so other systems can observe or veto the same events.

pub mod checker;
pub mod config;
pub mod coordinator;
pub mod destroyer;
pub mod error;
pub mod events;
pub mod layout;

pub use checker::Checker;
pub use config::{StreamingConfig, MAX_CHUNKS};
pub use coordinator::{ChunkStreamer, CHECKERS_NAME, DESTROYERS_NAME};
pub use destroyer::Destroyer;
pub use error::{Result, StreamingError};
pub use events::{ChunkDestroying, ChunkMissing};
pub use layout::StreamingLayout;

pub mod prelude {
    pub use crate::{
        Checker, ChunkDestroying, ChunkMissing, ChunkStreamer, Destroyer, StreamingConfig,
        StreamingError, StreamingLayout,
    };
}
