//! Chunk streaming events

use strider_core::Id;
use strider_event::{impl_event, EventHeader};
use strider_math::Vec2;

/// A checker found no content where it probed
#[derive(Debug, Clone)]
pub struct ChunkMissing {
    header: EventHeader,
    /// The checker that detected the gap
    pub checker: Id,
    /// Lower end of the probe, in world space
    pub position: Vec2,
}
impl_event!(ChunkMissing);

impl ChunkMissing {
    pub fn new(checker: Id, position: Vec2) -> Self {
        Self {
            header: EventHeader::default(),
            checker,
            position,
        }
    }
}

/// A destroyer touched a chunk wrapper
#[derive(Debug, Clone)]
pub struct ChunkDestroying {
    header: EventHeader,
    /// The destroyer reporting the contact
    pub destroyer: Id,
    /// The chunk wrapper to remove
    pub chunk: Id,
}
impl_event!(ChunkDestroying);

impl ChunkDestroying {
    pub fn new(destroyer: Id, chunk: Id) -> Self {
        Self {
            header: EventHeader::default(),
            destroyer,
            chunk,
        }
    }
}
