//! Box colliders attached to scene nodes

use serde::{Deserialize, Serialize};
use strider_math::{Aabb2, Vec2};

/// How a collider takes part in queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColliderKind {
    /// Blocks line probes and can be touched by sensors
    Solid,
    /// Trigger region: reports contacts, invisible to line probes
    Sensor,
}

/// Axis-aligned box collider, positioned relative to its node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    /// Full width and height
    pub size: Vec2,
    /// Center offset from the node's world position
    pub offset: Vec2,
    pub kind: ColliderKind,
    pub enabled: bool,
}

impl Collider {
    /// Create a solid box
    pub fn solid(size: Vec2) -> Self {
        Self {
            size,
            offset: Vec2::ZERO,
            kind: ColliderKind::Solid,
            enabled: true,
        }
    }

    /// Create a trigger box
    pub fn sensor(size: Vec2) -> Self {
        Self {
            size,
            offset: Vec2::ZERO,
            kind: ColliderKind::Sensor,
            enabled: true,
        }
    }

    /// Set center offset
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn is_sensor(&self) -> bool {
        self.kind == ColliderKind::Sensor
    }

    /// World-space box for a node at `world_position`
    pub fn bounds_at(&self, world_position: Vec2) -> Aabb2 {
        Aabb2::from_center_size(world_position + self.offset, self.size)
    }
}
