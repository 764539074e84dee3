//! # strider_math - 2D Math
//!
//! The small amount of geometry a side-scroller needs: vectors,
//! axis-aligned boxes, and the segment/box tests behind line probes and
//! trigger overlaps.

pub mod bounds;
pub mod intersect;
pub mod vector;

pub use bounds::*;
pub use intersect::*;
pub use vector::*;

/// Common math constants
pub mod consts {
    pub const EPSILON: f32 = 1e-6;
}

pub mod prelude {
    pub use crate::bounds::Aabb2;
    pub use crate::intersect::{aabb_overlap, segment_aabb, segment_hits_aabb};
    pub use crate::vector::Vec2;
}
