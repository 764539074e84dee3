//! Intersection tests
//!
//! - Segment vs box (slab method), used by line probes
//! - Box vs box, used by trigger overlap tracking

use crate::bounds::Aabb2;
use crate::consts::EPSILON;
use crate::vector::Vec2;

/// Segment-box intersection using the slab method
///
/// Returns the normalized parameter `t` in `[0, 1]` along `a -> b` of the
/// first contact, or `None` when the segment misses. A segment starting
/// inside the box reports `t = 0`.
pub fn segment_aabb(a: Vec2, b: Vec2, aabb: &Aabb2) -> Option<f32> {
    let d = b - a;
    let mut t_min = 0.0f32;
    let mut t_max = 1.0f32;

    for (origin, dir, lo, hi) in [
        (a.x, d.x, aabb.min.x, aabb.max.x),
        (a.y, d.y, aabb.min.y, aabb.max.y),
    ] {
        if dir.abs() < EPSILON {
            // Parallel to this slab: must already be within it
            if origin < lo || origin > hi {
                return None;
            }
        } else {
            let inv = 1.0 / dir;
            let mut t1 = (lo - origin) * inv;
            let mut t2 = (hi - origin) * inv;
            if t1 > t2 {
                core::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }
    }

    Some(t_min)
}

/// Whether the segment `a -> b` touches the box at all
#[inline]
pub fn segment_hits_aabb(a: Vec2, b: Vec2, aabb: &Aabb2) -> bool {
    segment_aabb(a, b, aabb).is_some()
}

/// Box-box overlap (touching edges count as overlap)
#[inline]
pub fn aabb_overlap(a: &Aabb2, b: &Aabb2) -> bool {
    a.min.x <= b.max.x && a.max.x >= b.min.x && a.min.y <= b.max.y && a.max.y >= b.min.y
}
