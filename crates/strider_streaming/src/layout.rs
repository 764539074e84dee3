//! Checker and destroyer placement relative to the coordinator

use crate::config::StreamingConfig;
use strider_character::Facing;
use strider_math::Vec2;

/// Local positions of every checker and destroyer slot
#[derive(Debug, Clone, PartialEq)]
pub struct StreamingLayout {
    /// Interior checkers: the center one first (odd totals only), then the
    /// left side outward, then the right side outward
    pub middle: Vec<Vec2>,
    pub left_edge: Vec2,
    pub right_edge: Vec2,
    pub left_destroyer: Vec2,
    pub right_destroyer: Vec2,
}

impl StreamingLayout {
    /// Lay out `total_checkers()` checkers at chunk-width spacing.
    ///
    /// With an odd total a checker sits at the origin and the sides start one
    /// chunk out; with an even total the sides start half a chunk out. Each
    /// side gets `total / 2 - 1` middle checkers and the next slot outward
    /// is that side's edge. Destroyers sit one chunk beyond the edges.
    pub fn compute(config: &StreamingConfig) -> Self {
        let width = config.chunk_width;
        let total = config.total_checkers();
        let per_side = total / 2 - 1;
        let y = config.marker_y;

        let mut middle = Vec::with_capacity(total as usize - 2);
        let start = if total % 2 == 0 {
            width / 2.0
        } else {
            middle.push(Vec2::new(0.0, y));
            width
        };

        let mut x = -start;
        for _ in 0..per_side {
            middle.push(Vec2::new(x, y));
            x -= width;
        }
        let left_edge = Vec2::new(x, y);

        let mut x = start;
        for _ in 0..per_side {
            middle.push(Vec2::new(x, y));
            x += width;
        }
        let right_edge = Vec2::new(x, y);

        let margin = left_edge.x.abs() + width;

        Self {
            middle,
            left_edge,
            right_edge,
            left_destroyer: Vec2::new(-margin, y),
            right_destroyer: Vec2::new(margin, y),
        }
    }

    /// The edge slot on the `facing` side
    pub fn edge(&self, facing: Facing) -> Vec2 {
        match facing {
            Facing::Left => self.left_edge,
            Facing::Right => self.right_edge,
        }
    }

    pub fn checker_count(&self) -> usize {
        self.middle.len() + 2
    }
}
