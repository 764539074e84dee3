//! Travel direction

use serde::{Deserialize, Serialize};

/// Which way a character travels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn from_right(facing_right: bool) -> Self {
        if facing_right {
            Self::Right
        } else {
            Self::Left
        }
    }

    /// Direction of a horizontal delta; `None` for zero (or NaN)
    pub fn from_delta(dx: f32) -> Option<Self> {
        if dx > 0.0 {
            Some(Self::Right)
        } else if dx < 0.0 {
            Some(Self::Left)
        } else {
            None
        }
    }

    pub fn is_right(self) -> bool {
        self == Self::Right
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// `1.0` for right, `-1.0` for left
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

impl Default for Facing {
    fn default() -> Self {
        Self::Right
    }
}
