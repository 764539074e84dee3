//! Streaming configuration
//!
//! ```toml
//! chunk_width = 16.0
//! minimum_chunks = 2
//! preload_chunks = 0
//! marker_y = -10.0
//! marker_height = 0.5
//! checker_extent = { x = 0.5, y = 0.5 }
//! initial_facing = "right"
//! host_name = "SceneBox"
//! repository_name = "ChunkRepository"
//! ```

use crate::error::{Result, StreamingError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use strider_character::Facing;
use strider_math::Vec2;

/// Upper bound on `minimum_chunks + preload_chunks`
pub const MAX_CHUNKS: u32 = 256;

/// Chunk geometry and coordinator placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Width of one chunk in world units
    pub chunk_width: f32,
    /// Chunks kept loaded around the host, at least 1
    pub minimum_chunks: u32,
    /// Extra chunks loaded on top of `minimum_chunks`
    pub preload_chunks: u32,
    /// Vertical offset of checkers, destroyers and wrapper markers
    pub marker_y: f32,
    /// Height of the boundary marker on each chunk wrapper
    pub marker_height: f32,
    /// Half size of a checker; probes span `±extent.y`
    pub checker_extent: Vec2,
    /// Facing applied when the coordinator attaches
    pub initial_facing: Facing,
    /// Name of the node the coordinator must be parented to
    pub host_name: String,
    /// Name of the root node holding every chunk wrapper
    pub repository_name: String,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_width: 16.0,
            minimum_chunks: 2,
            preload_chunks: 0,
            marker_y: -10.0,
            marker_height: 0.5,
            checker_extent: Vec2::new(0.5, 0.5),
            initial_facing: Facing::Right,
            host_name: "SceneBox".to_string(),
            repository_name: "ChunkRepository".to_string(),
        }
    }
}

impl StreamingConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.chunk_width.is_finite() || self.chunk_width <= 0.0 {
            return Err(StreamingError::InvalidConfig(format!(
                "chunk_width must be positive, got {}",
                self.chunk_width
            )));
        }
        if self.minimum_chunks == 0 {
            return Err(StreamingError::InvalidConfig(
                "minimum_chunks must be at least 1".to_string(),
            ));
        }
        match self.minimum_chunks.checked_add(self.preload_chunks) {
            Some(total) if total <= MAX_CHUNKS => {}
            _ => {
                return Err(StreamingError::InvalidConfig(format!(
                    "minimum_chunks + preload_chunks must not exceed {}, got {} + {}",
                    MAX_CHUNKS, self.minimum_chunks, self.preload_chunks
                )))
            }
        }
        if self.marker_height.is_nan() || self.marker_height < 0.0 {
            return Err(StreamingError::InvalidConfig(format!(
                "marker_height must not be negative, got {}",
                self.marker_height
            )));
        }
        if !self.marker_y.is_finite() {
            return Err(StreamingError::InvalidConfig(
                "marker_y must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Chunks the coordinator maintains, `minimum_chunks + preload_chunks`
    pub fn chunks_to_maintain(&self) -> u32 {
        self.minimum_chunks.saturating_add(self.preload_chunks)
    }

    /// Checkers created on attach, edges included
    pub fn total_checkers(&self) -> u32 {
        self.chunks_to_maintain().saturating_add(2)
    }

    /// Index of the chunk containing world x
    pub fn chunk_index(&self, x: f32) -> i32 {
        (x / self.chunk_width).floor() as i32
    }

    /// World x of the center of chunk `index`
    pub fn chunk_center(&self, index: i32) -> f32 {
        index as f32 * self.chunk_width + self.chunk_width / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StreamingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.total_checkers(), 4);
        assert_eq!(config.host_name, "SceneBox");
    }

    #[test]
    fn test_chunk_index_buckets() {
        let config = StreamingConfig::default();
        assert_eq!(config.chunk_index(23.999), 1);
        assert_eq!(config.chunk_index(-0.001), -1);
        assert_eq!(config.chunk_index(0.0), 0);
        assert_eq!(config.chunk_index(16.0), 1);
        assert_eq!(config.chunk_index(-16.0), -1);
        assert_eq!(config.chunk_center(-1), -8.0);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = StreamingConfig::from_toml_str(
            r#"
            minimum_chunks = 3
            initial_facing = "left"
            checker_extent = { x = 0.25, y = 1.0 }
            "#,
        )
        .unwrap();

        assert_eq!(config.minimum_chunks, 3);
        assert_eq!(config.initial_facing, Facing::Left);
        assert_eq!(config.checker_extent, Vec2::new(0.25, 1.0));
        assert_eq!(config.chunk_width, 16.0);
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(matches!(
            StreamingConfig::from_toml_str("minimum_chunks = 0"),
            Err(StreamingError::InvalidConfig(_))
        ));
        assert!(matches!(
            StreamingConfig::from_toml_str("chunk_width = -1.0"),
            Err(StreamingError::InvalidConfig(_))
        ));
        assert!(matches!(
            StreamingConfig::from_toml_str("marker_height = -0.5"),
            Err(StreamingError::InvalidConfig(_))
        ));
        assert!(matches!(
            StreamingConfig::from_toml_str("chunk_width = \"wide\""),
            Err(StreamingError::Toml(_))
        ));
    }

    #[test]
    fn test_rejects_oversized_window() {
        let config = StreamingConfig {
            preload_chunks: u32::MAX,
            ..StreamingConfig::default()
        };
        assert!(matches!(config.validate(), Err(StreamingError::InvalidConfig(_))));
        assert_eq!(config.total_checkers(), u32::MAX);

        let config = StreamingConfig {
            minimum_chunks: 200,
            preload_chunks: 57,
            ..StreamingConfig::default()
        };
        assert!(matches!(config.validate(), Err(StreamingError::InvalidConfig(_))));

        let config = StreamingConfig {
            minimum_chunks: 200,
            preload_chunks: 56,
            ..StreamingConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
