//! Error types for chunk streaming

use strider_scene::SceneError;
use thiserror::Error;

/// Streaming errors
#[derive(Debug, Error)]
pub enum StreamingError {
    /// The coordinator is not parented to the expected host node.
    /// A scene-setup bug, never retried.
    #[error("Streaming coordinator must be parented to {expected:?}, found {found:?}")]
    MissingHost {
        expected: String,
        found: Option<String>,
    },

    /// Invalid configuration
    #[error("Invalid streaming configuration: {0}")]
    InvalidConfig(String),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for streaming operations
pub type Result<T> = std::result::Result<T, StreamingError>;
