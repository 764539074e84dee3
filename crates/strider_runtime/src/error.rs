//! Runtime errors

use strider_scene::SceneError;
use strider_streaming::StreamingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Streaming error: {0}")]
    Streaming(#[from] StreamingError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid runtime configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
