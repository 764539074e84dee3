//! Runtime configuration
//!
//! Sources, in priority order:
//! 1. The file named by `STRIDER_CONFIG`
//! 2. The first non-flag command line argument
//! 3. Built-in defaults
//!
//! ```toml
//! [bus]
//! limit_queue_processing = true
//! queue_budget_ms = 2
//!
//! [streaming]
//! chunk_width = 16.0
//! minimum_chunks = 3
//!
//! [simulation]
//! ticks = 600
//! speed = 0.5
//! reverse_every = 200
//! ```

use crate::error::{Result, RuntimeError};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use strider_event::BusConfig;
use strider_streaming::StreamingConfig;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "STRIDER_CONFIG";

/// Scripted traversal driving the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of ticks to run
    pub ticks: u64,
    /// World units travelled per tick
    pub speed: f32,
    /// Reverse direction every N ticks, 0 = never
    pub reverse_every: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks: 400,
            speed: 1.0,
            reverse_every: 150,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub bus: BusConfig,
    pub streaming: StreamingConfig,
    pub simulation: SimulationConfig,

    /// Path this config was loaded from
    #[serde(skip)]
    pub config_path: Option<String>,
}

impl RuntimeConfig {
    /// Load from the environment and command line
    pub fn load() -> Result<Self> {
        let env = std::env::var(CONFIG_ENV).ok();
        let args: Vec<String> = std::env::args().skip(1).collect();
        match Self::resolve_path(env, &args) {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Pick the config path: a non-empty `env` wins over the first
    /// argument not starting with `--`
    pub fn resolve_path(env: Option<String>, args: &[String]) -> Option<String> {
        env.filter(|path| !path.is_empty())
            .or_else(|| args.iter().find(|arg| !arg.starts_with("--")).cloned())
    }

    /// Load from a TOML file. A missing file falls back to defaults.
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::warn!("Config {} not found, using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(RuntimeError::Io {
                    path: path.to_string(),
                    source,
                })
            }
        };
        let mut config = Self::from_toml_str(&content)?;
        config.config_path = Some(path.to_string());
        log::info!("Loaded config from {}", path);
        Ok(config)
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the streaming section, and that the player never crosses a
    /// whole chunk in one tick
    pub fn validate(&self) -> Result<()> {
        self.streaming.validate()?;
        let speed = self.simulation.speed;
        if !speed.is_finite() || speed < 0.0 {
            return Err(RuntimeError::InvalidConfig(format!(
                "simulation.speed must be a non-negative number, got {}",
                speed
            )));
        }
        if speed >= self.streaming.chunk_width {
            return Err(RuntimeError::InvalidConfig(format!(
                "simulation.speed {} must stay below chunk_width {}",
                speed, self.streaming.chunk_width
            )));
        }
        Ok(())
    }

    pub fn print_summary(&self) {
        log::info!("Runtime Configuration:");
        log::info!(
            "  Chunks: width={}, minimum={}, preload={}",
            self.streaming.chunk_width,
            self.streaming.minimum_chunks,
            self.streaming.preload_chunks
        );
        log::info!(
            "  Simulation: {} ticks at {}/tick, reversing every {}",
            self.simulation.ticks,
            self.simulation.speed,
            self.simulation.reverse_every
        );
        match self.bus.budget() {
            Some(budget) => log::info!("  Queue budget: {:?}", budget),
            None => log::info!("  Queue budget: unlimited"),
        }
        if let Some(path) = &self.config_path {
            log::info!("  Config: {}", path);
        }
    }
}
