//! Editor configuration, loaded from YAML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use flate2::Compression;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::terrain::{DEFAULT_TILE, TILE_MASK};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo entries kept before the oldest is evicted
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Debounce delay between an edit and its snapshot
    #[serde(default = "default_snapshot_delay_ms")]
    pub snapshot_delay_ms: u64,

    /// Fixed capacity of the compressed snapshot buffer
    #[serde(default = "default_snapshot_buffer_bytes")]
    pub snapshot_buffer_bytes: usize,

    /// zlib level, 0-9
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,

    /// Tile new maps are filled with
    #[serde(default = "default_tile")]
    pub default_tile: u16,
}

fn default_history_capacity() -> usize {
    16
}
fn default_snapshot_delay_ms() -> u64 {
    3000
}
fn default_snapshot_buffer_bytes() -> usize {
    4 * 1024 * 1024
}
fn default_compression_level() -> u32 {
    6
}
fn default_tile() -> u16 {
    DEFAULT_TILE
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            snapshot_delay_ms: default_snapshot_delay_ms(),
            snapshot_buffer_bytes: default_snapshot_buffer_bytes(),
            compression_level: default_compression_level(),
            default_tile: default_tile(),
        }
    }
}

impl EditorConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`EditorConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid(
                "history_capacity must be at least 1".into(),
            ));
        }
        if self.snapshot_buffer_bytes == 0 {
            return Err(ConfigError::Invalid(
                "snapshot_buffer_bytes must be non-zero".into(),
            ));
        }
        if self.compression_level > 9 {
            return Err(ConfigError::Invalid(format!(
                "compression_level {} is above 9",
                self.compression_level
            )));
        }
        if self.default_tile & !TILE_MASK != 0 {
            return Err(ConfigError::Invalid(format!(
                "default_tile {:#06x} is wider than 12 bits",
                self.default_tile
            )));
        }
        Ok(())
    }

    pub fn snapshot_delay(&self) -> Duration {
        Duration::from_millis(self.snapshot_delay_ms)
    }

    pub fn compression(&self) -> Compression {
        Compression::new(self.compression_level)
    }
}
