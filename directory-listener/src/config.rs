//! Listener configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Configuration for a directory listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerConfig {
    /// Directory to watch.
    pub path: PathBuf,

    /// Whether sub-directories are watched too.
    #[serde(default)]
    pub recursive: bool,

    /// Capacity of the queue between the OS watcher and the dispatcher.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    1000
}

impl ListenerConfig {
    /// Create a new, non-recursive listener config.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            recursive: false,
            channel_capacity: default_channel_capacity(),
        }
    }

    /// Set whether sub-directories are watched.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set the event queue capacity.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Parse a config from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(s)?;
        config.channel_capacity = config.channel_capacity.max(1);
        Ok(config)
    }

    /// Load a config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
