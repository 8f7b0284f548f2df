//! Configuration loading and management
//!
//! Handles parsing of `.slate.toml` configuration files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::history::DEFAULT_HISTORY_CAPACITY;

/// Name of the configuration file at the workspace root
pub const CONFIG_FILE: &str = ".slate.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Storage backing configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Viewed-history configuration
    #[serde(default)]
    pub history: HistoryConfig,
}

impl Config {
    /// Load configuration from `root`, falling back to defaults when the
    /// file is absent. Invalid TOML is an error, not a silent default.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&text)?)
    }
}

/// Storage-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Which backing to use: "file" or "memory"
    #[serde(default = "default_backend")]
    pub backend: BackendKind,

    /// Data file path, relative to the workspace root
    #[serde(default = "default_data_file")]
    pub path: PathBuf,
}

/// Persistence backing selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    File,
    Memory,
}

fn default_backend() -> BackendKind {
    BackendKind::File
}

fn default_data_file() -> PathBuf {
    PathBuf::from(".slate/tasks.csv")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_data_file(),
        }
    }
}

/// Viewed-history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Number of distinct viewed records to retain
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}
