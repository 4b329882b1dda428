//! Configuration management for crossmodal

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

/// Main configuration for crossmodal
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub model: ModelSettings,
    pub search: SearchSettings,
    pub embedding: EmbeddingSettings,
}

impl Config {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::config_locations() {
            if path.exists() {
                debug!("Loading configuration from {:?}", path);
                return Self::load_from_path(&path);
            }
        }

        // No config file found, fall back to defaults
        Ok(Self::default())
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get default configuration file locations, in priority order
    pub fn config_locations() -> Vec<PathBuf> {
        let mut locations = Vec::new();

        // 1. Current directory
        locations.push(PathBuf::from(".crossmodal.toml"));

        // 2. User config directory
        if let Some(config_dir) = dirs::config_dir() {
            locations.push(config_dir.join("crossmodal").join("config.toml"));
        }

        // 3. Home directory
        if let Some(home) = dirs::home_dir() {
            locations.push(home.join(".crossmodal.toml"));
        }

        locations
    }

    /// Get the data directory for model storage
    pub fn data_dir() -> Result<PathBuf> {
        if let Some(data_dir) = dirs::data_local_dir() {
            let path = data_dir.join("crossmodal");
            std::fs::create_dir_all(&path)?;
            Ok(path)
        } else {
            Err(Error::Config("Could not determine data directory".into()))
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.embedding_dim == 0 {
            return Err(Error::Config(
                "Invalid embedding_dim 0: must be positive".into(),
            ));
        }

        if self.model.input_resolution == 0 {
            return Err(Error::Config(
                "Invalid input_resolution 0: must be positive".into(),
            ));
        }

        if self.model.max_tokens == 0 {
            return Err(Error::Config(
                "Invalid max_tokens 0: must be positive".into(),
            ));
        }

        if self.search.default_top_k == 0 {
            return Err(Error::Config(
                "Invalid default_top_k 0: must be positive".into(),
            ));
        }

        Ok(())
    }
}

/// Embedding model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Directory holding the ONNX model files; defaults to the platform
    /// data directory when unset
    pub model_dir: Option<PathBuf>,
    /// Embedding dimension shared by the text and image encoders
    pub embedding_dim: usize,
    /// Square input resolution expected by the vision encoder
    pub input_resolution: u32,
    /// Fixed token sequence length for the text encoder
    pub max_tokens: usize,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model_dir: None,
            embedding_dim: 512,
            input_resolution: 224,
            max_tokens: 77,
        }
    }
}

/// Search behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Number of results to return when the caller does not specify one
    pub default_top_k: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { default_top_k: 5 }
    }
}

/// Catalog embedding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Number of threads for parallel catalog embedding; 0 means one per CPU
    pub parallelism: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { parallelism: 0 }
    }
}
