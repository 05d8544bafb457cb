use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Configuration for file-backed save slots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding one file per slot.
    pub root: PathBuf,
    /// File extension for slot files, without the leading dot.
    pub extension: String,
    /// Copy the previous save to `<slot>.<extension>.bak` before replacing it.
    pub keep_backup: bool,
    /// Write indented JSON.
    pub pretty: bool,
    /// Largest save accepted on write or read.
    pub max_bytes: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("saves"),
            extension: "json".to_string(),
            keep_backup: true,
            pretty: false,
            max_bytes: 64 * 1024 * 1024,
        }
    }
}

impl StoreConfig {
    /// Default configuration rooted at `root`.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Parse configuration from a TOML string. Missing keys take defaults.
    pub fn from_toml_str(content: &str) -> StoreResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| StoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load_toml(path: &Path) -> StoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject values no store can work with.
    pub(crate) fn validate(&self) -> StoreResult<()> {
        if self.extension.is_empty() || self.extension.contains(['.', '/', '\\']) {
            return Err(StoreError::Config(format!(
                "extension {:?} must be non-empty and contain no dots or separators",
                self.extension
            )));
        }
        if self.max_bytes == 0 {
            return Err(StoreError::Config("max_bytes must be positive".to_string()));
        }
        Ok(())
    }
}
