//! vmgraph configuration (`config.toml`)

use anyhow::{Context, Result};
use gcegraph::BuilderOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paths;

// ============================================================================
// Main Config Schema
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct VmgraphConfig {
    /// Defaults for generated VM resources
    #[serde(default)]
    pub builder: BuilderOptions,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print generated JSON
    pub pretty: bool,

    /// Directory generated graphs are written to when no `--output` is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            directory: None,
        }
    }
}

impl OutputConfig {
    /// Expanded output directory, if configured
    pub fn directory_path(&self) -> Option<PathBuf> {
        self.directory.as_deref().map(paths::expand)
    }
}

impl VmgraphConfig {
    /// Load config from an explicit path, or from the default location.
    ///
    /// A missing default file yields the default config; a missing explicit
    /// file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, PathBuf)> {
        match explicit {
            Some(path) => Ok((Self::load_from(path)?, path.to_path_buf())),
            None => {
                let path = paths::config_file()?;
                if !path.exists() {
                    log::debug!("No config at {}, using defaults", path.display());
                    return Ok((Self::default(), path));
                }
                Ok((Self::load_from(&path)?, path))
            }
        }
    }

    /// Load config from a TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Render the effective config as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

// ============================================================================
// Tests
// ============================================================================
