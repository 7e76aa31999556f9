//! Request document loading
//!
//! Documents are JSON by default; files ending in `.toml` are read as TOML.
//! `-` reads JSON from stdin.

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::io::Read;
use std::path::Path;

/// Format of a request document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Toml,
}

impl InputFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

/// Parse document text in the given format
pub fn parse(content: &str, format: InputFormat) -> Result<Value> {
    let value: Value = match format {
        InputFormat::Json => serde_json::from_str(content).context("Invalid JSON request document")?,
        InputFormat::Toml => toml::from_str(content).context("Invalid TOML request document")?,
    };
    if !value.is_object() {
        bail!("Request document must be an object at the top level");
    }
    Ok(value)
}

/// Read a request document from a path, or stdin for `-`
pub fn read(path: &Path) -> Result<Value> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Could not read request from stdin")?;
        log::debug!("Read {} bytes from stdin", content.len());
        return parse(&content, InputFormat::Json);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    log::debug!("Read request from {}", path.display());
    parse(&content, InputFormat::from_path(path))
        .with_context(|| format!("Failed to parse {}", path.display()))
}
