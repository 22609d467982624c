//! Image list configuration.
//!
//! YAML document with an `images` sequence; `target` and `command` optionally override the
//! probe. Only structural parsing happens here: any malformed document is a fatal startup
//! error, and image references are passed through untouched.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "images.yaml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub command: Option<Vec<String>>,
}

pub fn parse_config(text: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(text).context("invalid config document")?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&text).with_context(|| format!("failed to parse config {}", path.display()))
}

/// Config path precedence: explicit flag, then `IMAGE_PROBE_CONFIG`, then `images.yaml`.
pub fn config_path(flag: Option<&Path>) -> PathBuf {
    if let Some(p) = flag {
        return p.to_path_buf();
    }
    if let Ok(v) = env::var("IMAGE_PROBE_CONFIG") {
        let t = v.trim();
        if !t.is_empty() {
            return PathBuf::from(t);
        }
    }
    PathBuf::from(DEFAULT_CONFIG_FILE)
}
