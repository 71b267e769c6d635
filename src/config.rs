//! Render configuration structures and YAML parsing.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

/// Name-scrubbing configuration: how server names map to labels and
/// hub/leaf positions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScrubConfig {
    /// Domain suffix stripped from every server name
    pub domain_suffix: String,
    /// Name prefix marking a relay hub
    pub hub_prefix: String,
    /// Name prefix marking a terminal leaf
    pub leaf_prefix: String,
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self {
            domain_suffix: ".example.net".to_string(),
            hub_prefix: "hub.".to_string(),
            leaf_prefix: "irc.".to_string(),
        }
    }
}

/// Top-level render configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderConfig {
    #[serde(default)]
    pub scrub: ScrubConfig,
    /// Include servers (and their links) that matched no naming
    /// convention. Off by default; filtering is cosmetic and applied at
    /// the formatting boundary only.
    #[serde(default)]
    pub display_all: bool,
    /// GraphViz binary used for PNG rendering
    #[serde(default = "default_dot_binary")]
    pub dot_binary: String,
}

fn default_dot_binary() -> String {
    "dot".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scrub: ScrubConfig::default(),
            display_all: false,
            dot_binary: default_dot_binary(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid scrub configuration: {0}")]
    InvalidScrub(String),
    #[error("Invalid render configuration: {0}")]
    InvalidRender(String),
}

impl RenderConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.scrub.hub_prefix.is_empty() {
            return Err(ValidationError::InvalidScrub(
                "hub_prefix cannot be empty".to_string(),
            ));
        }
        if self.scrub.leaf_prefix.is_empty() {
            return Err(ValidationError::InvalidScrub(
                "leaf_prefix cannot be empty".to_string(),
            ));
        }
        if self.scrub.hub_prefix == self.scrub.leaf_prefix {
            return Err(ValidationError::InvalidScrub(format!(
                "hub_prefix and leaf_prefix are both {:?}; classification would be ambiguous",
                self.scrub.hub_prefix
            )));
        }
        if self.dot_binary.is_empty() {
            return Err(ValidationError::InvalidRender(
                "dot_binary cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load and validate a render configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RenderConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config file {:?}", path))?;
    let config: RenderConfig = serde_yaml::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse config file {:?}", path))?;
    config
        .validate()
        .wrap_err_with(|| format!("Invalid configuration in {:?}", path))?;
    Ok(config)
}
