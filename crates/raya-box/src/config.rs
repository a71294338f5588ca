//! Configuration file parsing (raya-box.toml)

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use termcolor::{Color, ColorChoice};
use thiserror::Error;

use crate::guard::{resolve_color_choice, ReportStyle};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "raya-box.toml";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    Validation(String),
}

/// Configuration file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BoxConfig {
    /// Factory options
    #[serde(default)]
    pub factory: FactoryConfig,

    /// Report presentation
    #[serde(default)]
    pub report: ReportConfig,
}

/// `[factory]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactoryConfig {
    /// Bare calls produce boxed values (default: true)
    #[serde(default = "default_auto_box_literals")]
    pub auto_box_literals: bool,
}

fn default_auto_box_literals() -> bool {
    true
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            auto_box_literals: default_auto_box_literals(),
        }
    }
}

/// `[report]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    /// Report color: a color name, an ANSI 256 index, or "r,g,b"
    #[serde(default = "default_color")]
    pub color: String,

    /// "auto", "always" or "never"
    #[serde(default = "default_choice")]
    pub choice: String,
}

fn default_color() -> String {
    "red".to_string()
}

fn default_choice() -> String {
    "auto".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
            choice: default_choice(),
        }
    }
}

impl ReportConfig {
    /// Parsed report style
    pub fn style(&self) -> Result<ReportStyle, ConfigError> {
        let color = Color::from_str(&self.color).map_err(|e| {
            ConfigError::Validation(format!("Invalid report color '{}': {}", self.color, e))
        })?;
        Ok(ReportStyle { color })
    }

    /// Color choice after applying `NO_COLOR`
    pub fn color_choice(&self) -> ColorChoice {
        resolve_color_choice(Some(&self.choice))
    }
}

impl BoxConfig {
    /// Parse a configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a configuration from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: BoxConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else `raya-box.toml` in `dir` if present,
    /// else defaults
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Self::from_file(&candidate);
        }
        Ok(Self::default())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.report.style()?;
        if !matches!(self.report.choice.as_str(), "auto" | "always" | "never") {
            return Err(ConfigError::Validation(format!(
                "Invalid color choice: {}. Must be one of auto, always, never",
                self.report.choice
            )));
        }
        Ok(())
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the configuration to a file
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}
