//! Configuration file handling for menu-ascii.
//!
//! Loads configuration from `~/.config/menu-ascii/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default art width in characters.
pub const DEFAULT_WIDTH: u32 = 60;

/// Default art height in characters.
pub const DEFAULT_HEIGHT: u32 = 30;

/// Default directory for generated images.
pub const DEFAULT_OUTPUT_DIR: &str = "generated_images";

/// Configuration file structure.
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub fal: FalConfig,
    #[serde(default)]
    pub templates: TemplatesConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct RenderConfig {
    #[serde(default)]
    pub ai_images: bool,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            ai_images: false,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct FalConfig {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct TemplatesConfig {
    /// Path to a TOML template catalog replacing the built-in one.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            source: e,
        })?;
        config.validate(&path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        if self.render.width == 0 || self.render.height == 0 {
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                reason: "render.width and render.height must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config file '{}': {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("menu-ascii").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/menu-ascii/config.toml")
        })
}
