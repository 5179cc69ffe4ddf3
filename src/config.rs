//! Configuration for the compiler and its script runner
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (linkage.toml)
//! - Environment variables (LINKAGE__*)
//!
//! ## Example config file (linkage.toml):
//! ```toml
//! [output]
//! format = "compact"
//!
//! [script]
//! max_depth = 8
//! base_dir = "./descriptions"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkageConfig {
    /// How saved descriptions are rendered
    #[serde(default)]
    pub output: OutputConfig,

    /// Script runner settings
    #[serde(default)]
    pub script: ScriptConfig,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JSON layout of saved descriptions
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per description
    #[default]
    Compact,
    Pretty,
}

/// Script runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptConfig {
    /// How deeply `run` statements may nest
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Directory that relative top-level script paths resolve against
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
}

fn default_max_depth() -> usize {
    8
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            base_dir: None,
        }
    }
}

impl LinkageConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, optionally from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["linkage.toml", ".linkage.toml", "config/linkage.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("org", "linkage", "linkage") {
            let xdg_config = config_dir.config_dir().join("linkage.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("LINKAGE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Resolve a script path against `script.base_dir`
    pub fn script_path(&self, path: &Path) -> PathBuf {
        match &self.script.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}
