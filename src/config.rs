//! Configuration management for the kind registry
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (kinds.toml)
//! - Environment variables (KINDS__*)
//!
//! ## Example config file (kinds.toml):
//! ```toml
//! [registry]
//! path = "./kinds.yaml"
//! embedded_fallback = true
//!
//! [output]
//! format = "pretty"
//!
//! [synthesis]
//! unnamed_tags = "label"
//! constrained = "first"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::synth::SynthesisConfig;

/// Main configuration for the kind registry
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KindsConfig {
    /// Schema document settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Example synthesis settings
    #[serde(default)]
    pub synthesis: SynthesisConfig,
}

/// Where the kinds document comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Path to the kinds YAML document
    #[serde(default = "default_schema_path")]
    pub path: PathBuf,

    /// Use the bundled document when `path` does not exist
    #[serde(default = "default_true")]
    pub embedded_fallback: bool,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// JSON layout for example events
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

fn default_schema_path() -> PathBuf {
    PathBuf::from("kinds.yaml")
}

fn default_true() -> bool {
    true
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: default_schema_path(),
            embedded_fallback: true,
        }
    }
}

impl KindsConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering a specific file over the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["kinds.toml", ".kinds.toml", "config/kinds.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "kind-registry") {
            let xdg_config = config_dir.config_dir().join("kinds.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // KINDS__REGISTRY__PATH=..., KINDS__SYNTHESIS__CONSTRAINED=random
        builder = builder.add_source(
            Environment::with_prefix("KINDS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Get the schema document path (resolves relative paths)
    pub fn schema_path(&self) -> PathBuf {
        if self.registry.path.is_absolute() {
            self.registry.path.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&self.registry.path)
        }
    }
}
