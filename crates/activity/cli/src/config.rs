//! Generator configuration
//!
//! Layered: built-in defaults, then an optional file, then `ACTIVITYGEN__*`
//! environment variables (`__` separates sections, e.g.
//! `ACTIVITYGEN__NAMING__CAPABILITY_NAME`). Command-line flags are applied
//! on top by `main`.

use std::path::PathBuf;

use activity_codegen::{NamingConfig, ReaderConfig};
use serde::{Deserialize, Serialize};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "ACTIVITYGEN";

/// Full generator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Artifact naming affixes
    #[serde(default)]
    pub naming: NamingConfig,

    /// Descriptor reading
    #[serde(default)]
    pub descriptor: ReaderConfig,

    /// Output rendering
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print rendered JSON
    #[serde(default = "default_pretty")]
    pub pretty: bool,

    /// Directory for rendered files when no explicit output path is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// Fail when any method is rejected
    #[serde(default)]
    pub strict: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
            directory: None,
            strict: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON log format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_pretty() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl GeneratorConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&GeneratorConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
