//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: QueryDefaults,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values applied to queries that do not set them
#[derive(Debug, Clone, Deserialize)]
pub struct QueryDefaults {
    pub database: Option<String>,

    pub retention_policy: Option<String>,

    #[serde(default = "default_relation")]
    pub relation: String,
}

fn default_relation() -> String {
    "and".to_string()
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            database: None,
            retention_policy: None,
            relation: default_relation(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("influxql").join("config.toml")),
            Some(PathBuf::from("/etc/influxql/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Query defaults
        if let Ok(database) = std::env::var("INFLUXQL_DATABASE") {
            self.defaults.database = Some(database);
        }
        if let Ok(rp) = std::env::var("INFLUXQL_RETENTION_POLICY") {
            self.defaults.retention_policy = Some(rp);
        }
        if let Ok(relation) = std::env::var("INFLUXQL_RELATION") {
            self.defaults.relation = relation;
        }

        // Logging overrides
        if let Ok(level) = std::env::var("INFLUXQL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("INFLUXQL_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# influxql configuration
#
# Environment variables override these settings:
# - INFLUXQL_DATABASE
# - INFLUXQL_RETENTION_POLICY
# - INFLUXQL_RELATION
# - INFLUXQL_LOG_LEVEL
# - INFLUXQL_LOG_FORMAT

[defaults]
# Database used when a query document does not name one
# database = "mydb"

# Retention policy used when a query document does not name one
# retention_policy = "autogen"

# Relation joining top-level conditions: and, or
relation = "and"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
