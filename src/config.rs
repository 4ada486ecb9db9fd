use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::Audit;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ENV: &str = "dev";
pub const DEFAULT_CREATED_BY: &str = "system";

/// Source of a configuration value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    fn set(&mut self, value: T, source: ConfigSource) {
        self.value = value;
        self.source = source;
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Path to the SQLite database
    pub database_path: ConfigValue<PathBuf>,
    /// Port the HTTP server listens on
    pub port: ConfigValue<u16>,
    /// Deployment environment recorded in audit metadata
    pub env: ConfigValue<String>,
    /// Creator recorded on documents created through this process
    pub created_by: ConfigValue<String>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    database_path: Option<PathBuf>,
    port: Option<u16>,
    env: Option<String>,
    created_by: Option<String>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with(config_path, |name| std::env::var(name).ok())
    }

    /// Like [`Config::load`], reading variables through `var`.
    pub fn load_with<F>(config_path: Option<PathBuf>, var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            database_path: ConfigValue::new(
                Self::default_data_dir().join("amata.db"),
                ConfigSource::Default,
            ),
            port: ConfigValue::new(DEFAULT_PORT, ConfigSource::Default),
            env: ConfigValue::new(DEFAULT_ENV.to_string(), ConfigSource::Default),
            created_by: ConfigValue::new(DEFAULT_CREATED_BY.to_string(), ConfigSource::Default),
            config_file: None,
        };

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            config.apply_file(&path)?;
        }

        if let Some(db_path) = var("AMATA_DATABASE_PATH") {
            config
                .database_path
                .set(PathBuf::from(db_path), ConfigSource::Environment);
        }
        if let Some(port) = var("AMATA_PORT") {
            let port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("AMATA_PORT", port.clone()))?;
            config.port.set(port, ConfigSource::Environment);
        }
        if let Some(env) = var("AMATA_ENV") {
            config.env.set(env, ConfigSource::Environment);
        }
        if let Some(user) = var("AMATA_CREATED_BY") {
            config.created_by.set(user, ConfigSource::Environment);
        }

        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;
        let file_config: ConfigFile = serde_yaml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))?;

        self.config_file = Some(path.to_path_buf());

        if let Some(db_path) = file_config.database_path {
            // Resolve relative paths against config file's directory
            let resolved = if db_path.is_relative() {
                path.parent().map(|p| p.join(&db_path)).unwrap_or(db_path)
            } else {
                db_path
            };
            self.database_path.set(resolved, ConfigSource::File);
        }
        if let Some(port) = file_config.port {
            self.port.set(port, ConfigSource::File);
        }
        if let Some(env) = file_config.env {
            self.env.set(env, ConfigSource::File);
        }
        if let Some(user) = file_config.created_by {
            self.created_by.set(user, ConfigSource::File);
        }
        Ok(())
    }

    /// Audit metadata for documents created under this configuration.
    pub fn audit(&self) -> Audit {
        Audit::created(self.env.value.clone(), Some(self.created_by.value.clone()))
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/amata/
    /// - macOS: ~/Library/Application Support/amata/
    /// - Windows: %APPDATA%/amata/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("amata")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/amata/
    /// - macOS: ~/Library/Application Support/amata/
    /// - Windows: %APPDATA%/amata/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("amata")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {1}", path = .0.display())]
    ReadError(PathBuf, #[source] std::io::Error),
    #[error("Failed to parse config file '{path}': {1}", path = .0.display())]
    ParseError(PathBuf, #[source] serde_yaml::Error),
    #[error("Invalid value for {0}: '{1}'")]
    InvalidValue(&'static str, String),
}
