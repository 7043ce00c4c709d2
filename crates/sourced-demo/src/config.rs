//! Configuration loading for the demo binary.
//!
//! The canonical configuration lives in `sourced-config.yaml` at the project
//! root. Every section is optional and falls back to defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use sourced_aggregate::{RulesError, ValidationRules};
use sourced_types::{UnknownEventPolicy, UserId, UserProfile};

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "SOURCED_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is not set.
pub const DEFAULT_CONFIG_PATH: &str = "sourced-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override carried a value that does not parse.
    #[error("invalid value {value:?} for {key}")]
    InvalidOverride {
        /// The environment variable.
        key: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The `validation` section contradicts itself.
    #[error("{source}")]
    InvalidRules {
        /// The underlying rules error.
        #[from]
        source: RulesError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level demo configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DemoConfig {
    /// Rules applied to user changes.
    #[serde(default)]
    pub validation: ValidationRules,

    /// Raw history replay settings.
    #[serde(default)]
    pub replay: ReplayConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// The user every scenario starts from.
    #[serde(default)]
    pub seed: SeedConfig,

    /// Shared-handle scenario settings.
    #[serde(default)]
    pub concurrency: ConcurrencyConfig,
}

/// Where a loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from this file.
    File(PathBuf),
    /// No file at [`DEFAULT_CONFIG_PATH`]; built-in defaults were used.
    Defaults,
}

impl DemoConfig {
    /// Locate and load the configuration, reading variables through `lookup`
    /// (normally the process environment).
    ///
    /// If `SOURCED_CONFIG` is set, that file must exist. Otherwise
    /// `sourced-config.yaml` is read when present, and defaults are used
    /// when it is not.
    pub fn load<F>(lookup: F) -> Result<(Self, ConfigSource), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            let config = Self::from_file(&path, &lookup)?;
            return Ok((config, ConfigSource::File(path)));
        }

        let path = Path::new(DEFAULT_CONFIG_PATH);
        if path.exists() {
            let config = Self::from_file(path, &lookup)?;
            return Ok((config, ConfigSource::File(path.to_path_buf())));
        }

        let mut config = Self::default();
        config.apply_overrides(&lookup)?;
        config.validation.check()?;
        Ok((config, ConfigSource::Defaults))
    }

    /// Load configuration from a YAML file at the given path.
    ///
    /// Variables read through `lookup` override file values:
    /// - `SOURCED_UNKNOWN_EVENTS` overrides `replay.unknown_event_policy`
    /// - `SOURCED_LOG_LEVEL` overrides `logging.level`
    pub fn from_file<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents, lookup)
    }

    /// Parse configuration from a YAML string, then apply overrides.
    ///
    /// The validation rules are checked after overrides are applied.
    pub fn parse<F>(yaml: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_overrides(lookup)?;
        config.validation.check()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("SOURCED_UNKNOWN_EVENTS") {
            self.replay.unknown_event_policy =
                UnknownEventPolicy::parse(&val).ok_or(ConfigError::InvalidOverride {
                    key: "SOURCED_UNKNOWN_EVENTS",
                    value: val,
                })?;
        }
        if let Some(val) = lookup("SOURCED_LOG_LEVEL") {
            self.logging.level = val;
        }
        Ok(())
    }
}

/// Raw history replay settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReplayConfig {
    /// What to do with unrecognised event types.
    #[serde(default)]
    pub unknown_event_policy: UnknownEventPolicy,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins if set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
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

/// The user scenarios start from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedConfig {
    /// Numeric identity, expanded into a UUID.
    #[serde(default = "default_seed_id")]
    pub id: u64,

    /// Initial display name.
    #[serde(default = "default_seed_name")]
    pub name: String,

    /// Initial email address.
    #[serde(default = "default_seed_email")]
    pub email: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            id: default_seed_id(),
            name: default_seed_name(),
            email: default_seed_email(),
        }
    }
}

impl SeedConfig {
    /// The seed user's identity.
    pub fn user_id(&self) -> UserId {
        UserId::from_u128(u128::from(self.id))
    }

    /// The seed user's initial fields.
    pub fn profile(&self) -> UserProfile {
        UserProfile::new(self.name.clone(), self.email.clone())
    }
}

/// Settings for the concurrent-writers scenario.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConcurrencyConfig {
    /// Number of tasks changing the same user at once.
    #[serde(default = "default_writers")]
    pub writers: u32,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            writers: default_writers(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_seed_id() -> u64 {
    1
}

fn default_seed_name() -> String {
    "Alice".to_owned()
}

fn default_seed_email() -> String {
    "alice@example.com".to_owned()
}

const fn default_writers() -> u32 {
    16
}
