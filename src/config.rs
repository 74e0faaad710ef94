//! Configuration file support for the upload form.
//!
//! Limits, messages and the scale range live here so a host page can adjust
//! them without rebuilding. Everything defaults to the stock form.

use serde::{Deserialize, Serialize};

use crate::constants::{self, scale, text};

/// Console verbosity. Serialized in lowercase, e.g. `"debug"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Field validation limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    /// Longest hashtag including `#`
    pub max_hashtag_length: usize,
    /// Most hashtags per post
    pub max_hashtag_count: usize,
    /// Longest description in characters
    pub max_comment_length: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_hashtag_length: constants::MAX_HASHTAG_LENGTH,
            max_hashtag_count: constants::MAX_HASHTAG_COUNT,
            max_comment_length: constants::MAX_COMMENT_LENGTH,
        }
    }
}

/// Preview zoom range, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    pub min: u32,
    pub max: u32,
    pub step: u32,
    pub default: u32,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            min: scale::MIN,
            max: scale::MAX,
            step: scale::STEP,
            default: scale::DEFAULT,
        }
    }
}

/// User-facing strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub bad_hashtag: String,
    pub bad_comment: String,
    /// Submit button label while idle
    pub submit_idle: String,
    /// Submit button label while a submission is in flight
    pub submit_sending: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            bad_hashtag: text::BAD_HASHTAG.to_string(),
            bad_comment: text::BAD_COMMENT.to_string(),
            submit_idle: text::SUBMIT_IDLE.to_string(),
            submit_sending: text::SUBMIT_SENDING.to_string(),
        }
    }
}

/// Form configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Where submissions are posted
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub limits: ValidationLimits,

    #[serde(default)]
    pub scale: ScaleConfig,

    #[serde(default)]
    pub messages: Messages,

    /// Extensions the upload input accepts, without the dot
    #[serde(default = "default_accepted_extensions")]
    pub accepted_extensions: Vec<String>,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_endpoint() -> String {
    constants::DEFAULT_ENDPOINT.to_string()
}

fn default_accepted_extensions() -> Vec<String> {
    constants::IMAGE_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

impl FormConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            endpoint: default_endpoint(),
            limits: ValidationLimits::default(),
            scale: ScaleConfig::default(),
            messages: Messages::default(),
            accepted_extensions: default_accepted_extensions(),
            log_level: LogLevel::default(),
        }
    }

    /// Pretty-printed JSON, as `from_json` reads it back.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse and check a configuration. Missing sections take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_VERSION,
            });
        }

        config.check_scale()?;
        Ok(config)
    }

    fn check_scale(&self) -> Result<(), ConfigError> {
        let ScaleConfig {
            min,
            max,
            step,
            default,
        } = self.scale;
        if step == 0 || min > max || !(min..=max).contains(&default) {
            return Err(ConfigError::InvalidScale { min, max, default });
        }
        Ok(())
    }

    /// Read configuration from a JSON file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "imgpost-config";

    /// Stored configuration from `localStorage`, if the page saved one.
    #[cfg(target_arch = "wasm32")]
    pub fn load_from_local_storage() -> Result<Option<Self>, ConfigError> {
        let storage = web_sys::window()
            .and_then(|window| window.local_storage().ok().flatten())
            .ok_or_else(|| ConfigError::Storage("localStorage unavailable".to_string()))?;
        let stored = storage
            .get_item(Self::STORAGE_KEY)
            .map_err(|e| ConfigError::Storage(format!("{:?}", e)))?;
        stored.map(|json| Self::from_json(&json)).transpose()
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a configuration could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Configuration version {found} is not supported (newest is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Empty range, zero step, or a default outside the range
    #[error("Invalid scale range {min}..={max} with default {default}")]
    InvalidScale { min: u32, max: u32, default: u32 },

    #[error("Cannot read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read stored configuration: {0}")]
    Storage(String),
}
