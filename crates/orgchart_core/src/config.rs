//! Runtime configuration for the organization chart core.
//!
//! # Responsibility
//! - Describe API endpoints, image resolution, parent policy and logging.
//! - Provide production/development presets and JSON loading.
//!
//! # Invariants
//! - A config returned by `from_json_str`/`load_config` has passed
//!   `validate()`.

use crate::hierarchy::transform::{
    is_absolute_url, ImageResolver, ParentPolicy, TransformOptions, DEFAULT_PLACEHOLDER_IMAGE,
};
use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const PRODUCTION_API_URL: &str = "https://assonstech-001-site2.ktempurl.com/api";
const PRODUCTION_IMAGE_URL: &str = "https://assonstech-001-site2.ktempurl.com/uploads/";
const DEVELOPMENT_API_URL: &str = "http://localhost:3000/api";
const DEVELOPMENT_IMAGE_URL: &str = "http://localhost:3000/uploads/";

/// Deployment preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Production,
    Development,
}

/// Configuration validation/loading errors.
#[derive(Debug)]
pub enum ConfigError {
    /// File could not be read.
    Io(std::io::Error),
    /// JSON did not match the config shape.
    Parse(serde_json::Error),
    /// URL field is blank or not `http(s)`.
    InvalidUrl { field: &'static str, value: String },
    /// Image base URL must end with `/` so relative paths append cleanly.
    ImageBaseWithoutSlash(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::InvalidUrl { field, value } => {
                write!(f, "`{field}` must be an http(s) url, got `{value}`")
            }
            Self::ImageBaseWithoutSlash(value) => {
                write!(f, "`api.image_base_url` must end with `/`, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::InvalidUrl { .. } | Self::ImageBaseWithoutSlash(_) => None,
        }
    }
}

/// REST collaborator settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub image_base_url: String,
    #[serde(default = "default_placeholder")]
    pub placeholder_image: String,
    /// `None` keeps requests unbounded.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ApiConfig {
    pub fn for_profile(profile: Profile) -> Self {
        let (base_url, image_base_url) = match profile {
            Profile::Production => (PRODUCTION_API_URL, PRODUCTION_IMAGE_URL),
            Profile::Development => (DEVELOPMENT_API_URL, DEVELOPMENT_IMAGE_URL),
        };
        Self {
            base_url: base_url.to_string(),
            image_base_url: image_base_url.to_string(),
            placeholder_image: default_placeholder(),
            timeout_secs: None,
        }
    }

    pub fn image_resolver(&self) -> ImageResolver {
        ImageResolver::new(self.image_base_url.clone(), self.placeholder_image.clone())
    }
}

/// File logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,
    /// Absolute directory; `None` disables file logging.
    #[serde(default)]
    pub dir: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: None,
        }
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrgChartConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub parent_policy: ParentPolicy,
    #[serde(default)]
    pub log: LogConfig,
}

impl OrgChartConfig {
    pub fn for_profile(profile: Profile) -> Self {
        Self {
            api: ApiConfig::for_profile(profile),
            parent_policy: ParentPolicy::default(),
            log: LogConfig::default(),
        }
    }

    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_http_url("api.base_url", &self.api.base_url)?;
        require_http_url("api.image_base_url", &self.api.image_base_url)?;
        require_http_url("api.placeholder_image", &self.api.placeholder_image)?;
        if !self.api.image_base_url.ends_with('/') {
            return Err(ConfigError::ImageBaseWithoutSlash(
                self.api.image_base_url.clone(),
            ));
        }
        Ok(())
    }

    /// Transform settings for this configuration.
    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            images: self.api.image_resolver(),
            policy: self.parent_policy,
        }
    }
}

/// Reads and validates a JSON config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<OrgChartConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    OrgChartConfig::from_json_str(&raw)
}

fn require_http_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if !is_absolute_url(value.trim()) {
        return Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER_IMAGE.to_string()
}

fn default_level() -> String {
    default_log_level().to_string()
}
