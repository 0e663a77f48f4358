/// Configuration management for the RealTalk client
///
/// Loads settings from `REALTALK_`-prefixed environment variables, after
/// reading a `.env` file if one is present.
use crate::models::{POSTS_COLLECTION, POST_TTL_SECS};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const ENV_PREFIX: &str = "REALTALK_";

/// Ten years
pub const MAX_POST_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// One day
pub const MAX_COUNTDOWN_INTERVAL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read environment: {0}")]
    Env(#[from] envy::Error),

    #[error("{0}")]
    Invalid(String),
}

/// Environment type for configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Local,
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "loc" => Ok(Environment::Local),
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" | "stg" => Ok(Environment::Staging),
            "production" | "prod" | "prd" => Ok(Environment::Production),
            _ => Err(ConfigError::Invalid(format!("Unknown environment: {}", s))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Local => "local",
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Main application configuration
#[derive(Debug)]
pub struct Config {
    pub app: AppConfig,
    /// Hosted backend project credentials
    pub backend: BackendConfig,
    pub feed: FeedConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
}

#[derive(Debug)]
pub struct BackendConfig {
    pub project_id: Option<String>,
    pub api_key: Option<SecretString>,
}

impl BackendConfig {
    pub fn has_credentials(&self) -> bool {
        self.project_id.as_deref().map_or(false, |id| !id.trim().is_empty())
            && self
                .api_key
                .as_ref()
                .map_or(false, |key| !key.expose_secret().trim().is_empty())
    }
}

/// Feed configuration
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Collection posts are read from and appended to
    pub collection: String,
    /// Lifetime of a new post
    pub post_ttl_secs: u64,
    /// How often countdown labels are recomputed
    pub countdown_interval_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Leave login/signup reachable for signed-in viewers
    pub legacy_guest_surfaces: bool,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

/// Flat view of the prefixed environment
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    app_env: Option<String>,
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default = "default_collection")]
    posts_collection: String,
    #[serde(default = "default_post_ttl_secs")]
    post_ttl_secs: u64,
    #[serde(default = "default_countdown_interval_secs")]
    countdown_interval_secs: u64,
    #[serde(default)]
    legacy_guest_surfaces: bool,
    #[serde(default)]
    log_format: LogFormat,
}

fn default_collection() -> String {
    POSTS_COLLECTION.to_string()
}

fn default_post_ttl_secs() -> u64 {
    POST_TTL_SECS as u64
}

fn default_countdown_interval_secs() -> u64 {
    60
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let raw: RawConfig = envy::prefixed(ENV_PREFIX).from_env()?;
        Self::from_raw(raw)
    }

    /// Load configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let raw: RawConfig = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let env = match raw.app_env.as_deref() {
            Some(value) if !value.trim().is_empty() => value.trim().parse()?,
            _ => Environment::default(),
        };

        let backend = BackendConfig {
            project_id: raw.project_id,
            api_key: raw.api_key.map(SecretString::from),
        };
        if env.is_production() && !backend.has_credentials() {
            return Err(ConfigError::Invalid(
                "REALTALK_PROJECT_ID and REALTALK_API_KEY must be set in production".to_string(),
            ));
        }

        if raw.posts_collection.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "REALTALK_POSTS_COLLECTION cannot be empty".to_string(),
            ));
        }
        if raw.post_ttl_secs == 0 || raw.post_ttl_secs > MAX_POST_TTL_SECS {
            return Err(ConfigError::Invalid(format!(
                "REALTALK_POST_TTL_SECS must be between 1 and {}",
                MAX_POST_TTL_SECS
            )));
        }
        if raw.countdown_interval_secs == 0
            || raw.countdown_interval_secs > MAX_COUNTDOWN_INTERVAL_SECS
        {
            return Err(ConfigError::Invalid(format!(
                "REALTALK_COUNTDOWN_INTERVAL_SECS must be between 1 and {}",
                MAX_COUNTDOWN_INTERVAL_SECS
            )));
        }

        Ok(Config {
            app: AppConfig { env },
            backend,
            feed: FeedConfig {
                collection: raw.posts_collection,
                post_ttl_secs: raw.post_ttl_secs,
                countdown_interval_secs: raw.countdown_interval_secs,
            },
            session: SessionConfig {
                legacy_guest_surfaces: raw.legacy_guest_surfaces,
            },
            logging: LoggingConfig {
                format: raw.log_format,
            },
        })
    }
}
