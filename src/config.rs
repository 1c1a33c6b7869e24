//! Client configuration
//!
//! `ClientConfig` carries everything the API client needs at construction.
//! It can be built by hand, or loaded from the environment (and an optional
//! `.env` file) with [`ClientConfig::from_env`].

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Default upstream base URL
pub const DEFAULT_BASE_URL: &str = "https://demo.thais-hotel.com/hub";

/// Login endpoint, relative to the base URL
pub const DEFAULT_LOGIN_PATH: &str = "/api/partner/login";

/// Longest accepted request timeout
pub const MAX_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Longest accepted cache TTL, token lifetime or safety margin
pub const MAX_DURATION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Errors raised while loading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("Missing environment variable: {0}")]
    Missing(String),

    /// A variable is set but cannot be parsed
    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: String, value: String },
}

/// Response cache settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Whether cacheable lookups go through the cache
    pub enabled: bool,
    /// Default time-to-live of cached responses
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(300), // 5 minutes
        }
    }
}

/// Settings for [`crate::api::ApiClient`]
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every path is appended to
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Path of the login endpoint
    pub login_path: String,
    /// Timeout applied to every network call, login included
    pub timeout: Duration,
    /// How long a freshly issued token is assumed to stay valid
    pub token_lifetime: Duration,
    /// Refresh this long before the tracked expiry
    pub token_safety_margin: Duration,
    pub cache: CacheConfig,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("login_path", &self.login_path)
            .field("timeout", &self.timeout)
            .field("token_lifetime", &self.token_lifetime)
            .field("token_safety_margin", &self.token_safety_margin)
            .field("cache", &self.cache)
            .finish()
    }
}

impl ClientConfig {
    /// Creates a configuration with default settings and the given credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: username.into(),
            password: password.into(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            timeout: Duration::from_secs(15),
            token_lifetime: Duration::from_secs(9 * 60),
            token_safety_margin: Duration::from_secs(60),
            cache: CacheConfig::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_token_lifetime(mut self, lifetime: Duration, safety_margin: Duration) -> Self {
        self.token_lifetime = lifetime;
        self.token_safety_margin = safety_margin;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Loads configuration from the process environment
    ///
    /// A `.env` file in the working directory is read first if present.
    ///
    /// # Variables
    /// * `THAIS_USERNAME`, `THAIS_PASSWORD` - required credentials
    /// * `THAIS_BASE_URL` - upstream base URL
    /// * `API_TIMEOUT` - request timeout in milliseconds
    /// * `CACHE_TTL` - cache time-to-live in seconds
    /// * `CACHE_ENABLED` - `true` or `false`
    /// * `TOKEN_LIFETIME`, `TOKEN_SAFETY_MARGIN` - in seconds
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| ConfigError::Missing(key.to_string()));

        let mut config = Self::new(require("THAIS_USERNAME")?, require("THAIS_PASSWORD")?);

        if let Some(base_url) = get("THAIS_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(ms) = get("API_TIMEOUT") {
            config.timeout = Duration::from_millis(parse_number("API_TIMEOUT", &ms)?);
            check_range("API_TIMEOUT", &ms, config.timeout, MAX_TIMEOUT)?;
        }
        if let Some(secs) = get("CACHE_TTL") {
            config.cache.ttl = Duration::from_secs(parse_number("CACHE_TTL", &secs)?);
            check_range("CACHE_TTL", &secs, config.cache.ttl, MAX_DURATION)?;
        }
        if let Some(enabled) = get("CACHE_ENABLED") {
            config.cache.enabled = enabled.trim().eq_ignore_ascii_case("true");
        }
        if let Some(secs) = get("TOKEN_LIFETIME") {
            config.token_lifetime = Duration::from_secs(parse_number("TOKEN_LIFETIME", &secs)?);
            check_range("TOKEN_LIFETIME", &secs, config.token_lifetime, MAX_DURATION)?;
        }
        if let Some(secs) = get("TOKEN_SAFETY_MARGIN") {
            config.token_safety_margin =
                Duration::from_secs(parse_number("TOKEN_SAFETY_MARGIN", &secs)?);
        }

        // A margin as long as the lifetime makes every token stale on arrival
        if config.token_safety_margin >= config.token_lifetime {
            return Err(ConfigError::Invalid {
                key: "TOKEN_SAFETY_MARGIN".to_string(),
                value: config.token_safety_margin.as_secs().to_string(),
            });
        }

        Ok(config)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn check_range(key: &str, value: &str, duration: Duration, max: Duration) -> Result<(), ConfigError> {
    if duration.is_zero() || duration > max {
        return Err(ConfigError::Invalid {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}
