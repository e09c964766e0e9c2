//! Client configuration structs
//!
//! Loads configuration from environment variables or builds it in code.

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Header carrying a bot token
pub const BOT_TOKEN_HEADER: &str = "x-bot-token";

/// Header carrying a user session token
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// Main client configuration
///
/// Immutable once handed to a client; share it behind an `Arc`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub session: SessionConfig,
    pub endpoints: EndpointConfig,
    pub gateway: GatewayConfig,
    pub requests: RequestConfig,
    pub rate_limit: RateLimitConfig,
}

/// Credentials used by both the gateway and the request dispatcher
#[derive(Clone, Deserialize, Default)]
pub struct SessionConfig {
    #[serde(default)]
    pub token: Option<String>,
    /// Bot accounts and user sessions authenticate with different headers
    #[serde(default)]
    pub bot: bool,
}

impl SessionConfig {
    /// Token if one is set and non-empty
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    /// Authentication header name and value for HTTP requests
    pub fn auth_header(&self) -> Option<(&'static str, &str)> {
        let name = if self.bot {
            BOT_TOKEN_HEADER
        } else {
            SESSION_TOKEN_HEADER
        };
        self.token().map(|token| (name, token))
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("bot", &self.bot)
            .finish()
    }
}

/// Base URLs of the platform surfaces
///
/// `media_url` and `gateway_url` override what discovery reports.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub gateway_url: Option<String>,
}

/// Gateway behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Heartbeat interval in milliseconds; `-1` disables heartbeating
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: i64,
    #[serde(default = "default_true")]
    pub auto_reconnect: bool,
    /// Fetch the member list of servers that arrive in Ready without members
    #[serde(default = "default_true")]
    pub prefetch_members: bool,
}

impl GatewayConfig {
    /// Heartbeat interval, `None` when heartbeating is disabled
    pub fn heartbeat_interval(&self) -> Option<Duration> {
        u64::try_from(self.heartbeat_interval_ms)
            .ok()
            .map(Duration::from_millis)
    }
}

/// Request dispatcher retry behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    /// Wait before each retry of a transient failure, in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl RequestConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Rate limiting configuration (per surface)
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

// Default value functions
fn default_api_url() -> String {
    "https://api.revolt.chat".to_string()
}

fn default_heartbeat_interval_ms() -> i64 {
    30_000
}

fn default_true() -> bool {
    true
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            endpoints: EndpointConfig {
                api_url: default_api_url(),
                media_url: None,
                gateway_url: None,
            },
            gateway: GatewayConfig {
                heartbeat_interval_ms: default_heartbeat_interval_ms(),
                auto_reconnect: true,
                prefetch_members: true,
            },
            requests: RequestConfig {
                timeout_ms: default_request_timeout_ms(),
                max_retries: default_max_retries(),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: default_requests_per_second(),
                burst: default_burst(),
            },
        }
    }
}

impl ClientConfig {
    /// Default configuration authenticated with the given token
    pub fn new(token: impl Into<String>) -> Self {
        Self::default().with_token(token)
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unparsable value
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            session: SessionConfig {
                token: lookup("CHAT_TOKEN"),
                bot: parse_var(&lookup, "CHAT_BOT", || false)?,
            },
            endpoints: EndpointConfig {
                api_url: lookup("CHAT_API_URL").unwrap_or_else(default_api_url),
                media_url: lookup("CHAT_MEDIA_URL"),
                gateway_url: lookup("CHAT_GATEWAY_URL"),
            },
            gateway: GatewayConfig {
                heartbeat_interval_ms: parse_var(
                    &lookup,
                    "CHAT_HEARTBEAT_INTERVAL_MS",
                    default_heartbeat_interval_ms,
                )?,
                auto_reconnect: parse_var(&lookup, "CHAT_AUTO_RECONNECT", default_true)?,
                prefetch_members: parse_var(&lookup, "CHAT_PREFETCH_MEMBERS", default_true)?,
            },
            requests: RequestConfig {
                timeout_ms: parse_var(&lookup, "CHAT_REQUEST_TIMEOUT_MS", default_request_timeout_ms)?,
                max_retries: parse_var(&lookup, "CHAT_REQUEST_RETRIES", default_max_retries)?,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: parse_var(
                    &lookup,
                    "CHAT_RATE_LIMIT_PER_SECOND",
                    default_requests_per_second,
                )?,
                burst: parse_var(&lookup, "CHAT_RATE_LIMIT_BURST", default_burst)?,
            },
        })
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.session.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_bot(mut self, bot: bool) -> Self {
        self.session.bot = bot;
        self
    }

    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.endpoints.api_url = url.into();
        self
    }

    #[must_use]
    pub fn with_media_url(mut self, url: impl Into<String>) -> Self {
        self.endpoints.media_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_gateway_url(mut self, url: impl Into<String>) -> Self {
        self.endpoints.gateway_url = Some(url.into());
        self
    }

    /// Set the heartbeat interval; `None` disables heartbeating
    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Option<Duration>) -> Self {
        self.gateway.heartbeat_interval_ms =
            interval.map_or(-1, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX));
        self
    }

    #[must_use]
    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.gateway.auto_reconnect = enabled;
        self
    }

    #[must_use]
    pub fn with_prefetch_members(mut self, enabled: bool) -> Self {
        self.gateway.prefetch_members = enabled;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.requests.timeout_ms = timeout.as_millis() as u64;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.requests.max_retries = retries;
        self
    }

    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_second: u32, burst: u32) -> Self {
        self.rate_limit = RateLimitConfig {
            requests_per_second,
            burst,
        };
        self
    }
}

fn parse_var<T, F, D>(lookup: &F, key: &'static str, default: D) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
    D: FnOnce() -> T,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
