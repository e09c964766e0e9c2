//! Configuration structs

mod app_config;

pub use app_config::{
    ClientConfig, ConfigError, EndpointConfig, GatewayConfig, RateLimitConfig, RequestConfig,
    SessionConfig, BOT_TOKEN_HEADER, SESSION_TOKEN_HEADER,
};
