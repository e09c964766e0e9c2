//! # chat-common
//!
//! Shared utilities including client configuration, telemetry, and the clock
//! abstraction used for heartbeats and retry delays.

pub mod clock;
pub mod config;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use clock::{system_clock, Clock, SharedClock, TokioClock};
pub use config::{
    ClientConfig, ConfigError, EndpointConfig, GatewayConfig, RateLimitConfig, RequestConfig,
    SessionConfig, BOT_TOKEN_HEADER, SESSION_TOKEN_HEADER,
};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
