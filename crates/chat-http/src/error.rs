//! HTTP error types
//!
//! Terminal outcomes of a queued request. Transient failures (429 and 5xx)
//! never surface directly; they are retried until the retry cap is exceeded.

/// Result alias for request operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Request dispatcher error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required: no token configured")]
    AuthRequired,

    /// The request never produced an HTTP status (DNS, connect, TLS, ...)
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Terminal 4xx response other than 429
    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Request still failing after {retries} retries (last status {status})")]
    MaxRetriesExceeded { retries: u32, status: u16 },

    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Request queue is closed")]
    QueueClosed,

    #[error("Surface not available on this instance: {0}")]
    SurfaceUnavailable(&'static str),
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// HTTP status associated with this error, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::MaxRetriesExceeded { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get error code for logs and client-facing reporting
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::Status { .. } => "API_STATUS_ERROR",
            Self::MaxRetriesExceeded { .. } => "MAX_RETRIES_EXCEEDED",
            Self::Decode(_) => "DECODE_ERROR",
            Self::QueueClosed => "QUEUE_CLOSED",
            Self::SurfaceUnavailable(_) => "SURFACE_UNAVAILABLE",
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
