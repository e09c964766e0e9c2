//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Partial Update Errors
    // =========================================================================
    #[error("Partial update for {entity} is not a JSON object")]
    PartialNotObject { entity: &'static str },

    #[error("Partial update produced an invalid {entity}: {source}")]
    InvalidPartial {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },

    // =========================================================================
    // Lookup Errors
    // =========================================================================
    #[error("Unknown {entity}: {id}")]
    Unknown { entity: &'static str, id: String },
}

impl DomainError {
    /// Get an error code string for logs and events
    pub fn code(&self) -> &'static str {
        match self {
            Self::PartialNotObject { .. } => "PARTIAL_NOT_OBJECT",
            Self::InvalidPartial { .. } => "INVALID_PARTIAL",
            Self::Unknown { .. } => "UNKNOWN_ENTITY",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Unknown { .. })
    }

    /// Create a lookup error for an entity kind
    pub fn unknown(entity: &'static str, id: impl Into<String>) -> Self {
        Self::Unknown {
            entity,
            id: id.into(),
        }
    }
}
