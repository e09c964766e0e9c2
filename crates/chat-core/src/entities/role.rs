//! Role entity - a named permission set inside a server

use serde::{Deserialize, Serialize};

/// Allow/deny permission pair
///
/// The bits are opaque to this crate; they are carried as received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PermissionOverride {
    #[serde(rename = "a", default)]
    pub allow: i64,
    #[serde(rename = "d", default)]
    pub deny: i64,
}

/// Role entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub permissions: PermissionOverride,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
    #[serde(default)]
    pub hoist: bool,
    #[serde(default)]
    pub rank: i64,
}

impl Role {
    /// Create a role with no permissions
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: PermissionOverride::default(),
            colour: None,
            hoist: false,
            rank: 0,
        }
    }
}
