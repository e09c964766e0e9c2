//! Server entity - a community containing channels, roles and members

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Attachment, Role};

/// Server entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    #[serde(rename = "_id")]
    pub id: String,
    pub owner: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub roles: HashMap<String, Role>,
    #[serde(default)]
    pub default_permissions: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<Attachment>,
    #[serde(default)]
    pub nsfw: bool,
}

impl Server {
    /// Create a new server with no channels or roles
    pub fn new(id: impl Into<String>, owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owner: owner.into(),
            name: name.into(),
            description: None,
            channels: Vec::new(),
            roles: HashMap::new(),
            default_permissions: 0,
            icon: None,
            banner: None,
            nsfw: false,
        }
    }

    /// Check if a user owns this server
    #[inline]
    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner == user_id
    }

    /// Roles ordered by rank (lowest rank first, i.e. highest priority)
    pub fn ordered_roles(&self) -> Vec<(&String, &Role)> {
        let mut roles: Vec<_> = self.roles.iter().collect();
        roles.sort_by_key(|(_, role)| role.rank);
        roles
    }
}
