//! Webhook entity

use serde::{Deserialize, Serialize};

use super::Attachment;

/// Webhook entity
///
/// Unlike most entities the wire key is `id`, not `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Webhook {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Attachment>,
    pub channel_id: String,
    #[serde(default)]
    pub permissions: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}
