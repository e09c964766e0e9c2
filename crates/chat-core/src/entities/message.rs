//! Message entity - a message posted in a channel

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Attachment;

/// Name and avatar shown for messages sent through a webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageWebhook {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    pub channel: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited: Option<DateTime<Utc>>,
    #[serde(default)]
    pub embeds: Vec<Value>,
    #[serde(default)]
    pub mentions: Vec<String>,
    #[serde(default)]
    pub replies: Vec<String>,
    /// Emoji ID to the users that reacted with it
    #[serde(default)]
    pub reactions: HashMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<MessageWebhook>,
}

impl Message {
    /// Create a plain text message
    pub fn new(
        id: impl Into<String>,
        channel: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            nonce: None,
            channel: channel.into(),
            author: author.into(),
            content: Some(content.into()),
            attachments: Vec::new(),
            edited: None,
            embeds: Vec::new(),
            mentions: Vec::new(),
            replies: Vec::new(),
            reactions: HashMap::new(),
            webhook: None,
        }
    }

    /// Add a reaction; returns false if the user already reacted with this emoji
    pub fn add_reaction(&mut self, emoji_id: &str, user_id: &str) -> bool {
        let users = self.reactions.entry(emoji_id.to_string()).or_default();
        if users.iter().any(|u| u == user_id) {
            return false;
        }
        users.push(user_id.to_string());
        true
    }

    /// Remove one user's reaction; drops the emoji entry once it is empty
    pub fn remove_reaction(&mut self, emoji_id: &str, user_id: &str) -> bool {
        let Some(users) = self.reactions.get_mut(emoji_id) else {
            return false;
        };
        let before = users.len();
        users.retain(|u| u != user_id);
        let removed = users.len() != before;
        if users.is_empty() {
            self.reactions.remove(emoji_id);
        }
        removed
    }

    /// Remove every reaction with the given emoji
    pub fn clear_reaction(&mut self, emoji_id: &str) -> bool {
        self.reactions.remove(emoji_id).is_some()
    }

    /// Append embeds streamed in after the message was created
    pub fn append_embeds(&mut self, embeds: impl IntoIterator<Item = Value>) {
        self.embeds.extend(embeds);
    }

    /// Check if the message was sent through a webhook
    #[inline]
    pub fn is_webhook(&self) -> bool {
        self.webhook.is_some()
    }
}
