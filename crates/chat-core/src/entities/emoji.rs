//! Emoji entity - custom emoji uploaded to a server

use serde::{Deserialize, Serialize};

/// Owner of a custom emoji
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EmojiParent {
    Server { id: String },
    Detached,
}

/// Custom emoji entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emoji {
    #[serde(rename = "_id")]
    pub id: String,
    pub parent: EmojiParent,
    pub creator_id: String,
    pub name: String,
    #[serde(default)]
    pub animated: bool,
    #[serde(default)]
    pub nsfw: bool,
}

impl Emoji {
    /// Server owning this emoji, if it is still attached to one
    pub fn server(&self) -> Option<&str> {
        match &self.parent {
            EmojiParent::Server { id } => Some(id),
            EmojiParent::Detached => None,
        }
    }
}
