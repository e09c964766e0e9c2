//! Attachment entity - a file stored on the media surface

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata of an uploaded file
///
/// Avatars, icons, banners and message attachments all share this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "_id")]
    pub id: String,
    /// Storage bucket the file lives in (e.g. `avatars`, `attachments`)
    pub tag: String,
    pub filename: String,
    #[serde(default)]
    pub metadata: Value,
    pub content_type: String,
    pub size: u64,
}

impl Attachment {
    /// Relative path of the file on the media surface
    pub fn path(&self) -> String {
        format!("/{}/{}", self.tag, self.id)
    }
}
