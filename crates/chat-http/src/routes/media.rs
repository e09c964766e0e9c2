//! Media surface routes

use chat_core::Attachment;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::ApiResult;
use crate::queue::RequestQueue;

/// Media server descriptor returned by its root
#[derive(Debug, Clone, Deserialize)]
pub struct MediaInfo {
    /// Media server version
    pub autumn: String,
    /// Upload tags (attachments, avatars, icons, ...) and their limits
    #[serde(default)]
    pub tags: HashMap<String, Value>,
}

/// Routes of the media surface
#[derive(Debug, Clone)]
pub struct MediaClient {
    queue: RequestQueue,
}

impl MediaClient {
    pub fn new(queue: RequestQueue) -> Self {
        Self { queue }
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    pub async fn fetch_info(&self) -> ApiResult<MediaInfo> {
        self.queue.get("/").await
    }

    /// Fetch the stored metadata of a file
    pub async fn fetch_attachment(&self, tag: &str, file_id: &str) -> ApiResult<Attachment> {
        self.queue.get(&format!("/{tag}/{file_id}/data")).await
    }

    /// Public URL of a stored file
    pub fn url(&self, attachment: &Attachment) -> String {
        format!("{}{}", self.queue.base_url(), attachment.path())
    }
}
