//! Primary API routes

use chat_core::{Channel, Member, Message, Server, User};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ApiResult;
use crate::queue::RequestQueue;

/// Response of the server member listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberList {
    pub members: Vec<Member>,
    pub users: Vec<User>,
}

/// Outgoing message body
#[derive(Debug, Clone, Default, Serialize)]
pub struct SendMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<Reply>,
    /// Deduplication nonce, generated when not set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub id: String,
    pub mention: bool,
}

impl SendMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn reply_to(mut self, message_id: impl Into<String>, mention: bool) -> Self {
        self.replies.push(Reply {
            id: message_id.into(),
            mention,
        });
        self
    }

    #[must_use]
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }
}

/// Routes of the primary API surface
#[derive(Debug, Clone)]
pub struct ApiClient {
    queue: RequestQueue,
}

impl ApiClient {
    pub fn new(queue: RequestQueue) -> Self {
        Self { queue }
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    /// Fetch the authenticated user
    pub async fn fetch_self(&self) -> ApiResult<User> {
        self.queue.get("/users/@me").await
    }

    pub async fn fetch_user(&self, user_id: &str) -> ApiResult<User> {
        self.queue.get(&format!("/users/{user_id}")).await
    }

    pub async fn fetch_server(&self, server_id: &str) -> ApiResult<Server> {
        self.queue.get(&format!("/servers/{server_id}")).await
    }

    pub async fn fetch_channel(&self, channel_id: &str) -> ApiResult<Channel> {
        self.queue.get(&format!("/channels/{channel_id}")).await
    }

    /// Fetch every member of a server along with their users
    pub async fn fetch_members(&self, server_id: &str) -> ApiResult<MemberList> {
        self.queue
            .get(&format!("/servers/{server_id}/members"))
            .await
    }

    pub async fn fetch_message(&self, channel_id: &str, message_id: &str) -> ApiResult<Message> {
        self.queue
            .get(&format!("/channels/{channel_id}/messages/{message_id}"))
            .await
    }

    /// Post a message; a random nonce is attached if none was given
    pub async fn send_message(&self, channel_id: &str, message: SendMessage) -> ApiResult<Message> {
        let message = SendMessage {
            nonce: message
                .nonce
                .or_else(|| Some(uuid::Uuid::new_v4().to_string())),
            ..message
        };

        self.queue
            .post(
                &format!("/channels/{channel_id}/messages"),
                serde_json::to_value(&message)?,
            )
            .await
    }

    pub async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        content: &str,
    ) -> ApiResult<Message> {
        self.queue
            .patch(
                &format!("/channels/{channel_id}/messages/{message_id}"),
                json!({ "content": content }),
            )
            .await
    }

    pub async fn delete_message(&self, channel_id: &str, message_id: &str) -> ApiResult<()> {
        self.queue
            .delete(&format!("/channels/{channel_id}/messages/{message_id}"))
            .await
    }
}
