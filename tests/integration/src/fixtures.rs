//! Test fixtures and data generators
//!
//! Wire-shaped JSON for the packets and API responses used across tests.

use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Token used by every test client
pub const TEST_TOKEN: &str = "test-session-token";

/// Instance descriptor served at `GET /`
pub fn instance_info(ws_url: &str, media_url: Option<&str>) -> Value {
    json!({
        "revolt": "0.7.0",
        "ws": ws_url,
        "features": {
            "autumn": {
                "enabled": media_url.is_some(),
                "url": media_url.unwrap_or_default()
            }
        }
    })
}

pub fn user(id: &str, username: &str) -> Value {
    json!({"_id": id, "username": username, "discriminator": "0001", "relationship": "None"})
}

/// The authenticated user as it appears in Ready
pub fn self_user(id: &str) -> Value {
    json!({"_id": id, "username": "me", "discriminator": "0001", "relationship": "User", "online": true})
}

pub fn server(id: &str, owner: &str, channels: &[&str]) -> Value {
    json!({"_id": id, "owner": owner, "name": format!("server {id}"), "channels": channels})
}

pub fn text_channel(id: &str, server: &str) -> Value {
    json!({"channel_type": "TextChannel", "_id": id, "server": server, "name": "general"})
}

pub fn member(server: &str, user: &str) -> Value {
    json!({"_id": {"server": server, "user": user}, "roles": []})
}

pub fn message(id: &str, channel: &str, author: &str, content: &str) -> Value {
    json!({"_id": id, "channel": channel, "author": author, "content": content})
}

/// Member list returned by `GET /servers/{id}/members`
pub fn member_list(server: &str, users: &[&str]) -> Value {
    json!({
        "members": users.iter().map(|u| member(server, u)).collect::<Vec<_>>(),
        "users": users.iter().map(|u| user(u, u)).collect::<Vec<_>>(),
    })
}

/// Ready packet with one server, one channel and no members
pub fn ready(self_id: &str, server_id: &str, channel_id: &str) -> Value {
    json!({
        "type": "Ready",
        "users": [self_user(self_id)],
        "servers": [server(server_id, self_id, &[channel_id])],
        "channels": [text_channel(channel_id, server_id)],
        "members": [],
        "emojis": [],
        "voice_states": []
    })
}

/// Ready packet with nothing in it
pub fn empty_ready() -> Value {
    json!({"type": "Ready"})
}

pub fn authenticated() -> Value {
    json!({"type": "Authenticated"})
}

pub fn pong(data: u64) -> Value {
    json!({"type": "Pong", "data": data})
}

pub fn bulk(packets: Vec<Value>) -> Value {
    json!({"type": "Bulk", "v": packets})
}

pub fn message_packet(id: &str, channel: &str, author: &str, content: &str) -> Value {
    let mut packet = message(id, channel, author, content);
    packet["type"] = json!("Message");
    packet
}
