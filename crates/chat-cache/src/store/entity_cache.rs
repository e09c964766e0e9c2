//! Aggregate in-memory cache of platform entities.
//!
//! Populated by the Ready snapshot and kept current by gateway packets.
//! Members are additionally indexed per server so member counts and member
//! lists do not scan the whole member store.

use super::EntityStore;
use chat_core::{
    Channel, ChannelVoiceState, DomainError, Emoji, Member, MemberId, Message, Server, User,
    VoiceState, Webhook,
};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Shared cache handle
pub type SharedEntityCache = Arc<EntityCache>;

/// Cache of every entity kind the client tracks
#[derive(Debug)]
pub struct EntityCache {
    users: EntityStore<String, User>,
    servers: EntityStore<String, Server>,
    channels: EntityStore<String, Channel>,
    emojis: EntityStore<String, Emoji>,
    messages: EntityStore<String, Message>,
    webhooks: EntityStore<String, Webhook>,
    members: EntityStore<MemberId, Member>,
    voice: EntityStore<String, ChannelVoiceState>,
    /// Server ID → user IDs with a cached member entry
    server_members: DashMap<String, HashSet<String>>,
    /// ID of the authenticated user
    current_user: RwLock<Option<String>>,
}

impl Default for EntityCache {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: EntityStore::new("user"),
            servers: EntityStore::new("server"),
            channels: EntityStore::new("channel"),
            emojis: EntityStore::new("emoji"),
            messages: EntityStore::new("message"),
            webhooks: EntityStore::new("webhook"),
            members: EntityStore::new("member"),
            voice: EntityStore::new("voice_state"),
            server_members: DashMap::new(),
            current_user: RwLock::new(None),
        }
    }

    /// Create a new shared cache
    #[must_use]
    pub fn shared() -> SharedEntityCache {
        Arc::new(Self::new())
    }

    // Plain stores

    pub fn users(&self) -> &EntityStore<String, User> {
        &self.users
    }

    pub fn servers(&self) -> &EntityStore<String, Server> {
        &self.servers
    }

    pub fn channels(&self) -> &EntityStore<String, Channel> {
        &self.channels
    }

    pub fn emojis(&self) -> &EntityStore<String, Emoji> {
        &self.emojis
    }

    pub fn messages(&self) -> &EntityStore<String, Message> {
        &self.messages
    }

    pub fn webhooks(&self) -> &EntityStore<String, Webhook> {
        &self.webhooks
    }

    /// Insert entities keyed by their own IDs
    pub fn insert_user(&self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    pub fn insert_server(&self, server: Server) {
        self.servers.insert(server.id.clone(), server);
    }

    pub fn insert_channel(&self, channel: Channel) {
        self.channels.insert(channel.id().to_string(), channel);
    }

    pub fn insert_emoji(&self, emoji: Emoji) {
        self.emojis.insert(emoji.id.clone(), emoji);
    }

    /// Cache a message and record it as its channel's latest
    pub fn insert_message(&self, message: Message) {
        self.channels
            .update(&message.channel, |channel| channel.set_last_message(&message.id));
        self.messages.insert(message.id.clone(), message);
    }

    pub fn insert_webhook(&self, webhook: Webhook) {
        self.webhooks.insert(webhook.id.clone(), webhook);
    }

    // Current user

    pub fn set_current_user(&self, user_id: impl Into<String>) {
        *self.current_user.write() = Some(user_id.into());
    }

    pub fn current_user_id(&self) -> Option<String> {
        self.current_user.read().clone()
    }

    /// Cached entity of the authenticated user
    pub fn current_user(&self) -> Option<User> {
        let id = self.current_user_id()?;
        self.users.get(&id)
    }

    // Members

    /// Insert or replace a member
    pub fn insert_member(&self, member: Member) {
        self.server_members
            .entry(member.id.server.clone())
            .or_default()
            .insert(member.id.user.clone());
        self.members.insert(member.id.clone(), member);
    }

    pub fn member(&self, server_id: &str, user_id: &str) -> Option<Member> {
        self.members.get(&MemberId::new(server_id, user_id))
    }

    /// Remove a member
    pub fn remove_member(&self, server_id: &str, user_id: &str) -> Option<Member> {
        if let Some(mut users) = self.server_members.get_mut(server_id) {
            users.remove(user_id);
        }
        self.members.remove(&MemberId::new(server_id, user_id))
    }

    /// Apply a partial update to a member
    ///
    /// # Errors
    /// Returns a [`DomainError`] if the update does not fit a member.
    pub fn patch_member(
        &self,
        id: &MemberId,
        data: &Value,
        clear: &[String],
    ) -> Result<Option<Member>, DomainError> {
        self.members.patch(id, data, clear)
    }

    /// Number of cached members of a server
    pub fn member_count(&self, server_id: &str) -> usize {
        self.server_members
            .get(server_id)
            .map_or(0, |users| users.len())
    }

    /// Cached members of a server
    pub fn members_of(&self, server_id: &str) -> Vec<Member> {
        let user_ids: Vec<String> = self
            .server_members
            .get(server_id)
            .map(|users| users.iter().cloned().collect())
            .unwrap_or_default();

        user_ids
            .iter()
            .filter_map(|user_id| self.member(server_id, user_id))
            .collect()
    }

    // Servers

    /// Remove a server together with its channels, emojis and members
    pub fn remove_server(&self, server_id: &str) -> Option<Server> {
        let server = self.servers.remove(server_id)?;

        self.channels
            .remove_where(|_, channel| channel.server() == Some(server_id));
        self.emojis
            .remove_where(|_, emoji| emoji.server() == Some(server_id));
        if let Some((_, users)) = self.server_members.remove(server_id) {
            for user_id in users {
                self.members.remove(&MemberId::new(server_id, user_id));
            }
        }

        tracing::debug!(server_id = %server_id, "Removed server from cache");
        Some(server)
    }

    /// Servers whose member list has not been cached yet
    pub fn servers_without_members(&self) -> Vec<String> {
        self.servers
            .values()
            .into_iter()
            .map(|server| server.id)
            .filter(|id| self.member_count(id) == 0)
            .collect()
    }

    // Voice

    /// Replace the participant list of a voice channel
    pub fn set_voice_channel(&self, state: ChannelVoiceState) {
        self.voice.insert(state.id.clone(), state);
    }

    pub fn voice_participants(&self, channel_id: &str) -> Vec<VoiceState> {
        self.voice
            .get(channel_id)
            .map(|state| state.participants)
            .unwrap_or_default()
    }

    pub fn voice_state(&self, channel_id: &str, user_id: &str) -> Option<VoiceState> {
        self.voice_participants(channel_id)
            .into_iter()
            .find(|state| state.id == user_id)
    }

    /// Add (or replace) a participant in a voice channel
    pub fn voice_join(&self, channel_id: &str, state: VoiceState) {
        let mut entry = self
            .voice
            .get(channel_id)
            .unwrap_or_else(|| ChannelVoiceState {
                id: channel_id.to_string(),
                participants: Vec::new(),
            });
        entry.participants.retain(|p| p.id != state.id);
        entry.participants.push(state);
        self.voice.insert(channel_id.to_string(), entry);
    }

    /// Remove a participant from a voice channel
    pub fn voice_leave(&self, channel_id: &str, user_id: &str) -> Option<VoiceState> {
        self.voice
            .update(channel_id, |channel| {
                let index = channel.participants.iter().position(|p| p.id == user_id)?;
                Some(channel.participants.remove(index))
            })
            .flatten()
    }

    /// Apply a partial update to a participant's voice state
    ///
    /// # Errors
    /// Returns a [`DomainError`] if the update does not fit a voice state.
    pub fn patch_voice_state(
        &self,
        channel_id: &str,
        user_id: &str,
        data: &Value,
    ) -> Result<Option<VoiceState>, DomainError> {
        let Some(current) = self.voice_state(channel_id, user_id) else {
            return Ok(None);
        };

        let updated = chat_core::apply_partial(&current, "voice_state", data, &[])?;
        self.voice_join(channel_id, updated.clone());
        Ok(Some(updated))
    }
}
