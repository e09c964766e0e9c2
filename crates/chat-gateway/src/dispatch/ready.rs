//! Ready snapshot ingestion
//!
//! The snapshot is applied in dependency order: users, members, emojis,
//! channels, servers. Member lists for servers the snapshot left without
//! members are then fetched concurrently and awaited together. Voice states
//! are applied last, after the driver has started heartbeating.
//!
//! No event is emitted until ingestion finishes, so event consumers only see
//! the complete snapshot. Direct cache reads are not gated: a read made while
//! the member fetch is in flight sees servers and channels with no members
//! and no voice participants yet.

use chat_cache::EntityCache;
use chat_core::{ChannelVoiceState, RelationshipStatus};
use futures::future::join_all;

use crate::protocol::ReadyPayload;
use crate::sources::MemberSource;

/// Apply the entity lists of a Ready snapshot, returning the voice states
/// for the final step
pub fn apply_snapshot(cache: &EntityCache, payload: ReadyPayload) -> Vec<ChannelVoiceState> {
    let ReadyPayload {
        users,
        servers,
        channels,
        members,
        emojis,
        voice_states,
    } = payload;

    tracing::debug!(
        users = users.len(),
        servers = servers.len(),
        channels = channels.len(),
        members = members.len(),
        emojis = emojis.len(),
        "Applying Ready snapshot"
    );

    for user in users {
        if user.relationship == RelationshipStatus::User {
            cache.set_current_user(user.id.clone());
        }
        cache.insert_user(user);
    }
    for member in members {
        cache.insert_member(member);
    }
    for emoji in emojis {
        cache.insert_emoji(emoji);
    }
    for channel in channels {
        cache.insert_channel(channel);
    }
    for server in servers {
        cache.insert_server(server);
    }

    voice_states
}

/// Fetch member lists for every cached server that has none
///
/// Fetches run concurrently; a failed fetch is logged and skipped. Returns
/// the number of servers whose members were loaded.
pub async fn prefetch_members(cache: &EntityCache, source: &dyn MemberSource) -> usize {
    let server_ids = cache.servers_without_members();
    if server_ids.is_empty() {
        return 0;
    }

    let fetches = server_ids.iter().map(|server_id| async move {
        (server_id, source.fetch_members(server_id).await)
    });

    let mut loaded = 0;
    for (server_id, result) in join_all(fetches).await {
        match result {
            Ok(list) => {
                for user in list.users {
                    cache.insert_user(user);
                }
                for member in list.members {
                    cache.insert_member(member);
                }
                loaded += 1;
            }
            Err(e) => {
                tracing::warn!(server_id = %server_id, error = %e, "Failed to fetch server members");
            }
        }
    }

    tracing::debug!(servers = server_ids.len(), loaded, "Member prefetch finished");
    loaded
}

pub fn apply_voice_states(cache: &EntityCache, voice_states: Vec<ChannelVoiceState>) {
    for state in voice_states {
        cache.set_voice_channel(state);
    }
}
