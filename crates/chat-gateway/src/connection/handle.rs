//! Gateway connection handle

use chat_cache::{EntityCache, SharedEntityCache};
use chat_common::{system_clock, ClientConfig, SharedClock};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};

use super::driver::{Command, Driver, DriverParts};
use super::socket::{SharedConnector, TungsteniteConnector};
use super::state::{ConnectionState, GatewayStatus};
use crate::error::{GatewayError, GatewayResult};
use crate::events::{ClientEvent, EventBus};
use crate::protocol::ClientPacket;
use crate::reconnect::ReconnectConfig;
use crate::sources::{SharedEndpointSource, SharedMemberSource};

/// Channel buffer size for driver commands
const COMMAND_BUFFER_SIZE: usize = 64;

/// Connection behaviour, fixed at construction
#[derive(Clone)]
pub struct GatewayOptions {
    pub token: String,
    pub auto_reconnect: bool,
    /// `None` disables heartbeating
    pub heartbeat_interval: Option<Duration>,
    pub prefetch_members: bool,
    pub reconnect: ReconnectConfig,
}

impl GatewayOptions {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            auto_reconnect: true,
            heartbeat_interval: Some(crate::heartbeat::DEFAULT_HEARTBEAT_INTERVAL),
            prefetch_members: true,
            reconnect: ReconnectConfig::default(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            token: config.session.token().unwrap_or_default().to_string(),
            auto_reconnect: config.gateway.auto_reconnect,
            heartbeat_interval: config.gateway.heartbeat_interval(),
            prefetch_members: config.gateway.prefetch_members,
            reconnect: ReconnectConfig::default(),
        }
    }

    #[must_use]
    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Option<Duration>) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    #[must_use]
    pub fn with_prefetch_members(mut self, enabled: bool) -> Self {
        self.prefetch_members = enabled;
        self
    }

    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }
}

impl std::fmt::Debug for GatewayOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayOptions")
            .field("token", &"[redacted]")
            .field("auto_reconnect", &self.auto_reconnect)
            .field("heartbeat_interval", &self.heartbeat_interval)
            .field("prefetch_members", &self.prefetch_members)
            .field("reconnect", &self.reconnect)
            .finish()
    }
}

/// Builder for [`GatewayConnection`]
pub struct GatewayBuilder {
    options: GatewayOptions,
    endpoints: SharedEndpointSource,
    members: Option<SharedMemberSource>,
    connector: Option<SharedConnector>,
    cache: Option<SharedEntityCache>,
    clock: Option<SharedClock>,
    bus: Option<EventBus>,
}

impl GatewayBuilder {
    #[must_use]
    pub fn with_connector(mut self, connector: SharedConnector) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Source for member lists fetched during Ready
    #[must_use]
    pub fn with_members(mut self, members: SharedMemberSource) -> Self {
        self.members = Some(members);
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: SharedEntityCache) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    #[must_use]
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Spawn the driver task and return a handle to it
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self) -> GatewayConnection {
        let cache = self.cache.unwrap_or_else(EntityCache::shared);
        let clock = self.clock.unwrap_or_else(system_clock);
        let bus = self.bus.unwrap_or_default();
        let status = Arc::new(RwLock::new(GatewayStatus::default()));
        let has_token = !self.options.token.is_empty();

        let (commands, commands_rx) = mpsc::channel(COMMAND_BUFFER_SIZE);
        let parts = DriverParts {
            options: self.options,
            endpoints: self.endpoints,
            members: self.members,
            connector: self.connector.unwrap_or_else(TungsteniteConnector::shared),
            cache: cache.clone(),
            clock: clock.clone(),
            bus: bus.clone(),
            status: status.clone(),
        };
        tokio::spawn(Driver::new(parts, commands_rx).run());

        GatewayConnection {
            commands,
            status,
            bus,
            cache,
            clock,
            has_token,
        }
    }
}

/// Handle to a gateway connection
///
/// Cloning is cheap; every clone talks to the same driver task, which stops
/// once the last handle is dropped.
#[derive(Clone)]
pub struct GatewayConnection {
    commands: mpsc::Sender<Command>,
    status: Arc<RwLock<GatewayStatus>>,
    bus: EventBus,
    cache: SharedEntityCache,
    clock: SharedClock,
    has_token: bool,
}

impl GatewayConnection {
    pub fn builder(options: GatewayOptions, endpoints: SharedEndpointSource) -> GatewayBuilder {
        GatewayBuilder {
            options,
            endpoints,
            members: None,
            connector: None,
            cache: None,
            clock: None,
            bus: None,
        }
    }

    /// Connect and authenticate
    ///
    /// Resolves once the server acknowledges authentication. Callers arriving
    /// while an attempt is in flight share its outcome. A no-op when already
    /// connected.
    ///
    /// Every attempt spends from one reconnect budget, including attempts
    /// started by repeated calls here. The budget refills on successful
    /// authentication, or when called after the gateway was destroyed.
    ///
    /// # Errors
    /// `AuthRequired` without a token, `MaxRetryExceeded` once the reconnect
    /// budget is spent, `ConnectionClosed` if the socket closes with
    /// auto-reconnect disabled, `Destroyed` if `destroy(true)` intervenes.
    pub async fn connect(&self) -> GatewayResult<()> {
        if !self.has_token {
            return Err(GatewayError::AuthRequired);
        }
        self.request(|reply| Command::Connect { reply }).await
    }

    /// Send a packet, waiting behind an in-flight connection attempt
    ///
    /// # Errors
    /// `SocketNotOpen` when disconnected or destroyed.
    pub async fn send(&self, packet: ClientPacket) -> GatewayResult<()> {
        self.request(|reply| Command::Send { packet, reply }).await
    }

    /// Send a packet only if connected right now
    ///
    /// # Errors
    /// `SocketNotOpen` unless the connection is authenticated.
    pub async fn try_send(&self, packet: ClientPacket) -> GatewayResult<()> {
        if self.state() != ConnectionState::Connected {
            return Err(GatewayError::SocketNotOpen);
        }
        self.request(|reply| Command::TrySend { packet, reply }).await
    }

    /// Close the socket
    ///
    /// `user_initiated = true` is final until the next `connect()`; otherwise
    /// a reconnect is scheduled.
    pub async fn destroy(&self, user_initiated: bool) -> GatewayResult<()> {
        let (reply, rx) = oneshot::channel();
        self.command(Command::Destroy {
            user_initiated,
            reply,
        })
        .await?;
        rx.await.map_err(|_| GatewayError::DriverStopped)
    }

    /// Replace the heartbeat timer; `None` disarms it
    pub async fn set_heartbeat_timer(&self, interval: Option<Duration>) -> GatewayResult<()> {
        self.command(Command::SetHeartbeatTimer { interval }).await
    }

    /// Run one heartbeat round now
    pub async fn send_heartbeat(&self) -> GatewayResult<()> {
        self.command(Command::SendHeartbeat).await
    }

    pub async fn begin_typing(&self, channel_id: impl Into<String>) -> GatewayResult<()> {
        self.send(ClientPacket::BeginTyping {
            channel: channel_id.into(),
        })
        .await
    }

    pub async fn end_typing(&self, channel_id: impl Into<String>) -> GatewayResult<()> {
        self.send(ClientPacket::EndTyping {
            channel: channel_id.into(),
        })
        .await
    }

    pub fn state(&self) -> ConnectionState {
        self.status.read().state
    }

    /// Ready has been ingested on the current socket
    pub fn is_ready(&self) -> bool {
        self.status.read().ready
    }

    /// Time since the last ping while a socket is open
    pub fn ping(&self) -> Option<Duration> {
        let status = self.status.read();
        if !status.socket_open {
            return None;
        }
        let last_ping = status.last_ping?;
        Some(Duration::from_millis(
            self.clock.now_millis().saturating_sub(last_ping),
        ))
    }

    /// Connection attempts since the last successful authentication
    pub fn retry_count(&self) -> u32 {
        self.status.read().retry_count
    }

    pub fn status(&self) -> GatewayStatus {
        self.status.read().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.bus.subscribe()
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn cache(&self) -> &SharedEntityCache {
        &self.cache
    }

    async fn command(&self, command: Command) -> GatewayResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| GatewayError::DriverStopped)
    }

    async fn request<F>(&self, make: F) -> GatewayResult<()>
    where
        F: FnOnce(oneshot::Sender<GatewayResult<()>>) -> Command,
    {
        let (reply, rx) = oneshot::channel();
        self.command(make(reply)).await?;
        rx.await.map_err(|_| GatewayError::DriverStopped)?
    }
}

impl std::fmt::Debug for GatewayConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConnection")
            .field("status", &*self.status.read())
            .finish_non_exhaustive()
    }
}
