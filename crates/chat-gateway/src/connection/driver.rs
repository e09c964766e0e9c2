//! Connection driver
//!
//! One task per gateway connection owns the socket, the heartbeat, the retry
//! budget and the reconnect timer. Handles talk to it over a command
//! channel, so every state transition happens on this task in order.

use chat_cache::SharedEntityCache;
use chat_common::SharedClock;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::handle::GatewayOptions;
use super::socket::{SharedConnector, SocketEvent};
use super::state::{ConnectionState, GatewayStatus};
use crate::dispatch::{self, ready};
use crate::error::{GatewayError, GatewayResult};
use crate::events::{ClientEvent, EventBus};
use crate::heartbeat::{HeartbeatMonitor, Liveness};
use crate::protocol::{ClientPacket, ReadyPayload, ServerPacket};
use crate::reconnect::RetryBudget;
use crate::sources::{SharedEndpointSource, SharedMemberSource};
use crate::timer::Timer;

type Reply<T> = oneshot::Sender<GatewayResult<T>>;

/// Requests sent from handles to the driver
pub(crate) enum Command {
    Connect { reply: Reply<()> },
    Send { packet: ClientPacket, reply: Reply<()> },
    TrySend { packet: ClientPacket, reply: Reply<()> },
    Destroy { user_initiated: bool, reply: oneshot::Sender<()> },
    SetHeartbeatTimer { interval: Option<Duration> },
    SendHeartbeat,
}

/// Socket owned by the driver, tagged for logs
struct LiveSocket {
    session_id: String,
    outbound: mpsc::Sender<String>,
    inbound: mpsc::Receiver<SocketEvent>,
}

/// Collaborators and shared state handed to the driver at spawn
pub(crate) struct DriverParts {
    pub options: GatewayOptions,
    pub endpoints: SharedEndpointSource,
    pub members: Option<SharedMemberSource>,
    pub connector: SharedConnector,
    pub cache: SharedEntityCache,
    pub clock: SharedClock,
    pub bus: EventBus,
    pub status: Arc<RwLock<GatewayStatus>>,
}

pub(crate) struct Driver {
    options: GatewayOptions,
    endpoints: SharedEndpointSource,
    members: Option<SharedMemberSource>,
    connector: SharedConnector,
    cache: SharedEntityCache,
    clock: SharedClock,
    bus: EventBus,
    status: Arc<RwLock<GatewayStatus>>,
    commands: mpsc::Receiver<Command>,

    state: ConnectionState,
    ready: bool,
    socket: Option<LiveSocket>,
    heartbeat: HeartbeatMonitor,
    retry: RetryBudget,
    reconnect: Timer,
    /// `connect()` callers waiting for the current attempt
    waiters: Vec<Reply<()>>,
    /// `send()` calls parked until the connection is up
    deferred: Vec<(ClientPacket, Reply<()>)>,
}

impl Driver {
    pub(crate) fn new(parts: DriverParts, commands: mpsc::Receiver<Command>) -> Self {
        let heartbeat = HeartbeatMonitor::new(parts.clock.clone());
        let retry = RetryBudget::new(parts.options.reconnect.max_attempts);

        Self {
            options: parts.options,
            endpoints: parts.endpoints,
            members: parts.members,
            connector: parts.connector,
            cache: parts.cache,
            clock: parts.clock,
            bus: parts.bus,
            status: parts.status,
            commands,
            state: ConnectionState::Disconnected,
            ready: false,
            socket: None,
            heartbeat,
            retry,
            reconnect: Timer::new(),
            waiters: Vec::new(),
            deferred: Vec::new(),
        }
    }

    /// Run until every handle is dropped
    pub(crate) async fn run(mut self) {
        tracing::debug!("Gateway driver started");

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                event = next_event(&mut self.socket) => self.handle_socket_event(event).await,
                () = self.heartbeat.tick() => self.send_heartbeat().await,
                () = self.reconnect.expired() => {
                    tracing::info!(attempt = self.retry.attempts() + 1, "Reconnecting to gateway");
                    self.open().await;
                }
            }
        }

        self.socket = None;
        self.heartbeat.clear();
        self.settle_pending(&GatewayError::DriverStopped);
        tracing::debug!("Gateway driver stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect { reply } => self.connect(reply).await,
            Command::Send { packet, reply } => {
                if self.state.is_pending() {
                    tracing::trace!(packet = packet.kind(), "Deferring send until connected");
                    self.deferred.push((packet, reply));
                } else if self.state == ConnectionState::Connected {
                    let _ = reply.send(self.write(&packet).await);
                } else {
                    let _ = reply.send(Err(GatewayError::SocketNotOpen));
                }
            }
            Command::TrySend { packet, reply } => {
                let result = if self.state == ConnectionState::Connected {
                    self.write(&packet).await
                } else {
                    Err(GatewayError::SocketNotOpen)
                };
                let _ = reply.send(result);
            }
            Command::Destroy {
                user_initiated,
                reply,
            } => {
                self.destroy(user_initiated);
                let _ = reply.send(());
            }
            Command::SetHeartbeatTimer { interval } => {
                tracing::debug!(interval_ms = ?interval.map(|i| i.as_millis()), "Setting heartbeat timer");
                self.heartbeat.set_timer(interval);
            }
            Command::SendHeartbeat => self.send_heartbeat().await,
        }
    }

    async fn connect(&mut self, reply: Reply<()>) {
        match self.state {
            ConnectionState::Connected if self.socket.is_some() => {
                let _ = reply.send(Ok(()));
            }
            state if state.is_pending() => self.waiters.push(reply),
            state => {
                self.waiters.push(reply);
                // Only authentication or leaving Destroyed refills the budget
                if state == ConnectionState::Destroyed {
                    self.retry.reset();
                }
                self.open().await;
            }
        }
    }

    /// Make one connection attempt
    async fn open(&mut self) {
        self.reconnect.clear();

        let attempt = match self.retry.spend() {
            Ok(attempt) => attempt,
            Err(err) => {
                tracing::error!(
                    attempts = self.retry.ceiling(),
                    "Reconnect attempts exhausted, giving up"
                );
                self.heartbeat.clear();
                self.set_state(ConnectionState::Destroyed);
                self.bus.emit(ClientEvent::Error(err.clone()));
                self.settle_pending(&err);
                return;
            }
        };
        self.set_state(ConnectionState::Connecting);

        let url = match self.endpoints.gateway_url().await {
            Ok(url) => url,
            Err(err) => {
                tracing::error!(error = %err, "Failed to resolve gateway endpoint");
                self.set_state(ConnectionState::Disconnected);
                self.bus.emit(ClientEvent::Error(err.clone()));
                self.settle_pending(&err);
                return;
            }
        };

        tracing::info!(attempt, url = %url, "Opening gateway socket");

        match self.connector.connect(&url).await {
            Ok(socket) => {
                let session_id = Uuid::new_v4().to_string();
                tracing::info!(session_id = %session_id, "Gateway socket open");

                self.socket = Some(LiveSocket {
                    session_id,
                    outbound: socket.outbound,
                    inbound: socket.inbound,
                });
                self.heartbeat.reset();
                self.set_state(ConnectionState::Authenticating);

                let authenticate = ClientPacket::Authenticate {
                    token: self.options.token.clone(),
                };
                if let Err(e) = self.write(&authenticate).await {
                    tracing::warn!(error = %e, "Failed to send Authenticate");
                    self.connection_lost();
                }
            }
            Err(err) => {
                tracing::warn!(attempt, error = %err, "Failed to open gateway socket");
                self.bus.emit(ClientEvent::Error(err));
                self.connection_lost();
            }
        }
    }

    /// The socket went away without a destroy
    fn connection_lost(&mut self) {
        self.drop_socket();

        if self.options.auto_reconnect {
            self.set_state(ConnectionState::Reconnecting);
            self.schedule_reconnect();
        } else {
            self.set_state(ConnectionState::Disconnected);
            self.settle_pending(&GatewayError::ConnectionClosed);
        }
    }

    fn destroy(&mut self, user_initiated: bool) {
        self.drop_socket();

        if user_initiated {
            self.reconnect.clear();
            self.set_state(ConnectionState::Destroyed);
            self.settle_pending(&GatewayError::Destroyed);
        } else {
            self.set_state(ConnectionState::Reconnecting);
            self.schedule_reconnect();
        }
    }

    fn drop_socket(&mut self) {
        if let Some(socket) = self.socket.take() {
            tracing::info!(session_id = %socket.session_id, "Closing gateway socket");
        }
        self.heartbeat.clear();
        self.ready = false;
        self.sync_status();
    }

    fn schedule_reconnect(&mut self) {
        if self.reconnect.is_armed() {
            return;
        }

        let delay = self.options.reconnect.delay;
        tracing::info!(delay_ms = delay.as_millis() as u64, "Scheduling reconnect");
        self.reconnect.arm(&self.clock, delay);
    }

    async fn send_heartbeat(&mut self) {
        if self.socket.is_none() {
            tracing::debug!("No socket, skipping heartbeat");
            return;
        }

        if self.heartbeat.liveness() == Liveness::PongMissed {
            if self.options.auto_reconnect {
                tracing::warn!(session_id = %self.session_id(), "Heartbeat not acknowledged, reconnecting");
                self.destroy(false);
                return;
            }
            tracing::debug!(session_id = %self.session_id(), "Heartbeat not acknowledged");
        }

        let (now, _) = self.heartbeat.record_ping();
        self.sync_status();

        if let Err(e) = self.write(&ClientPacket::Ping { data: now }).await {
            tracing::warn!(error = %e, "Failed to send heartbeat");
        }
    }

    async fn handle_socket_event(&mut self, event: SocketEvent) {
        match event {
            SocketEvent::Text(text) => {
                for packet in dispatch::decode_frame(&text) {
                    match packet {
                        Ok(packet) => self.handle_packet(packet).await,
                        Err(err) => {
                            tracing::warn!(error = %err, "Dropping malformed packet");
                            self.bus.emit(ClientEvent::Error(err));
                        }
                    }
                }
            }
            SocketEvent::Closed { code, reason } => {
                tracing::info!(
                    session_id = %self.session_id(),
                    code = ?code,
                    reason = %reason,
                    "Gateway socket closed"
                );
                self.connection_lost();
            }
        }
    }

    async fn handle_packet(&mut self, packet: ServerPacket) {
        match packet {
            ServerPacket::Authenticated => self.authenticated().await,
            ServerPacket::Pong { .. } => {
                tracing::trace!("Pong received");
                self.heartbeat.ack();
            }
            ServerPacket::Error { error } => {
                let message = server_error_message(&error);
                tracing::warn!(error = %message, "Gateway reported an error");
                self.bus.emit(ClientEvent::Error(GatewayError::Server(message)));
            }
            ServerPacket::Ready(payload) => self.ingest_ready(*payload).await,
            packet => {
                let kind = packet.kind();
                match dispatch::apply(&self.cache, packet) {
                    Ok(Some(event)) => self.bus.emit(event),
                    Ok(None) => tracing::trace!(packet = %kind, "Packet produced no event"),
                    Err(err) => {
                        tracing::warn!(packet = %kind, error = %err, "Failed to apply packet");
                        self.bus.emit(ClientEvent::Error(err));
                    }
                }
            }
        }
    }

    async fn authenticated(&mut self) {
        tracing::info!(session_id = %self.session_id(), "Authenticated with gateway");

        self.retry.reset();
        self.set_state(ConnectionState::Connected);

        for waiter in self.waiters.drain(..) {
            let _ = waiter.send(Ok(()));
        }

        for (packet, reply) in std::mem::take(&mut self.deferred) {
            let _ = reply.send(self.write(&packet).await);
        }
    }

    async fn ingest_ready(&mut self, payload: ReadyPayload) {
        let voice_states = ready::apply_snapshot(&self.cache, payload);

        if self.options.prefetch_members {
            if let Some(members) = &self.members {
                ready::prefetch_members(&self.cache, members.as_ref()).await;
            }
        }

        self.heartbeat.set_timer(self.options.heartbeat_interval);
        ready::apply_voice_states(&self.cache, voice_states);

        if !self.ready {
            self.ready = true;
            self.sync_status();
            tracing::info!(
                session_id = %self.session_id(),
                users = self.cache.users().len(),
                servers = self.cache.servers().len(),
                "Gateway ready"
            );
            self.bus.emit(ClientEvent::Ready);
        }
    }

    async fn write(&mut self, packet: &ClientPacket) -> GatewayResult<()> {
        let Some(socket) = &self.socket else {
            return Err(GatewayError::SocketNotOpen);
        };

        let json = packet
            .to_json()
            .map_err(|e| GatewayError::Protocol(e.to_string()))?;

        tracing::trace!(session_id = %socket.session_id, packet = packet.kind(), "Sending packet");
        socket
            .outbound
            .send(json)
            .await
            .map_err(|_| GatewayError::SocketNotOpen)
    }

    /// Reject every pending `connect()` and deferred `send()`
    fn settle_pending(&mut self, err: &GatewayError) {
        for waiter in self.waiters.drain(..) {
            let _ = waiter.send(Err(err.clone()));
        }
        for (_, reply) in self.deferred.drain(..) {
            let _ = reply.send(Err(err.clone()));
        }
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state == state {
            return;
        }

        tracing::debug!(from = %self.state, to = %state, "Connection state changed");
        self.state = state;
        self.sync_status();
        self.bus.emit(ClientEvent::State(state));
    }

    fn sync_status(&self) {
        let mut status = self.status.write();
        status.state = self.state;
        status.ready = self.ready;
        status.last_ping = self.heartbeat.last_ping();
        status.socket_open = self.socket.is_some();
        status.retry_count = self.retry.attempts();
    }

    fn session_id(&self) -> &str {
        self.socket.as_ref().map_or("-", |s| s.session_id.as_str())
    }
}

/// Wait for the next socket event; never resolves without a socket
async fn next_event(socket: &mut Option<LiveSocket>) -> SocketEvent {
    match socket {
        Some(socket) => socket
            .inbound
            .recv()
            .await
            .unwrap_or_else(|| SocketEvent::closed("socket reader stopped")),
        None => std::future::pending().await,
    }
}

/// Best-effort text for an `Error` packet payload
fn server_error_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => fields
            .get("type")
            .and_then(Value::as_str)
            .map_or_else(|| error.to_string(), ToString::to_string),
        other => other.to_string(),
    }
}
