//! # chat-gateway
//!
//! Real-time side of the client: a WebSocket connection that authenticates,
//! keeps itself alive with heartbeats, reconnects on failure, ingests the
//! Ready snapshot into the entity cache and publishes typed events.
//!
//! ## Example
//!
//! ```ignore
//! use chat_gateway::{GatewayConnection, GatewayOptions, StaticEndpoint};
//!
//! let gateway = GatewayConnection::builder(
//!     GatewayOptions::from_config(&config),
//!     Arc::new(StaticEndpoint::new("wss://ws.example.chat")),
//! )
//! .spawn();
//!
//! let mut events = gateway.subscribe();
//! gateway.connect().await?;
//! ```

pub mod connection;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod heartbeat;
pub mod protocol;
pub mod reconnect;
pub mod sources;
pub mod timer;

pub use connection::{
    ConnectionState, Connector, GatewayBuilder, GatewayConnection, GatewayOptions, GatewayStatus,
    SharedConnector, Socket, SocketEvent, TungsteniteConnector,
};
pub use error::{GatewayError, GatewayResult};
pub use events::{ClientEvent, EventBus};
pub use heartbeat::{HeartbeatMonitor, Liveness, DEFAULT_HEARTBEAT_INTERVAL};
pub use protocol::{ClientPacket, PacketKind, ReadyPayload, ServerPacket};
pub use reconnect::{ReconnectConfig, RetryBudget, MAX_RECONNECT_ATTEMPTS, RECONNECT_DELAY};
pub use sources::{
    EndpointSource, MemberSource, SharedEndpointSource, SharedMemberSource, StaticEndpoint,
};
