//! Connection lifecycle
//!
//! A [`GatewayConnection`] is a handle to a driver task that owns the
//! socket and runs the authenticate / heartbeat / reconnect state machine.

mod driver;
mod handle;
mod socket;
mod state;

pub use handle::{GatewayBuilder, GatewayConnection, GatewayOptions};
pub use socket::{Connector, SharedConnector, Socket, SocketEvent, TungsteniteConnector};
pub use state::{ConnectionState, GatewayStatus};
