//! WebSocket transport
//!
//! A [`Connector`] opens a socket and hands back a pair of channels: text
//! frames to write, and events read from the wire. Dropping the outbound
//! sender closes the socket.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::error::GatewayResult;

/// Channel buffer size for socket frames
const SOCKET_BUFFER_SIZE: usize = 256;

/// Something read from the socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    Text(String),
    /// The socket is gone; no further events follow
    Closed { code: Option<u16>, reason: String },
}

impl SocketEvent {
    pub fn closed(reason: impl Into<String>) -> Self {
        Self::Closed {
            code: None,
            reason: reason.into(),
        }
    }
}

/// An open socket
#[derive(Debug)]
pub struct Socket {
    pub outbound: mpsc::Sender<String>,
    pub inbound: mpsc::Receiver<SocketEvent>,
}

/// Opens WebSocket connections
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> GatewayResult<Socket>;
}

pub type SharedConnector = Arc<dyn Connector>;

/// Connector backed by `tokio-tungstenite`
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

impl TungsteniteConnector {
    pub fn shared() -> SharedConnector {
        Arc::new(Self)
    }
}

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> GatewayResult<Socket> {
        let (stream, _response) = tokio_tungstenite::connect_async(url).await?;
        let (mut ws_sink, mut ws_stream) = stream.split();

        let (outbound, mut outbound_rx) = mpsc::channel::<String>(SOCKET_BUFFER_SIZE);
        let (inbound_tx, inbound) = mpsc::channel(SOCKET_BUFFER_SIZE);

        // Write pump
        tokio::spawn(async move {
            while let Some(text) = outbound_rx.recv().await {
                if let Err(e) = ws_sink.send(Message::Text(text)).await {
                    tracing::warn!(error = %e, "Failed to write to gateway socket");
                    break;
                }
            }

            // Close the WebSocket when the channel is closed
            let _ = ws_sink.close().await;
        });

        // Read pump
        tokio::spawn(async move {
            let closed = loop {
                let text = match ws_stream.next().await {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                        Ok(text) => text,
                        Err(_) => {
                            tracing::debug!("Ignoring non-UTF-8 binary frame");
                            continue;
                        }
                    },
                    Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => continue,
                    Some(Ok(Message::Close(frame))) => {
                        break match frame {
                            Some(frame) => SocketEvent::Closed {
                                code: Some(u16::from(frame.code)),
                                reason: frame.reason.to_string(),
                            },
                            None => SocketEvent::closed("closed by peer"),
                        };
                    }
                    Some(Err(e)) => break SocketEvent::closed(e.to_string()),
                    None => break SocketEvent::closed("stream ended"),
                };

                if inbound_tx.send(SocketEvent::Text(text)).await.is_err() {
                    // Socket was dropped by its owner
                    return;
                }
            };

            let _ = inbound_tx.send(closed).await;
        });

        Ok(Socket { outbound, inbound })
    }
}
