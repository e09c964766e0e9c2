//! # chat-client
//!
//! Entry point for applications: one [`Client`] owns the API and media
//! request queues, the gateway connection and the entity cache they share.
//!
//! ## Example
//!
//! ```ignore
//! use chat_client::Client;
//! use chat_common::{init_tracing, ClientConfig};
//!
//! init_tracing();
//! let client = Client::init(ClientConfig::from_env()?).await?;
//! let mut events = client.subscribe();
//! client.connect().await?;
//!
//! while let Ok(event) = events.recv().await {
//!     tracing::info!(event = event.name(), "event");
//! }
//! ```

mod client;
pub mod error;

pub use client::{Client, ClientBuilder};
pub use error::{ClientError, ClientResult};

