//! # chat-http
//!
//! HTTP side of the client: paced, retrying request queues (one per API
//! surface), instance discovery, and typed route helpers.
//!
//! ## Example
//!
//! ```ignore
//! use chat_http::{ApiClient, QueueSettings, RequestQueue, ReqwestTransport, Surface};
//!
//! let transport = ReqwestTransport::new()?.shared();
//! let settings = QueueSettings::from_config(Surface::Api, &config.endpoints.api_url, &config);
//! let api = ApiClient::new(RequestQueue::spawn(settings, transport, system_clock()));
//!
//! let me = api.fetch_self().await?;
//! ```

pub mod discovery;
pub mod error;
pub mod queue;
pub mod routes;
pub mod transport;

pub use discovery::{Discovery, Endpoints, InstanceInfo};
pub use error::{ApiError, ApiResult};
pub use queue::{QueueSettings, RequestQueue, Surface};
pub use routes::{ApiClient, MediaClient, MediaInfo, MemberList, SendMessage};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, SharedTransport};

// Re-export the method type used by `RequestQueue::enqueue`
pub use reqwest::Method;
