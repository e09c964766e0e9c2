//! Rate-limited request queue
//!
//! Each API surface owns one queue. Requests are processed one at a time in
//! FIFO order by a dedicated worker task: the worker waits for the surface's
//! token bucket, executes the request, and retries transient failures
//! (429 and 5xx) after a fixed delay until the retry cap is exceeded.

use chat_common::{ClientConfig, RateLimitConfig, RequestConfig, SessionConfig, SharedClock};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::num::NonZeroU32;
use tokio::sync::{mpsc, oneshot};

use crate::error::{ApiError, ApiResult};
use crate::transport::{HttpRequest, HttpResponse, SharedTransport};

/// API surface served by a queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// Primary REST API
    Api,
    /// Media / attachment storage
    Media,
}

impl Surface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Media => "media",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for one queue instance
#[derive(Debug, Clone)]
pub struct QueueSettings {
    pub surface: Surface,
    pub base_url: String,
    pub session: SessionConfig,
    pub requests: RequestConfig,
    pub rate_limit: RateLimitConfig,
}

impl QueueSettings {
    /// Settings for a surface, sharing credentials and retry policy with the client config
    pub fn from_config(surface: Surface, base_url: impl Into<String>, config: &ClientConfig) -> Self {
        Self {
            surface,
            base_url: base_url.into(),
            session: config.session.clone(),
            requests: config.requests.clone(),
            rate_limit: config.rate_limit.clone(),
        }
    }
}

/// A request owned by the queue from enqueue to settlement
#[derive(Debug)]
struct QueuedRequest {
    http: HttpRequest,
    /// Number of transient failures so far
    attempt: u32,
    reply: oneshot::Sender<ApiResult<HttpResponse>>,
}

/// Handle to a surface's request queue
///
/// Cheap to clone; the worker stops once every handle has been dropped.
#[derive(Debug, Clone)]
pub struct RequestQueue {
    surface: Surface,
    base_url: String,
    session: SessionConfig,
    tx: mpsc::UnboundedSender<QueuedRequest>,
}

impl RequestQueue {
    /// Create a queue and spawn its worker
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(settings: QueueSettings, transport: SharedTransport, clock: SharedClock) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let worker = QueueWorker {
            surface: settings.surface,
            transport,
            clock,
            limiter: build_limiter(&settings.rate_limit),
            requests: settings.requests,
            rx,
        };
        tokio::spawn(worker.run());

        tracing::debug!(
            surface = %settings.surface,
            base_url = %settings.base_url,
            "Request queue started"
        );

        Self {
            surface: settings.surface,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            session: settings.session,
            tx,
        }
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Queue a request and decode the response body into `T`
    ///
    /// An empty body decodes as JSON `null`, so `T = ()` works for bodiless
    /// responses.
    pub async fn enqueue<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        query: Option<Vec<(String, String)>>,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.submit(method, path, body, query).await?;
        decode_body(&response.body)
    }

    /// Queue a request and return the raw response
    pub async fn submit(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        query: Option<Vec<(String, String)>>,
    ) -> ApiResult<HttpResponse> {
        let Some((header, token)) = self.session.auth_header() else {
            return Err(ApiError::AuthRequired);
        };

        let http = HttpRequest::new(method, format!("{}{}", self.base_url, path))
            .with_header(header, token)
            .with_query(query.unwrap_or_default())
            .with_body(body);

        let (reply, settled) = oneshot::channel();
        self.tx
            .send(QueuedRequest {
                http,
                attempt: 0,
                reply,
            })
            .map_err(|_| ApiError::QueueClosed)?;

        settled.await.map_err(|_| ApiError::QueueClosed)?
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.enqueue(Method::GET, path, None, None).await
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> ApiResult<T> {
        self.enqueue(Method::POST, path, Some(body), None).await
    }

    pub async fn patch<T: DeserializeOwned>(&self, path: &str, body: Value) -> ApiResult<T> {
        self.enqueue(Method::PATCH, path, Some(body), None).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.enqueue(Method::DELETE, path, None, None).await
    }
}

/// Decode a response body, treating an empty body as `null`
fn decode_body<T: DeserializeOwned>(body: &str) -> ApiResult<T> {
    if body.trim().is_empty() {
        Ok(serde_json::from_value(Value::Null)?)
    } else {
        Ok(serde_json::from_str(body)?)
    }
}

fn build_limiter(config: &RateLimitConfig) -> DefaultDirectRateLimiter {
    let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
    let burst = NonZeroU32::new(config.burst).unwrap_or(per_second);

    RateLimiter::direct(Quota::per_second(per_second).allow_burst(burst))
}

/// Worker draining one queue
struct QueueWorker {
    surface: Surface,
    transport: SharedTransport,
    clock: SharedClock,
    limiter: DefaultDirectRateLimiter,
    requests: RequestConfig,
    rx: mpsc::UnboundedReceiver<QueuedRequest>,
}

impl QueueWorker {
    async fn run(mut self) {
        while let Some(mut request) = self.rx.recv().await {
            let result = self.process(&mut request).await;
            if request.reply.send(result).is_err() {
                tracing::debug!(surface = %self.surface, "Request caller went away before settlement");
            }
        }

        tracing::debug!(surface = %self.surface, "Request queue stopped");
    }

    async fn process(&self, request: &mut QueuedRequest) -> ApiResult<HttpResponse> {
        loop {
            self.limiter.until_ready().await;

            let response = self.transport.execute(&request.http).await.map_err(|e| {
                tracing::warn!(
                    surface = %self.surface,
                    method = %request.http.method,
                    url = %request.http.url,
                    error = %e,
                    "Request failed without a response"
                );
                e
            })?;

            if response.is_success() {
                return Ok(response);
            }

            if !response.is_transient() {
                return Err(ApiError::Status {
                    status: response.status,
                    message: response.error_message(),
                });
            }

            request.attempt += 1;
            if request.attempt > self.requests.max_retries {
                tracing::warn!(
                    surface = %self.surface,
                    url = %request.http.url,
                    status = response.status,
                    "Retry limit reached"
                );
                return Err(ApiError::MaxRetriesExceeded {
                    retries: self.requests.max_retries,
                    status: response.status,
                });
            }

            tracing::debug!(
                surface = %self.surface,
                url = %request.http.url,
                status = response.status,
                attempt = request.attempt,
                "Transient failure, retrying"
            );
            self.clock.sleep(self.requests.retry_delay()).await;
        }
    }
}
