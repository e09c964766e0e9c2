//! Request queue tests
//!
//! Drive the per-surface queues through a scripted transport under paused
//! time, plus a couple of runs through reqwest against a local server.
//!
//! Run with: cargo test -p integration-tests --test request_queue_tests

use std::sync::Arc;
use std::time::Duration;

use chat_common::{system_clock, ClientConfig, BOT_TOKEN_HEADER, SESSION_TOKEN_HEADER};
use chat_http::{
    ApiClient, ApiError, MediaClient, Method, QueueSettings, RequestQueue, ReqwestTransport,
    SendMessage, SharedTransport, Surface,
};
use integration_tests::{fixtures, init_test_tracing, ScriptedTransport, TestServer, TEST_TOKEN};
use serde_json::{json, Value};
use tokio::time::Instant;

const API: &str = "https://api.test";
const MEDIA: &str = "https://media.test";

fn config() -> ClientConfig {
    ClientConfig::new(TEST_TOKEN).with_api_url(API)
}

fn spawn_queue(surface: Surface, base_url: &str, config: &ClientConfig, transport: SharedTransport) -> RequestQueue {
    RequestQueue::spawn(
        QueueSettings::from_config(surface, base_url, config),
        transport,
        system_clock(),
    )
}

fn api(transport: &Arc<ScriptedTransport>) -> ApiClient {
    ApiClient::new(spawn_queue(Surface::Api, API, &config(), transport.clone()))
}

// ============================================================================
// Retry policy
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_transient_failures_retried_after_fixed_delay() {
    let transport = ScriptedTransport::new();
    let url = format!("{API}/users/@me");
    transport.respond(Method::GET, &url, 503, "");
    transport.respond(Method::GET, &url, 503, "");
    transport.respond_json(Method::GET, &url, 200, &fixtures::self_user("01SELF"));

    let start = Instant::now();
    let user = api(&transport).fetch_self().await.unwrap();

    assert_eq!(user.id, "01SELF");
    assert_eq!(transport.count(&url), 3);
    assert_eq!(start.elapsed(), Duration::from_secs(30));
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_responses_are_retried() {
    let transport = ScriptedTransport::new();
    let url = format!("{API}/users/01PEER");
    transport.respond(Method::GET, &url, 429, r#"{"type":"RateLimited"}"#);
    transport.respond_json(Method::GET, &url, 200, &fixtures::user("01PEER", "peer"));

    let user = api(&transport).fetch_user("01PEER").await.unwrap();

    assert_eq!(user.username, "peer");
    assert_eq!(transport.count(&url), 2);
}

#[tokio::test(start_paused = true)]
async fn test_client_errors_settle_immediately() {
    let transport = ScriptedTransport::new();
    let url = format!("{API}/users/01GONE");
    transport.respond(Method::GET, &url, 404, r#"{"type":"NotFound"}"#);

    let start = Instant::now();
    let err = api(&transport).fetch_user("01GONE").await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::Status { status: 404, ref message } if message == "NotFound"
    ));
    assert!(err.is_not_found());
    assert_eq!(transport.count(&url), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_retry_cap() {
    let transport = ScriptedTransport::new();
    let url = format!("{API}/servers/01SERVER");
    transport.respond(Method::GET, &url, 502, "bad gateway");

    let start = Instant::now();
    let err = api(&transport).fetch_server("01SERVER").await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::MaxRetriesExceeded {
            retries: 3,
            status: 502
        }
    ));
    assert_eq!(transport.count(&url), 4);
    assert_eq!(start.elapsed(), Duration::from_secs(45));
}

#[tokio::test(start_paused = true)]
async fn test_configured_retry_policy() {
    let transport = ScriptedTransport::new();
    let url = format!("{API}/servers/01SERVER");
    transport.respond(Method::GET, &url, 500, "");

    let config = config()
        .with_max_retries(1)
        .with_request_timeout(Duration::from_millis(250));
    let client = ApiClient::new(spawn_queue(Surface::Api, API, &config, transport.clone()));

    let start = Instant::now();
    let err = client.fetch_server("01SERVER").await.unwrap_err();

    assert_eq!(err.code(), "MAX_RETRIES_EXCEEDED");
    assert_eq!(transport.count(&url), 2);
    assert_eq!(start.elapsed(), Duration::from_millis(250));
}

#[tokio::test(start_paused = true)]
async fn test_network_failure_is_not_retried() {
    let transport = ScriptedTransport::new();
    let url = format!("{API}/channels/01CHANNEL");
    transport.fail(Method::GET, &url, "connection reset");

    let err = api(&transport).fetch_channel("01CHANNEL").await.unwrap_err();

    assert!(matches!(err, ApiError::Transport { .. }));
    assert_eq!(transport.count(&url), 1);
}

#[tokio::test(start_paused = true)]
async fn test_missing_token_sends_nothing() {
    let transport = ScriptedTransport::new();
    let config = ClientConfig::default().with_api_url(API);
    let client = ApiClient::new(spawn_queue(Surface::Api, API, &config, transport.clone()));

    let err = client.fetch_self().await.unwrap_err();
    assert!(matches!(err, ApiError::AuthRequired));
    assert!(transport.requests().is_empty());
}

// ============================================================================
// Ordering and surfaces
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_requests_on_one_surface_are_serialized() {
    let transport = ScriptedTransport::new();
    let slow = format!("{API}/users/01SLOW");
    let fast = format!("{API}/users/01FAST");
    transport.respond(Method::GET, &slow, 503, "");
    transport.respond_json(Method::GET, &slow, 200, &fixtures::user("01SLOW", "slow"));
    transport.respond_json(Method::GET, &fast, 200, &fixtures::user("01FAST", "fast"));

    let client = api(&transport);
    let start = Instant::now();
    let first = tokio::spawn({
        let client = client.clone();
        async move { client.fetch_user("01SLOW").await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    client.fetch_user("01FAST").await.unwrap();
    assert!(start.elapsed() >= Duration::from_secs(15));
    first.await.unwrap().unwrap();

    let order: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
    assert_eq!(order, [slow.clone(), slow, fast]);
}

#[tokio::test(start_paused = true)]
async fn test_surfaces_do_not_block_each_other() {
    let transport = ScriptedTransport::new();
    let slow = format!("{API}/users/01SLOW");
    transport.respond(Method::GET, &slow, 503, "");
    transport.respond_json(Method::GET, &slow, 200, &fixtures::user("01SLOW", "slow"));
    transport.respond_json(
        Method::GET,
        &format!("{MEDIA}/"),
        200,
        &json!({"autumn": "1.1.0", "tags": {"attachments": {}}}),
    );

    let client = api(&transport);
    let media = MediaClient::new(spawn_queue(Surface::Media, MEDIA, &config(), transport.clone()));

    let start = Instant::now();
    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.fetch_user("01SLOW").await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    let info = media.fetch_info().await.unwrap();
    assert_eq!(info.autumn, "1.1.0");
    assert!(start.elapsed() < Duration::from_secs(1));
    assert!(!pending.is_finished());

    pending.await.unwrap().unwrap();
}

// ============================================================================
// Requests on the wire
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_session_token_header() {
    let transport = ScriptedTransport::new();
    transport.respond_json(Method::GET, &format!("{API}/users/@me"), 200, &fixtures::self_user("01SELF"));

    api(&transport).fetch_self().await.unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.header(SESSION_TOKEN_HEADER), Some(TEST_TOKEN));
    assert_eq!(request.header(BOT_TOKEN_HEADER), None);
}

#[tokio::test(start_paused = true)]
async fn test_bot_token_header() {
    let transport = ScriptedTransport::new();
    transport.respond_json(Method::GET, &format!("{API}/users/@me"), 200, &fixtures::self_user("01BOT"));
    let config = config().with_bot(true);
    let client = ApiClient::new(spawn_queue(Surface::Api, API, &config, transport.clone()));

    client.fetch_self().await.unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.header(BOT_TOKEN_HEADER), Some(TEST_TOKEN));
    assert_eq!(request.header(SESSION_TOKEN_HEADER), None);
}

#[tokio::test(start_paused = true)]
async fn test_send_message_posts_body_with_nonce() {
    let transport = ScriptedTransport::new();
    let url = format!("{API}/channels/01CHANNEL/messages");
    transport.respond_json(
        Method::POST,
        &url,
        200,
        &fixtures::message("01MSG", "01CHANNEL", "01SELF", "hello"),
    );

    let message = api(&transport)
        .send_message("01CHANNEL", SendMessage::text("hello"))
        .await
        .unwrap();
    assert_eq!(message.id, "01MSG");

    let request = &transport.requests()[0];
    assert_eq!(request.method, Method::POST);
    let body = request.body.as_ref().unwrap();
    assert_eq!(body["content"], "hello");
    assert!(body["nonce"].as_str().is_some_and(|n| !n.is_empty()));
}

#[tokio::test(start_paused = true)]
async fn test_delete_accepts_empty_body() {
    let transport = ScriptedTransport::new();
    let url = format!("{API}/channels/01CHANNEL/messages/01MSG");
    transport.respond(Method::DELETE, &url, 204, "");

    api(&transport)
        .delete_message("01CHANNEL", "01MSG")
        .await
        .unwrap();
    assert_eq!(transport.count(&url), 1);
}

#[tokio::test(start_paused = true)]
async fn test_query_parameters_are_forwarded() {
    let transport = ScriptedTransport::new();
    let url = format!("{API}/channels/01CHANNEL/messages");
    transport.respond_json(Method::GET, &url, 200, &json!([]));

    let queue = spawn_queue(Surface::Api, API, &config(), transport.clone());
    let messages: Vec<Value> = queue
        .enqueue(
            Method::GET,
            "/channels/01CHANNEL/messages",
            None,
            Some(vec![("limit".to_string(), "50".to_string())]),
        )
        .await
        .unwrap();

    assert!(messages.is_empty());
    assert_eq!(transport.count(&url), 1);
}

// ============================================================================
// Through reqwest
// ============================================================================

#[tokio::test]
async fn test_reqwest_transport_against_local_server() {
    init_test_tracing();
    let server = TestServer::start().await.unwrap();
    let transport = ReqwestTransport::new().unwrap().shared();

    let config = ClientConfig::new(TEST_TOKEN).with_api_url(server.base_url());
    let client = ApiClient::new(spawn_queue(Surface::Api, &server.base_url(), &config, transport.clone()));
    let user = client.fetch_self().await.unwrap();
    assert_eq!(user.id, "01SELF");

    let members = client.fetch_members("01SERVER").await.unwrap();
    assert_eq!(members.members.len(), 2);
    assert_eq!(members.users.len(), 2);

    let config = ClientConfig::new("wrong-token").with_api_url(server.base_url());
    let client = ApiClient::new(spawn_queue(Surface::Api, &server.base_url(), &config, transport));
    let err = client.fetch_self().await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Status { status: 401, ref message } if message == "InvalidSession"
    ));
}
