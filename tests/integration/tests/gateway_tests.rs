//! Gateway connection tests
//!
//! Run against in-memory sockets with paused tokio time, so heartbeat and
//! reconnect timings are exact.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::sync::Arc;
use std::time::Duration;

use chat_gateway::{
    ClientEvent, ClientPacket, ConnectionState, GatewayConnection, GatewayError, GatewayOptions,
    StaticEndpoint,
};
use integration_tests::{
    drain_events, fixtures, wait_for, MockConnector, ServerSide, SlowMembers, TEST_TOKEN,
};
use serde_json::json;
use tokio::time::Instant;

const EVENT_TIMEOUT: Duration = Duration::from_secs(60);

fn options() -> GatewayOptions {
    GatewayOptions::new(TEST_TOKEN)
}

fn spawn_gateway(connector: &Arc<MockConnector>, options: GatewayOptions) -> GatewayConnection {
    GatewayConnection::builder(options, Arc::new(StaticEndpoint::new("ws://mock/gateway")))
        .with_connector(connector.clone())
        .spawn()
}

/// Spawn a gateway and complete the handshake
async fn connected(
    connector: &Arc<MockConnector>,
    options: GatewayOptions,
) -> (GatewayConnection, ServerSide) {
    let gateway = spawn_gateway(connector, options);
    let connecting = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.connect().await }
    });

    let mut server = connector.accept().await;
    server.handshake().await;
    connecting
        .await
        .expect("connect task panicked")
        .expect("connect failed");

    (gateway, server)
}

fn is_ready(event: &ClientEvent) -> bool {
    matches!(event, ClientEvent::Ready)
}

fn not_state(event: &ClientEvent) -> bool {
    !matches!(event, ClientEvent::State(_))
}

// ============================================================================
// Handshake
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_connect_sends_token_and_resolves_on_authenticated() {
    let connector = MockConnector::new();
    let gateway = spawn_gateway(&connector, options());

    let connecting = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.connect().await }
    });

    let mut server = connector.accept().await;
    let authenticate = server.expect("Authenticate").await;
    assert_eq!(authenticate["token"], TEST_TOKEN);
    assert_eq!(gateway.state(), ConnectionState::Authenticating);
    assert!(!connecting.is_finished());

    server.send(&fixtures::authenticated()).await;
    connecting.await.unwrap().unwrap();

    assert_eq!(gateway.state(), ConnectionState::Connected);
    assert_eq!(gateway.retry_count(), 0);
    assert_eq!(connector.urls(), ["ws://mock/gateway"]);
}

#[tokio::test(start_paused = true)]
async fn test_connect_when_connected_is_a_no_op() {
    let connector = MockConnector::new();
    let (gateway, _server) = connected(&connector, options()).await;

    gateway.connect().await.unwrap();
    gateway.connect().await.unwrap();

    assert_eq!(connector.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_connects_share_one_attempt() {
    let connector = MockConnector::new();
    let gateway = spawn_gateway(&connector, options());

    let first = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.connect().await }
    });
    let second = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.connect().await }
    });

    let mut server = connector.accept().await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    server.handshake().await;

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();
    assert_eq!(connector.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_connect_without_token_opens_nothing() {
    let connector = MockConnector::new();
    let gateway = spawn_gateway(&connector, GatewayOptions::new(""));

    assert_eq!(gateway.connect().await, Err(GatewayError::AuthRequired));
    assert_eq!(connector.attempts(), 0);
}

// ============================================================================
// Reconnect budget
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_retry_budget_exhausts_after_ten_attempts() {
    let connector = MockConnector::new();
    connector.refuse(u32::MAX);
    let gateway = spawn_gateway(&connector, options());
    let mut events = gateway.subscribe();

    let start = Instant::now();
    let err = gateway.connect().await.unwrap_err();

    assert_eq!(err, GatewayError::MaxRetryExceeded { attempts: 10 });
    assert_eq!(connector.attempts(), 10);
    assert_eq!(gateway.state(), ConnectionState::Destroyed);

    // One attempt immediately, then one per second
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(10), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(11), "elapsed {elapsed:?}");

    let connecting = drain_events(&mut events)
        .into_iter()
        .filter(|e| matches!(e, ClientEvent::State(ConnectionState::Connecting)))
        .count();
    assert_eq!(connecting, 10);

    // Nothing else is attempted until connect() is called again
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(connector.attempts(), 10);
}

#[tokio::test(start_paused = true)]
async fn test_connect_after_exhaustion_starts_over() {
    let connector = MockConnector::new();
    connector.refuse(u32::MAX);
    let gateway = spawn_gateway(&connector, options());
    assert!(gateway.connect().await.is_err());

    connector.refuse(0);
    let connecting = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.connect().await }
    });
    let mut server = connector.accept().await;
    server.handshake().await;

    connecting.await.unwrap().unwrap();
    assert_eq!(connector.attempts(), 11);
    assert_eq!(gateway.retry_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_external_connects_share_retry_budget() {
    let connector = MockConnector::new();
    connector.refuse(u32::MAX);
    let gateway = spawn_gateway(&connector, options().with_auto_reconnect(false));

    for attempt in 1..=10 {
        let err = gateway.connect().await.unwrap_err();
        assert_eq!(err, GatewayError::ConnectionClosed, "attempt {attempt}");
        assert_eq!(gateway.retry_count(), attempt);
        assert_eq!(gateway.state(), ConnectionState::Disconnected);
    }

    let err = gateway.connect().await.unwrap_err();
    assert_eq!(err, GatewayError::MaxRetryExceeded { attempts: 10 });
    assert_eq!(connector.attempts(), 10);
    assert_eq!(gateway.state(), ConnectionState::Destroyed);

    // Leaving Destroyed starts a fresh budget
    let err = gateway.connect().await.unwrap_err();
    assert_eq!(err, GatewayError::ConnectionClosed);
    assert_eq!(connector.attempts(), 11);
    assert_eq!(gateway.retry_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_successful_authentication_resets_retry_count() {
    let connector = MockConnector::new();
    connector.refuse(3);
    let gateway = spawn_gateway(&connector, options());

    let connecting = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.connect().await }
    });
    let mut server = connector.accept().await;
    server.expect("Authenticate").await;
    assert_eq!(gateway.retry_count(), 4);

    server.send(&fixtures::authenticated()).await;
    connecting.await.unwrap().unwrap();
    assert_eq!(gateway.retry_count(), 0);
}

// ============================================================================
// Heartbeat
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_missed_pong_reconnects_exactly_once() {
    let connector = MockConnector::new();
    let (gateway, mut server) = connected(
        &connector,
        options().with_heartbeat_interval(Some(Duration::from_secs(1))),
    )
    .await;
    let mut events = gateway.subscribe();

    server.send(&fixtures::empty_ready()).await;
    wait_for(&mut events, EVENT_TIMEOUT, is_ready).await.unwrap();
    let start = Instant::now();

    // First tick pings; the pong never comes
    let ping = server.expect("Ping").await;
    assert!(ping["data"].as_u64().is_some());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(gateway.ping().is_some());

    // Second tick finds the ping unanswered and drops the socket
    assert!(server.recv().await.is_none());
    assert_eq!(start.elapsed(), Duration::from_secs(2));
    assert_eq!(gateway.state(), ConnectionState::Reconnecting);
    assert!(gateway.ping().is_none());

    // One reconnect after the fixed delay
    let mut second = connector.accept().await;
    assert_eq!(start.elapsed(), Duration::from_secs(3));
    assert_eq!(connector.attempts(), 2);

    second.handshake().await;
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(connector.attempts(), 2);
    assert_eq!(gateway.state(), ConnectionState::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_answered_pings_keep_connection() {
    let connector = MockConnector::new();
    let (gateway, mut server) = connected(
        &connector,
        options().with_heartbeat_interval(Some(Duration::from_secs(1))),
    )
    .await;
    server.send(&fixtures::empty_ready()).await;

    for _ in 0..5 {
        let ping = server.expect("Ping").await;
        server
            .send(&fixtures::pong(ping["data"].as_u64().unwrap()))
            .await;
    }

    assert_eq!(connector.attempts(), 1);
    assert_eq!(gateway.state(), ConnectionState::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_missed_pong_without_reconnect_keeps_pinging() {
    let connector = MockConnector::new();
    let (gateway, mut server) = connected(
        &connector,
        options()
            .with_auto_reconnect(false)
            .with_heartbeat_interval(Some(Duration::from_secs(1))),
    )
    .await;
    server.send(&fixtures::empty_ready()).await;

    for _ in 0..3 {
        server.expect("Ping").await;
    }

    assert_eq!(connector.attempts(), 1);
    assert_eq!(gateway.state(), ConnectionState::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_disabled() {
    let connector = MockConnector::new();
    let (gateway, mut server) =
        connected(&connector, options().with_heartbeat_interval(None)).await;
    server.send(&fixtures::empty_ready()).await;

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(server.drain().is_empty());
    assert_eq!(gateway.state(), ConnectionState::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_manual_heartbeat_and_timer_replacement() {
    let connector = MockConnector::new();
    let (gateway, mut server) =
        connected(&connector, options().with_heartbeat_interval(None)).await;

    gateway.send_heartbeat().await.unwrap();
    server.expect("Ping").await;

    gateway
        .set_heartbeat_timer(Some(Duration::from_secs(5)))
        .await
        .unwrap();
    gateway
        .set_heartbeat_timer(Some(Duration::from_secs(2)))
        .await
        .unwrap();
    server.send(&fixtures::pong(0)).await;

    let start = Instant::now();
    server.expect("Ping").await;
    assert_eq!(start.elapsed(), Duration::from_secs(2));
}

// ============================================================================
// Ready ingestion
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_ready_follows_member_prefetch() {
    let connector = MockConnector::new();
    let members = Arc::new(
        SlowMembers::new(Duration::from_millis(500)).with_server("01SERVER", vec!["01SELF", "01PEER"]),
    );
    let gateway = GatewayConnection::builder(options(), Arc::new(StaticEndpoint::new("ws://mock")))
        .with_connector(connector.clone())
        .with_members(members.clone())
        .spawn();
    let mut events = gateway.subscribe();

    let connecting = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.connect().await }
    });
    let mut server = connector.accept().await;
    server.handshake().await;
    connecting.await.unwrap().unwrap();

    let start = Instant::now();
    server
        .send(&fixtures::ready("01SELF", "01SERVER", "01CHANNEL"))
        .await;
    wait_for(&mut events, EVENT_TIMEOUT, is_ready).await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(500));
    assert!(gateway.is_ready());

    let cache = gateway.cache();
    assert_eq!(cache.member_count("01SERVER"), 2);
    assert!(cache.users().contains("01PEER"));
    assert!(cache.channels().contains("01CHANNEL"));
    assert_eq!(cache.current_user_id().as_deref(), Some("01SELF"));
    assert_eq!(members.calls(), ["01SERVER"]);
}

#[tokio::test(start_paused = true)]
async fn test_ready_emitted_once_per_connection() {
    let connector = MockConnector::new();
    let (gateway, server) = connected(&connector, options()).await;
    let mut events = gateway.subscribe();

    server.send(&fixtures::empty_ready()).await;
    server.send(&fixtures::empty_ready()).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let ready = drain_events(&mut events)
        .into_iter()
        .filter(is_ready)
        .count();
    assert_eq!(ready, 1);
}

#[tokio::test(start_paused = true)]
async fn test_ready_again_after_reconnect() {
    let connector = MockConnector::new();
    let (gateway, server) = connected(&connector, options()).await;
    let mut events = gateway.subscribe();

    server.send(&fixtures::empty_ready()).await;
    wait_for(&mut events, EVENT_TIMEOUT, is_ready).await.unwrap();

    server.close(1006).await;
    let mut second = connector.accept().await;
    assert!(!gateway.is_ready());
    second.handshake().await;
    second.send(&fixtures::empty_ready()).await;

    wait_for(&mut events, EVENT_TIMEOUT, is_ready).await.unwrap();
    assert!(gateway.is_ready());
}

// ============================================================================
// Destroy and close
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_destroy_user_initiated_never_reconnects() {
    let connector = MockConnector::new();
    let (gateway, mut server) = connected(&connector, options()).await;

    gateway.destroy(true).await.unwrap();

    assert_eq!(gateway.state(), ConnectionState::Destroyed);
    assert!(server.recv().await.is_none());
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(connector.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_destroy_cancels_pending_reconnect() {
    let connector = MockConnector::new();
    connector.refuse(u32::MAX);
    let gateway = spawn_gateway(&connector, options());

    let connecting = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.connect().await }
    });
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(gateway.state(), ConnectionState::Reconnecting);

    gateway.destroy(true).await.unwrap();

    assert_eq!(connecting.await.unwrap(), Err(GatewayError::Destroyed));
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(connector.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_destroy_not_user_initiated_reconnects_after_one_second() {
    let connector = MockConnector::new();
    let (gateway, _server) = connected(&connector, options()).await;

    let start = Instant::now();
    gateway.destroy(false).await.unwrap();
    assert_eq!(gateway.state(), ConnectionState::Reconnecting);

    tokio::time::sleep(Duration::from_millis(999)).await;
    assert_eq!(connector.attempts(), 1);

    let mut second = connector.accept().await;
    assert_eq!(start.elapsed(), Duration::from_secs(1));
    second.handshake().await;

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(connector.attempts(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_server_close_schedules_reconnect() {
    let connector = MockConnector::new();
    let (gateway, server) = connected(&connector, options()).await;

    let start = Instant::now();
    server.close(1006).await;
    let mut second = connector.accept().await;
    second.expect("Authenticate").await;

    assert_eq!(start.elapsed(), Duration::from_secs(1));
    assert_eq!(gateway.state(), ConnectionState::Authenticating);
}

#[tokio::test(start_paused = true)]
async fn test_close_without_auto_reconnect_rejects_connect() {
    let connector = MockConnector::new();
    let gateway = spawn_gateway(&connector, options().with_auto_reconnect(false));

    let connecting = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.connect().await }
    });
    let server = connector.accept().await;
    server.close(4000).await;

    assert_eq!(connecting.await.unwrap(), Err(GatewayError::ConnectionClosed));
    assert_eq!(gateway.state(), ConnectionState::Disconnected);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(connector.attempts(), 1);
}

// ============================================================================
// Sending
// ============================================================================

fn typing() -> ClientPacket {
    ClientPacket::BeginTyping {
        channel: "01CHANNEL".to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_try_send_requires_connected() {
    let connector = MockConnector::new();
    let gateway = spawn_gateway(&connector, options());

    assert_eq!(gateway.try_send(typing()).await, Err(GatewayError::SocketNotOpen));
    assert_eq!(connector.attempts(), 0);

    let connecting = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.connect().await }
    });
    let mut server = connector.accept().await;
    server.expect("Authenticate").await;

    assert_eq!(gateway.try_send(typing()).await, Err(GatewayError::SocketNotOpen));
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(server.drain().is_empty());

    server.send(&fixtures::authenticated()).await;
    connecting.await.unwrap().unwrap();

    gateway.try_send(typing()).await.unwrap();
    let packet = server.expect("BeginTyping").await;
    assert_eq!(packet["channel"], "01CHANNEL");
}

#[tokio::test(start_paused = true)]
async fn test_send_waits_for_connection() {
    let connector = MockConnector::new();
    let gateway = spawn_gateway(&connector, options());

    let connecting = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.connect().await }
    });
    let mut server = connector.accept().await;

    let sending = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.end_typing("01CHANNEL").await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!sending.is_finished());

    server.handshake().await;
    connecting.await.unwrap().unwrap();

    sending.await.unwrap().unwrap();
    server.expect("EndTyping").await;
}

#[tokio::test(start_paused = true)]
async fn test_send_when_disconnected_fails() {
    let connector = MockConnector::new();
    let gateway = spawn_gateway(&connector, options());

    assert_eq!(gateway.begin_typing("01CHANNEL").await, Err(GatewayError::SocketNotOpen));
}

// ============================================================================
// Dispatch
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_malformed_frame_is_reported_and_ignored() {
    let connector = MockConnector::new();
    let (gateway, server) = connected(&connector, options()).await;
    let mut events = gateway.subscribe();

    server.send_text("{definitely not json").await;
    let event = wait_for(&mut events, EVENT_TIMEOUT, not_state).await.unwrap();
    assert!(matches!(event, ClientEvent::Error(GatewayError::Protocol(_))));

    server
        .send(&json!({"type": "MessageDelete", "channel": "01CHANNEL"}))
        .await;
    let event = wait_for(&mut events, EVENT_TIMEOUT, not_state).await.unwrap();
    assert!(matches!(event, ClientEvent::Error(GatewayError::Protocol(_))));

    server
        .send(&fixtures::message_packet("01MSG", "01CHANNEL", "01PEER", "still here"))
        .await;
    let event = wait_for(&mut events, EVENT_TIMEOUT, not_state).await.unwrap();
    assert!(matches!(event, ClientEvent::Message(ref m) if m.id == "01MSG"));
    assert_eq!(gateway.state(), ConnectionState::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_bulk_children_dispatched_in_order() {
    let connector = MockConnector::new();
    let (gateway, server) = connected(&connector, options()).await;
    let mut events = gateway.subscribe();

    server
        .send(&fixtures::bulk(vec![
            fixtures::message_packet("01MSG", "01CHANNEL", "01PEER", "hello"),
            json!({"type": "MessageReact", "id": "01MSG", "channel_id": "01CHANNEL", "user_id": "01SELF", "emoji_id": "👍"}),
            json!({"type": "MessageDelete", "id": "01MSG", "channel": "01CHANNEL"}),
        ]))
        .await;

    let first = wait_for(&mut events, EVENT_TIMEOUT, not_state).await.unwrap();
    let second = wait_for(&mut events, EVENT_TIMEOUT, not_state).await.unwrap();
    let third = wait_for(&mut events, EVENT_TIMEOUT, not_state).await.unwrap();

    assert_eq!(first.name(), "message");
    assert_eq!(second.name(), "message_react");
    assert_eq!(third.name(), "message_delete");
    assert!(!gateway.cache().messages().contains("01MSG"));
}

#[tokio::test(start_paused = true)]
async fn test_unknown_packet_types_are_dropped() {
    let connector = MockConnector::new();
    let (gateway, server) = connected(&connector, options()).await;
    let mut events = gateway.subscribe();

    server.send(&json!({"type": "SomethingFromTheFuture", "x": 1})).await;
    server
        .send(&json!({"type": "ChannelStartTyping", "id": "01CHANNEL", "user": "01PEER"}))
        .await;

    let event = wait_for(&mut events, EVENT_TIMEOUT, not_state).await.unwrap();
    assert_eq!(event.name(), "channel_start_typing");
}

#[tokio::test(start_paused = true)]
async fn test_error_packet_keeps_socket_open() {
    let connector = MockConnector::new();
    let (gateway, server) = connected(&connector, options()).await;
    let mut events = gateway.subscribe();

    server
        .send(&json!({"type": "Error", "error": "InternalError"}))
        .await;
    let event = wait_for(&mut events, EVENT_TIMEOUT, not_state).await.unwrap();

    assert!(matches!(
        event,
        ClientEvent::Error(GatewayError::Server(ref message)) if message == "InternalError"
    ));
    assert_eq!(gateway.state(), ConnectionState::Connected);
    assert_eq!(connector.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_updates_flow_into_cache() {
    let connector = MockConnector::new();
    let (gateway, server) = connected(&connector, options()).await;
    let mut events = gateway.subscribe();

    server
        .send(&fixtures::ready("01SELF", "01SERVER", "01CHANNEL"))
        .await;
    wait_for(&mut events, EVENT_TIMEOUT, is_ready).await.unwrap();

    server
        .send(&json!({"type": "ChannelUpdate", "id": "01CHANNEL", "data": {"name": "renamed"}}))
        .await;
    let event = wait_for(&mut events, EVENT_TIMEOUT, not_state).await.unwrap();
    assert_eq!(event.name(), "channel_update");
    assert_eq!(
        gateway.cache().channels().get("01CHANNEL").unwrap().name(),
        Some("renamed")
    );

    server
        .send(&json!({"type": "ServerDelete", "id": "01SERVER"}))
        .await;
    wait_for(&mut events, EVENT_TIMEOUT, not_state).await.unwrap();
    assert!(!gateway.cache().channels().contains("01CHANNEL"));
}
