use darklist_core::{
    ApiConfig, RemoteError, RemoteSession, SubscriptionEvent, SubscriptionFeed, UiEvent,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

type ServerSocket = WebSocketStream<TcpStream>;

async fn bind_server() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, format!("ws://{addr}"))
}

async fn accept(listener: TcpListener) -> ServerSocket {
    let (stream, _) = listener.accept().await.unwrap();
    tokio_tungstenite::accept_async(stream).await.unwrap()
}

async fn read_json(socket: &mut ServerSocket) -> Value {
    loop {
        match socket.next().await.unwrap().unwrap() {
            Message::Text(text) => return serde_json::from_str(&text).unwrap(),
            _ => continue,
        }
    }
}

async fn send_json(socket: &mut ServerSocket, value: Value) {
    socket.send(Message::Text(value.to_string())).await.unwrap();
}

/// Accepts one client and walks it through init/ack/subscribe, asserting the
/// handshake shape on the way.
async fn handshake(listener: TcpListener) -> ServerSocket {
    let mut socket = accept(listener).await;

    let init = read_json(&mut socket).await;
    assert_eq!(init["type"], "connection_init");
    assert_eq!(init["payload"]["x-api-key"], "test-key");
    send_json(&mut socket, json!({ "type": "connection_ack" })).await;

    let subscribe = read_json(&mut socket).await;
    assert_eq!(subscribe["type"], "subscribe");
    assert!(subscribe["payload"]["query"]
        .as_str()
        .unwrap()
        .contains("onCreateApp"));

    socket
}

fn feed_config(url: &str) -> ApiConfig {
    ApiConfig::new(
        "http://127.0.0.1:9/graphql",
        Some(url.to_string()),
        "local",
        "test-key",
    )
    .unwrap()
}

fn push_message(id: &str, name: &str, link: &str) -> Value {
    json!({
        "type": "next",
        "id": "1",
        "payload": { "data": { "onCreateApp": { "id": id, "name": name, "link": link } } }
    })
}

#[tokio::test]
async fn feed_completes_handshake_and_delivers_push() {
    let (listener, url) = bind_server().await;
    let server = tokio::spawn(async move {
        let mut socket = handshake(listener).await;
        send_json(&mut socket, push_message("a", "Lyft", "https://lyft.com")).await;
        socket
    });

    let mut feed = SubscriptionFeed::connect(&feed_config(&url)).await.unwrap();
    let event = feed.next_event().await.unwrap();

    let SubscriptionEvent::Push(entry) = event else {
        panic!("expected a push event");
    };
    assert!(entry.id.is_confirmed());
    assert_eq!(entry.name, "Lyft");
    server.await.unwrap();
}

#[tokio::test]
async fn feed_answers_protocol_ping_with_pong() {
    let (listener, url) = bind_server().await;
    let server = tokio::spawn(async move {
        let mut socket = handshake(listener).await;
        send_json(&mut socket, json!({ "type": "ping" })).await;
        let pong = read_json(&mut socket).await;
        assert_eq!(pong["type"], "pong");
        send_json(&mut socket, push_message("a", "Lyft", "https://lyft.com")).await;
        socket
    });

    let mut feed = SubscriptionFeed::connect(&feed_config(&url)).await.unwrap();
    let event = feed.next_event().await.unwrap();

    assert!(matches!(event, SubscriptionEvent::Push(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn feed_surfaces_stream_error_once_and_ends() {
    let (listener, url) = bind_server().await;
    let server = tokio::spawn(async move {
        let mut socket = handshake(listener).await;
        send_json(
            &mut socket,
            json!({
                "type": "error",
                "id": "1",
                "payload": [ { "message": "unauthorized" } ]
            }),
        )
        .await;
        socket
    });

    let mut feed = SubscriptionFeed::connect(&feed_config(&url)).await.unwrap();

    assert_eq!(
        feed.next_event().await,
        Some(SubscriptionEvent::Failed("unauthorized".to_string()))
    );
    assert_eq!(feed.next_event().await, None);
    server.await.unwrap();
}

#[tokio::test]
async fn feed_reports_complete_as_closed() {
    let (listener, url) = bind_server().await;
    let server = tokio::spawn(async move {
        let mut socket = handshake(listener).await;
        send_json(&mut socket, json!({ "type": "complete", "id": "1" })).await;
        socket
    });

    let mut feed = SubscriptionFeed::connect(&feed_config(&url)).await.unwrap();
    assert_eq!(feed.next_event().await, Some(SubscriptionEvent::Closed));
    server.await.unwrap();
}

#[tokio::test]
async fn secure_endpoint_reaches_the_tls_handshake() {
    let (listener, url) = bind_server().await;
    let url = url.replacen("ws://", "wss://", 1);
    let server = tokio::spawn(async move {
        // Plain TCP peer: accept and drop without speaking TLS.
        let _ = listener.accept().await;
    });

    // The derived production endpoints are wss, so the transport must carry
    // the connect into a real TLS handshake instead of rejecting the scheme.
    let err = SubscriptionFeed::connect(&feed_config(&url))
        .await
        .err()
        .expect("a plain peer cannot complete a tls handshake");
    let message = err.to_string();
    assert!(matches!(err, RemoteError::Socket(_)), "{message}");
    assert!(!message.contains("TLS support not compiled in"), "{message}");
    server.await.unwrap();
}

#[tokio::test]
async fn connect_rejects_events_before_the_ack() {
    let (listener, url) = bind_server().await;
    let server = tokio::spawn(async move {
        let mut socket = accept(listener).await;
        let init = read_json(&mut socket).await;
        assert_eq!(init["type"], "connection_init");
        send_json(&mut socket, push_message("a", "Lyft", "https://lyft.com")).await;
        socket
    });

    let err = SubscriptionFeed::connect(&feed_config(&url))
        .await
        .err()
        .expect("connect should fail");
    assert!(err.to_string().contains("connection_ack"));
    server.await.unwrap();
}

#[tokio::test]
async fn session_pumps_pushes_into_the_store_with_dedup() {
    let (listener, url) = bind_server().await;
    let server = tokio::spawn(async move {
        let mut socket = handshake(listener).await;
        send_json(&mut socket, push_message("a", "Lyft", "https://lyft.com")).await;
        send_json(&mut socket, push_message("a", "Lyft", "https://lyft.com")).await;
        send_json(&mut socket, json!({ "type": "complete", "id": "1" })).await;
        socket
    });

    let config = feed_config(&url);
    let mut session = RemoteSession::new(&config).unwrap();
    session.apply_ui(UiEvent::ListLoaded(Vec::new())).await;
    session.connect_feed(&config).await;

    assert!(session.pump_push().await);
    assert!(session.pump_push().await);
    assert!(!session.pump_push().await);

    assert_eq!(session.store().list().len(), 1);
    assert_eq!(session.store().banner(), None);
    server.await.unwrap();
}

#[tokio::test]
async fn session_feed_failure_raises_the_banner() {
    let (listener, url) = bind_server().await;
    let server = tokio::spawn(async move {
        let mut socket = handshake(listener).await;
        send_json(
            &mut socket,
            json!({ "type": "error", "id": "1", "payload": [ { "message": "gone" } ] }),
        )
        .await;
        socket
    });

    let config = feed_config(&url);
    let mut session = RemoteSession::new(&config).unwrap();
    session.apply_ui(UiEvent::ListLoaded(Vec::new())).await;
    session.connect_feed(&config).await;

    assert!(!session.pump_push().await);
    assert!(session.store().banner().is_some());
    server.await.unwrap();
}

#[tokio::test]
async fn reconnecting_the_feed_clears_the_banner() {
    let (listener, url) = bind_server().await;
    let server = tokio::spawn(async move {
        let mut socket = handshake(listener).await;
        send_json(
            &mut socket,
            json!({ "type": "error", "id": "1", "payload": [ { "message": "gone" } ] }),
        )
        .await;
        socket
    });

    let config = feed_config(&url);
    let mut session = RemoteSession::new(&config).unwrap();
    session.apply_ui(UiEvent::ListLoaded(Vec::new())).await;
    session.connect_feed(&config).await;
    assert!(!session.pump_push().await);
    assert!(session.store().banner().is_some());
    server.await.unwrap();

    let (listener, url) = bind_server().await;
    let server = tokio::spawn(async move { handshake(listener).await });
    session.connect_feed(&feed_config(&url)).await;

    assert_eq!(session.store().banner(), None);
    server.await.unwrap();
}
