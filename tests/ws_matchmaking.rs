//! End-to-end matchmaking over a real socket.

#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use matchmaking_gateway::app_state::AppState;
use matchmaking_gateway::domain::{EventBus, ParticipantRegistry, Topic};
use matchmaking_gateway::persistence::{InMemoryMatchStore, MatchStore};
use matchmaking_gateway::router::build_app;
use matchmaking_gateway::service::{BackoffPolicy, Notifier, PairingCoordinator};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct TestServer {
    addr: SocketAddr,
    store: Arc<InMemoryMatchStore>,
    coordinator: Arc<PairingCoordinator>,
}

async fn spawn_server() -> TestServer {
    let store = Arc::new(InMemoryMatchStore::new());
    store
        .add_topic(
            "go",
            Topic {
                id: 2,
                name: "Joseki".to_string(),
                status: "APPROVED".to_string(),
            },
        )
        .await;

    let event_bus = EventBus::new(64);
    let coordinator = Arc::new(PairingCoordinator::new(
        Arc::new(ParticipantRegistry::new()),
        Arc::clone(&store) as Arc<dyn MatchStore>,
        Notifier::new(BackoffPolicy::new(
            Duration::from_millis(10),
            Duration::from_millis(40),
        )),
        event_bus.clone(),
    ));
    let app = build_app(AppState {
        coordinator: Arc::clone(&coordinator),
        event_bus,
    });

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("failed to bind");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    TestServer {
        addr,
        store,
        coordinator,
    }
}

async fn connect(addr: SocketAddr) -> Client {
    let Ok((client, _)) = connect_async(format!("ws://{addr}/ws")).await else {
        panic!("ws connect failed");
    };
    client
}

async fn send(client: &mut Client, text: &str) {
    if client.send(Message::text(text.to_string())).await.is_err() {
        panic!("ws send failed");
    }
}

async fn recv_json(client: &mut Client) -> serde_json::Value {
    loop {
        let Ok(Some(Ok(msg))) = tokio::time::timeout(Duration::from_secs(5), client.next()).await
        else {
            panic!("no frame received");
        };
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap_or_default();
        }
    }
}

fn field<'a>(value: &'a serde_json::Value, key: &str) -> &'a serde_json::Value {
    value.get(key).unwrap_or(&serde_json::Value::Null)
}

#[tokio::test]
async fn two_clients_are_paired_on_shared_tag() {
    let server = spawn_server().await;
    let mut a = connect(server.addr).await;
    let mut b = connect(server.addr).await;

    send(&mut a, r#"{"id":"1","tags":["chess","go"]}"#).await;
    let queued = recv_json(&mut a).await;
    assert_eq!(field(&queued, "type"), "queued");
    assert_eq!(field(&queued, "id"), "1");

    send(&mut b, r#"{"id":"2","metatags":["go","art"]}"#).await;
    assert_eq!(field(&recv_json(&mut b).await, "type"), "queued");

    let note_a = recv_json(&mut a).await;
    let note_b = recv_json(&mut b).await;

    assert_eq!(field(&note_a, "room"), field(&note_b, "room"));
    assert_eq!(field(&note_a, "startUserId"), "1");
    assert_eq!(field(&note_a, "opponent"), "2");
    assert_eq!(field(&note_b, "startUserId"), "2");
    assert_eq!(field(&note_b, "opponent"), "1");
    assert_eq!(field(&note_a, "theme"), "Joseki");

    assert_eq!(server.store.insert_calls(), 1);
    assert!(server.coordinator.registry().is_empty().await);
}

#[tokio::test]
async fn queued_ack_precedes_match_notification() {
    let server = spawn_server().await;
    for round in 0..10 {
        let waiting_id = format!("{}", 100 + round * 2);
        let joining_id = format!("{}", 101 + round * 2);
        let mut waiting = connect(server.addr).await;
        let mut joining = connect(server.addr).await;

        send(&mut waiting, &format!(r#"{{"id":"{waiting_id}","tags":["go"]}}"#)).await;
        assert_eq!(field(&recv_json(&mut waiting).await, "type"), "queued");

        send(&mut joining, &format!(r#"{{"id":"{joining_id}","tags":["go"]}}"#)).await;
        let first = recv_json(&mut joining).await;
        assert_eq!(field(&first, "type"), "queued");
        assert_eq!(field(&first, "id"), joining_id.as_str());

        let note = recv_json(&mut joining).await;
        assert_eq!(field(&note, "opponent"), waiting_id.as_str());
        let note = recv_json(&mut waiting).await;
        assert_eq!(field(&note, "opponent"), joining_id.as_str());
    }
}

#[tokio::test]
async fn malformed_frame_is_rejected_without_closing() {
    let server = spawn_server().await;
    let mut client = connect(server.addr).await;

    send(&mut client, "definitely not json").await;
    let error = recv_json(&mut client).await;
    assert_eq!(field(&error, "type"), "error");
    assert_eq!(field(&error, "code"), 1001);

    send(&mut client, r#"{"id":"5","tags":["go"]}"#).await;
    assert_eq!(field(&recv_json(&mut client).await, "type"), "queued");
}

#[tokio::test]
async fn closed_connection_leaves_the_queue() {
    let server = spawn_server().await;
    let mut client = connect(server.addr).await;
    send(&mut client, r#"{"id":"9","tags":["go"]}"#).await;
    assert_eq!(field(&recv_json(&mut client).await, "type"), "queued");

    let queue_url = format!("http://{}/api/v1/queue", server.addr);
    let Ok(response) = reqwest::get(&queue_url).await else {
        panic!("queue request failed");
    };
    let queue: serde_json::Value = response.json().await.unwrap_or_default();
    assert_eq!(field(&queue, "waiting"), 1);

    let _ = client.close(None).await;
    drop(client);

    let mut empty = false;
    for _ in 0..100 {
        if server.coordinator.registry().is_empty().await {
            empty = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(empty, "participant still waiting after disconnect");
}

#[tokio::test]
async fn waiting_participant_lookup() {
    let server = spawn_server().await;
    let mut client = connect(server.addr).await;
    send(&mut client, r#"{"id":"11","tags":["go","chess"]}"#).await;
    assert_eq!(field(&recv_json(&mut client).await, "type"), "queued");

    let Ok(found) = reqwest::get(format!("http://{}/api/v1/queue/11", server.addr)).await else {
        panic!("lookup request failed");
    };
    assert!(found.status().is_success());
    let body: serde_json::Value = found.json().await.unwrap_or_default();
    assert_eq!(field(&body, "id"), "11");
    assert_eq!(field(&body, "tags"), &serde_json::json!(["go", "chess"]));

    let Ok(missing) = reqwest::get(format!("http://{}/api/v1/queue/12", server.addr)).await else {
        panic!("lookup request failed");
    };
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
    let body: serde_json::Value = missing.json().await.unwrap_or_default();
    let code = body.get("error").and_then(|e| e.get("code"));
    assert_eq!(code, Some(&serde_json::json!(2001)));
}

#[tokio::test]
async fn health_reports_version() {
    let server = spawn_server().await;
    let Ok(response) = reqwest::get(format!("http://{}/health", server.addr)).await else {
        panic!("health request failed");
    };
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap_or_default();
    assert_eq!(field(&body, "status"), "healthy");
    assert_eq!(field(&body, "version"), env!("CARGO_PKG_VERSION"));
    assert_eq!(field(&body, "waiting"), 0);
}
