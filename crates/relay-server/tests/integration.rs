//! End-to-end tests against a real listener, using a WebSocket client for
//! live clients and reqwest for the REST surface.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use relay_server::config::ServerConfig;
use relay_server::server::RelayServer;

const TIMEOUT: Duration = Duration::from_secs(5);
const QUIET: Duration = Duration::from_millis(300);

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

struct TestServer {
    base: String,
    ws_base: String,
    http: reqwest::Client,
    server: RelayServer,
}

/// Boot a server on an auto-assigned port.
async fn boot_server() -> TestServer {
    let config = ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        ..ServerConfig::default()
    };
    let server = RelayServer::in_memory(config, None);
    let (addr, _handle) = server.listen().await.unwrap();
    TestServer {
        base: format!("http://{addr}"),
        ws_base: format!("ws://{addr}/ws"),
        http: reqwest::Client::new(),
        server,
    }
}

impl TestServer {
    async fn connect(&self, client_type: &str, client_id: &str) -> WsStream {
        let url = format!("{}/{client_type}/{client_id}", self.ws_base);
        let (ws, _) = timeout(TIMEOUT, connect_async(url))
            .await
            .expect("connect timed out")
            .expect("connect failed");
        ws
    }

    /// Connect and round-trip a ping, so the session is registered before
    /// the test routes anything to it.
    async fn connect_registered(&self, client_type: &str, client_id: &str) -> WsStream {
        let mut ws = self.connect(client_type, client_id).await;
        ping(&mut ws).await;
        ws
    }

    async fn create_officer(&self, name: &str) -> String {
        let body: Value = self
            .http
            .post(format!("{}/api/officers", self.base))
            .json(&json!({ "name": name }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        body["id"].as_str().unwrap().to_owned()
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self
            .http
            .get(format!("{}{path}", self.base))
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .http
            .post(format!("{}{path}", self.base))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn put(&self, path: &str) -> (u16, Value) {
        let resp = self
            .http
            .put(format!("{}{path}", self.base))
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }
}

/// Read the next JSON text frame.
async fn read_json(ws: &mut WsStream) -> Value {
    loop {
        let msg = timeout(TIMEOUT, ws.next())
            .await
            .expect("read timed out")
            .expect("stream ended")
            .expect("read error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Assert nothing arrives for a short while.
async fn assert_silent(ws: &mut WsStream) {
    if let Ok(Some(Ok(Message::Text(text)))) = timeout(QUIET, ws.next()).await {
        panic!("unexpected frame: {}", text.as_str());
    }
}

async fn send_json(ws: &mut WsStream, value: Value) {
    ws.send(Message::Text(value.to_string().into())).await.unwrap();
}

async fn ping(ws: &mut WsStream) {
    send_json(ws, json!({ "type": "ping" })).await;
    assert_eq!(read_json(ws).await, json!({ "type": "pong" }));
}

#[tokio::test]
async fn ping_gets_pong() {
    let srv = boot_server().await;
    let mut ws = srv.connect("dispatch", "desk1").await;
    ping(&mut ws).await;
    ping(&mut ws).await;
}

#[tokio::test]
async fn binary_ping_gets_pong() {
    let srv = boot_server().await;
    let mut ws = srv.connect("officer", "o1").await;
    ws.send(Message::Binary(br#"{"type":"ping"}"#.to_vec().into()))
        .await
        .unwrap();
    assert_eq!(read_json(&mut ws).await["type"], "pong");
}

#[tokio::test]
async fn message_reaches_officer_device() {
    let srv = boot_server().await;
    let officer_id = srv.create_officer("Ana Reyes").await;
    let mut device = srv.connect_registered("officer", &officer_id).await;

    let (status, ack) = srv
        .post(
            "/api/messages/send",
            json!({ "officer_id": officer_id, "content": "Report your position" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(ack["status"], "sent");

    let frame = read_json(&mut device).await;
    assert_eq!(frame["type"], "message_received");
    assert_eq!(frame["data"]["content"], "Report your position");
    assert_eq!(frame["data"]["id"], ack["message_id"]);
    assert_eq!(frame["data"]["from_dispatch"], true);
    assert!(frame["timestamp"].is_string());
    assert_silent(&mut device).await;

    let (_, convo) = srv.get(&format!("/api/messages/officer/{officer_id}")).await;
    assert_eq!(convo["messages"][0]["read"], false);
}

#[tokio::test]
async fn officer_response_reaches_every_dispatch_console() {
    let srv = boot_server().await;
    let officer_id = srv.create_officer("Ana Reyes").await;
    let mut desk1 = srv.connect_registered("dispatch", "desk1").await;
    let mut desk2 = srv.connect_registered("dispatch", "desk2").await;

    let (_, ack) = srv
        .post(
            "/api/messages/send",
            json!({ "officer_id": officer_id, "content": "Status?" }),
        )
        .await;
    let message_id = ack["message_id"].clone();

    let (status, resp) = srv
        .post(
            "/api/messages/respond",
            json!({ "message_id": message_id, "content": "All clear" }),
        )
        .await;
    assert_eq!(status, 200);

    for desk in [&mut desk1, &mut desk2] {
        let frame = read_json(desk).await;
        assert_eq!(frame["type"], "officer_response");
        assert_eq!(frame["data"]["id"], resp["response_id"]);
        assert_eq!(frame["data"]["in_response_to"], message_id);
        assert_eq!(frame["officer"]["name"], "Ana Reyes");
        assert_silent(desk).await;
    }

    let (_, convo) = srv.get(&format!("/api/messages/officer/{officer_id}")).await;
    let messages = convo["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["read"], true);
}

#[tokio::test]
async fn rest_status_change_broadcasts_to_dispatch() {
    let srv = boot_server().await;
    let officer_id = srv.create_officer("Ana Reyes").await;
    let (_, before) = srv.get(&format!("/api/officers/{officer_id}")).await;
    let mut desk = srv.connect_registered("dispatch", "desk1").await;

    let (status, updated) = srv
        .put(&format!("/api/officers/{officer_id}/status?status=emergency"))
        .await;
    assert_eq!(status, 200);
    assert_eq!(updated["status"], "emergency");

    let frame = read_json(&mut desk).await;
    assert_eq!(frame["type"], "status_update");
    assert_eq!(frame["officer_id"], officer_id.as_str());
    assert_eq!(frame["status"], "emergency");
    assert_eq!(frame["officer"]["status"], "emergency");

    let (_, after) = srv.get(&format!("/api/officers/{officer_id}")).await;
    assert_eq!(after["status"], "emergency");
    let seen_before = before["last_seen"].as_str().unwrap();
    let seen_after = after["last_seen"].as_str().unwrap();
    let parse = |s: &str| chrono::DateTime::parse_from_rfc3339(s).unwrap();
    assert!(parse(seen_after) >= parse(seen_before));
}

#[tokio::test]
async fn officer_socket_status_update_broadcasts() {
    let srv = boot_server().await;
    let officer_id = srv.create_officer("Ana Reyes").await;
    let mut desk = srv.connect_registered("dispatch", "desk1").await;
    let mut device = srv.connect_registered("officer", &officer_id).await;

    send_json(
        &mut device,
        json!({ "type": "status_update", "status": "elevated_vitals" }),
    )
    .await;

    let frame = read_json(&mut desk).await;
    assert_eq!(frame["type"], "status_update");
    assert_eq!(frame["status"], "elevated_vitals");
    assert_silent(&mut device).await;

    let (_, officer) = srv.get(&format!("/api/officers/{officer_id}")).await;
    assert_eq!(officer["status"], "elevated_vitals");
}

#[tokio::test]
async fn dispatch_and_officer_ids_are_namespaced() {
    let srv = boot_server().await;
    let officer_id = srv.create_officer("Ana Reyes").await;
    let mut device = srv.connect_registered("officer", &officer_id).await;
    let mut desk_a = srv.connect_registered("dispatch", &officer_id).await;
    let mut desk_b = srv.connect_registered("dispatch", "desk2").await;

    let (_, health) = srv.get("/healthz").await;
    assert_eq!(health["connections"], 3);
    assert_eq!(health["officers_online"], 1);
    assert_eq!(health["dispatch_consoles"], 2);

    let _ = srv
        .put(&format!("/api/officers/{officer_id}/status?status=emergency"))
        .await;
    assert_eq!(read_json(&mut desk_a).await["type"], "status_update");
    assert_eq!(read_json(&mut desk_b).await["type"], "status_update");
    assert_silent(&mut device).await;

    let _ = srv
        .post(
            "/api/messages/send",
            json!({ "officer_id": officer_id, "content": "only for the device" }),
        )
        .await;
    assert_eq!(read_json(&mut device).await["type"], "message_received");
    assert_silent(&mut desk_a).await;
}

#[tokio::test]
async fn duplicate_dispatch_id_keeps_latest_console() {
    let srv = boot_server().await;
    let officer_id = srv.create_officer("Ana Reyes").await;
    let mut device = srv.connect_registered("officer", "desk").await;
    let mut stale = srv.connect_registered("dispatch", "desk").await;
    let mut latest = srv.connect_registered("dispatch", "desk").await;

    let (_, health) = srv.get("/healthz").await;
    assert_eq!(health["dispatch_consoles"], 1);
    assert_eq!(health["officers_online"], 1);

    let _ = srv
        .put(&format!("/api/officers/{officer_id}/status?status=emergency"))
        .await;
    let frame = read_json(&mut latest).await;
    assert_eq!(frame["type"], "status_update");
    assert_eq!(frame["officer_id"], officer_id.as_str());
    assert_silent(&mut latest).await;
    assert_silent(&mut stale).await;
    assert_silent(&mut device).await;
}

#[tokio::test]
async fn malformed_frames_keep_connection_open() {
    let srv = boot_server().await;
    let mut ws = srv.connect("officer", "o1").await;
    ws.send(Message::Text("{not json".into())).await.unwrap();
    ws.send(Message::Text("[1,2,3]".into())).await.unwrap();
    send_json(&mut ws, json!({ "type": "subscribe" })).await;
    send_json(&mut ws, json!({ "type": "status_update", "status": "asleep" })).await;
    ping(&mut ws).await;
}

#[tokio::test]
async fn disconnect_releases_registry_entry() {
    let srv = boot_server().await;
    let mut ws = srv.connect_registered("dispatch", "desk1").await;
    assert_eq!(srv.server.service().registry().len(), 1);

    ws.close(None).await.unwrap();
    drop(ws);

    let registry = srv.server.service().registry().clone();
    timeout(TIMEOUT, async move {
        while !registry.is_empty() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("entry was not released");
}

#[tokio::test]
async fn reconnect_replaces_previous_connection() {
    let srv = boot_server().await;
    let officer_id = srv.create_officer("Ana Reyes").await;
    let mut first = srv.connect_registered("officer", &officer_id).await;
    let mut second = srv.connect_registered("officer", &officer_id).await;
    assert_eq!(srv.server.service().registry().len(), 1);

    let _ = srv
        .post(
            "/api/messages/send",
            json!({ "officer_id": officer_id, "content": "hello" }),
        )
        .await;
    assert_eq!(read_json(&mut second).await["data"]["content"], "hello");
    assert_silent(&mut first).await;

    first.close(None).await.unwrap();
    drop(first);
    tokio::time::sleep(QUIET).await;
    ping(&mut second).await;
    assert_eq!(srv.server.service().registry().len(), 1);
}

#[tokio::test]
async fn unknown_client_type_is_rejected() {
    let srv = boot_server().await;
    let url = format!("{}/admin/root", srv.ws_base);
    assert!(connect_async(url).await.is_err());
}

#[tokio::test]
async fn rest_not_found_details() {
    let srv = boot_server().await;

    let (status, body) = srv.get("/api/officers/ghost").await;
    assert_eq!(status, 404);
    assert_eq!(body["detail"], "Officer not found");

    let (status, body) = srv
        .post(
            "/api/messages/respond",
            json!({ "message_id": "missing", "content": "x" }),
        )
        .await;
    assert_eq!(status, 404);
    assert_eq!(body["detail"], "Message not found");

    let (status, _) = srv.put("/api/officers/ghost/status?status=normal").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn graceful_shutdown_stops_listener() {
    let config = ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        ..ServerConfig::default()
    };
    let server = RelayServer::in_memory(config, None);
    let (addr, handle) = server.listen().await.unwrap();

    let resp = reqwest::get(format!("http://{addr}/healthz")).await.unwrap();
    assert!(resp.status().is_success());

    assert!(
        server
            .shutdown()
            .graceful_shutdown(vec![handle], Some(TIMEOUT))
            .await
    );
    assert!(reqwest::get(format!("http://{addr}/healthz")).await.is_err());
}
