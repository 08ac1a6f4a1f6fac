//! Seat-click protocol and change events over a live WebSocket.

#![allow(clippy::panic, clippy::indexing_slicing)]

mod common;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use homegame_gateway::config::AccessMode;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(addr: std::net::SocketAddr) -> Socket {
    let Ok((socket, _)) = connect_async(format!("ws://{addr}/ws")).await else {
        panic!("ws handshake failed");
    };
    socket
}

async fn send(socket: &mut Socket, id: &str, payload: Value) {
    let envelope = json!({
        "id": id,
        "type": "command",
        "timestamp": "2026-10-17T20:00:00Z",
        "payload": payload,
    });
    let Ok(()) = socket.send(Message::text(envelope.to_string())).await else {
        panic!("ws send failed");
    };
}

/// Reads frames until one satisfies `pred`, skipping unrelated events.
async fn next_matching(socket: &mut Socket, pred: impl Fn(&Value) -> bool) -> Value {
    let wait = async {
        while let Some(frame) = socket.next().await {
            let Ok(Message::Text(text)) = frame else {
                continue;
            };
            let Ok(value) = serde_json::from_str::<Value>(&text) else {
                continue;
            };
            if pred(&value) {
                return value;
            }
        }
        panic!("socket closed before the expected frame");
    };
    let Ok(value) = tokio::time::timeout(Duration::from_secs(5), wait).await else {
        panic!("timed out waiting for frame");
    };
    value
}

async fn reply(socket: &mut Socket, id: &str) -> Value {
    next_matching(socket, |v| v["id"] == id).await
}

async fn buy_in(addr: std::net::SocketAddr, name: &str) -> i64 {
    let client = reqwest::Client::new();
    let Ok(response) = client
        .post(format!("http://{addr}/api/v1/players"))
        .json(&json!({"name": name, "buy_in": 10.0}))
        .send()
        .await
    else {
        panic!("buy-in request failed");
    };
    let Ok(body) = response.json::<Value>().await else {
        panic!("buy-in response is not JSON");
    };
    let Some(id) = body["player"]["player_id"].as_i64() else {
        panic!("player id missing: {body}");
    };
    id
}

#[tokio::test]
async fn select_then_click_other_seat_swaps() {
    let addr = common::spawn_server(AccessMode::Open, &[]).await;
    let alice = buy_in(addr, "Alice").await;
    let bob = buy_in(addr, "Bob").await;

    let mut ws = connect(addr).await;
    send(&mut ws, "s1", json!({"command": "subscribe", "collections": ["seats"]})).await;
    let subscribed = reply(&mut ws, "s1").await;
    assert_eq!(subscribed["type"], "response");
    assert_eq!(subscribed["payload"]["subscribed"], json!(["seats"]));

    send(&mut ws, "c1", json!({"command": "seat_click", "seat": 1})).await;
    let selected = reply(&mut ws, "c1").await;
    assert_eq!(selected["payload"]["action"], "select");
    assert_eq!(selected["payload"]["selected"], alice);

    send(&mut ws, "c2", json!({"command": "seat_click", "seat": 2})).await;
    let swapped = reply(&mut ws, "c2").await;
    assert_eq!(swapped["payload"]["action"], "swap");
    assert_eq!(swapped["payload"]["player_id"], alice);
    assert_eq!(swapped["payload"]["other_player_id"], bob);

    let event = next_matching(&mut ws, |v| {
        v["type"] == "event"
            && v["payload"]["collection"] == "seats"
            && v["payload"]["id"] == alice
    })
    .await;
    assert_eq!(event["payload"]["event_type"], "row_changed");
    assert_eq!(event["payload"]["row"]["seat"], 2);
}

#[tokio::test]
async fn empty_seat_click_moves_selection() {
    let addr = common::spawn_server(AccessMode::Open, &[]).await;
    let alice = buy_in(addr, "Alice").await;

    let mut ws = connect(addr).await;
    send(&mut ws, "c1", json!({"command": "seat_click", "seat": 1})).await;
    assert_eq!(reply(&mut ws, "c1").await["payload"]["action"], "select");
    send(&mut ws, "c2", json!({"command": "seat_click", "seat": 9})).await;
    let moved = reply(&mut ws, "c2").await;
    assert_eq!(moved["payload"]["action"], "move");
    assert_eq!(moved["payload"]["player_id"], alice);
    assert_eq!(moved["payload"]["seat"], 9);
}

#[tokio::test]
async fn owner_policy_refuses_strangers() {
    let addr = common::spawn_server(AccessMode::OwnerOrAdmin, &["host"]).await;
    buy_in(addr, "Alice").await;

    let mut ws = connect(addr).await;
    send(
        &mut ws,
        "h1",
        json!({"command": "hello", "client_key": "k-1", "username": "mallory"}),
    )
    .await;
    let hello = reply(&mut ws, "h1").await;
    assert_eq!(hello["payload"]["online"], 1);
    assert_eq!(hello["payload"]["is_admin"], false);

    send(&mut ws, "c1", json!({"command": "seat_click", "seat": 1})).await;
    let refused = reply(&mut ws, "c1").await;
    assert_eq!(refused["type"], "error");
    assert_eq!(refused["payload"]["code"], 403);
}

#[tokio::test]
async fn unknown_command_is_an_error() {
    let addr = common::spawn_server(AccessMode::Open, &[]).await;
    let mut ws = connect(addr).await;
    send(&mut ws, "x1", json!({"command": "teleport"})).await;
    let error = reply(&mut ws, "x1").await;
    assert_eq!(error["type"], "error");
    assert_eq!(error["payload"]["code"], 404);
}
