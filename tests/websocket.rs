//! Integration tests for WebSocket real-time game events.
//!
//! Spins up an actual HTTP server and connects a WS client to validate the
//! full WebSocket lifecycle: connect, subscribe, receive events, close.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use selfplay_chess::api::router::create_router;
use selfplay_chess::api::state::AppState;
use selfplay_chess::config::AppConfig;

/// Helper: start the server on an OS-assigned port, return its base URL.
async fn start_server() -> String {
    let state = AppState::new(AppConfig::default());
    let app = create_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", addr.port())
}

/// Helper: create a game via REST, return its id.
async fn create_game(base: &str) -> String {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/api/games"))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

/// Helper: connect a WS client to a game, return (write, read) streams.
async fn ws_connect(
    base: &str,
    game_id: &str,
) -> (
    futures_util::stream::SplitSink<
        tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
        Message,
    >,
    futures_util::stream::SplitStream<
        tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
    >,
) {
    let ws_url = base.replace("http://", "ws://");
    let url = format!("{ws_url}/ws/games/{game_id}");
    let (stream, _) = tokio_tungstenite::connect_async(&url).await.unwrap();
    stream.split()
}

/// Helper: read the next text message as JSON, with a timeout.
async fn next_json(
    read: &mut futures_util::stream::SplitStream<
        tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
    >,
) -> serde_json::Value {
    let msg = tokio::time::timeout(Duration::from_secs(5), read.next())
        .await
        .expect("timed out waiting for WS message")
        .expect("stream ended")
        .expect("WS error");

    match msg {
        Message::Text(text) => serde_json::from_str(&text).expect("invalid JSON"),
        other => panic!("expected Text message, got {other:?}"),
    }
}

/// Helper: POST a move through REST.
async fn post_move(base: &str, game_id: &str, from: (u8, u8), to: (u8, u8)) -> serde_json::Value {
    reqwest::Client::new()
        .post(format!("{base}/api/games/{game_id}/moves"))
        .json(&serde_json::json!({
            "from": {"row": from.0, "col": from.1},
            "to": {"row": to.0, "col": to.1},
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ws_connect_sends_subscribed_event() {
    let base = start_server().await;
    let game_id = create_game(&base).await;

    let (_write, mut read) = ws_connect(&base, &game_id).await;
    let msg = next_json(&mut read).await;

    assert_eq!(msg["type"], "subscribed");
    assert_eq!(msg["gameId"], game_id);
    assert_eq!(msg["currentPlayer"], "white");
    assert_eq!(msg["status"], "playing");
    assert!(msg["placement"].is_string());
}

#[tokio::test]
async fn ws_connect_to_nonexistent_game_sends_error() {
    let base = start_server().await;

    let (_write, mut read) = ws_connect(&base, "nonexistent-id").await;
    let msg = next_json(&mut read).await;

    assert_eq!(msg["type"], "error");
    assert!(msg["message"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn ws_receives_move_made_event() {
    let base = start_server().await;
    let game_id = create_game(&base).await;

    let (_write, mut read) = ws_connect(&base, &game_id).await;
    let _subscribed = next_json(&mut read).await;

    post_move(&base, &game_id, (6, 4), (4, 4)).await;

    let msg = next_json(&mut read).await;
    assert_eq!(msg["type"], "move_made");
    assert_eq!(msg["gameId"], game_id);
    assert_eq!(msg["piece"], "pawn");
    assert_eq!(msg["player"], "white");
    assert_eq!(msg["from"], serde_json::json!({"row": 6, "col": 4}));
    assert_eq!(msg["to"], serde_json::json!({"row": 4, "col": 4}));
    assert_eq!(msg["status"], "playing");
}

#[tokio::test]
async fn ws_receives_move_made_from_click() {
    let base = start_server().await;
    let game_id = create_game(&base).await;

    let (_write, mut read) = ws_connect(&base, &game_id).await;
    let _subscribed = next_json(&mut read).await;

    let client = reqwest::Client::new();
    for (row, col) in [(7, 1), (5, 2)] {
        client
            .post(format!("{base}/api/games/{game_id}/select"))
            .json(&serde_json::json!({"row": row, "col": col}))
            .send()
            .await
            .unwrap();
    }

    let msg = next_json(&mut read).await;
    assert_eq!(msg["type"], "move_made");
    assert_eq!(msg["piece"], "knight");
}

#[tokio::test]
async fn ws_receives_reset_game_state_event() {
    let base = start_server().await;
    let game_id = create_game(&base).await;

    let (_write, mut read) = ws_connect(&base, &game_id).await;
    let _subscribed = next_json(&mut read).await;

    post_move(&base, &game_id, (6, 4), (4, 4)).await;
    let _move_evt = next_json(&mut read).await;

    reqwest::Client::new()
        .post(format!("{base}/api/games/{game_id}/reset"))
        .send()
        .await
        .unwrap();

    let msg = next_json(&mut read).await;
    assert_eq!(msg["type"], "game_state");
    assert_eq!(msg["gameId"], game_id);
    assert_eq!(msg["currentPlayer"], "white");
    assert_eq!(msg["placement"], "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR");
}

#[tokio::test]
async fn ws_multiple_clients_receive_events() {
    let base = start_server().await;
    let game_id = create_game(&base).await;

    let (_w1, mut r1) = ws_connect(&base, &game_id).await;
    let (_w2, mut r2) = ws_connect(&base, &game_id).await;
    let _s1 = next_json(&mut r1).await;
    let _s2 = next_json(&mut r2).await;

    post_move(&base, &game_id, (6, 3), (4, 3)).await;

    let m1 = next_json(&mut r1).await;
    let m2 = next_json(&mut r2).await;
    assert_eq!(m1["type"], "move_made");
    assert_eq!(m2["type"], "move_made");
    assert_eq!(m1["placement"], m2["placement"]);
}

#[tokio::test]
async fn ws_different_games_isolated() {
    let base = start_server().await;
    let game1 = create_game(&base).await;
    let game2 = create_game(&base).await;

    let (_w1, mut r1) = ws_connect(&base, &game1).await;
    let (_w2, mut r2) = ws_connect(&base, &game2).await;
    let _s1 = next_json(&mut r1).await;
    let _s2 = next_json(&mut r2).await;

    post_move(&base, &game1, (6, 4), (4, 4)).await;

    let m1 = next_json(&mut r1).await;
    assert_eq!(m1["type"], "move_made");

    let result = tokio::time::timeout(Duration::from_millis(200), r2.next()).await;
    assert!(
        result.is_err(),
        "game2 client should not receive events from game1"
    );
}

#[tokio::test]
async fn ws_ping_command_returns_pong() {
    let base = start_server().await;
    let game_id = create_game(&base).await;

    let (mut write, mut read) = ws_connect(&base, &game_id).await;
    let _subscribed = next_json(&mut read).await;

    write
        .send(Message::Text(r#"{"type":"ping"}"#.into()))
        .await
        .unwrap();

    let msg = next_json(&mut read).await;
    assert_eq!(msg["type"], "pong");
    assert!(msg["timestamp"].is_number());
}

#[tokio::test]
async fn ws_pong_goes_only_to_sender() {
    let base = start_server().await;
    let game_id = create_game(&base).await;

    let (mut w1, mut r1) = ws_connect(&base, &game_id).await;
    let (_w2, mut r2) = ws_connect(&base, &game_id).await;
    let _s1 = next_json(&mut r1).await;
    let _s2 = next_json(&mut r2).await;

    w1.send(Message::Text(r#"{"type":"ping"}"#.into()))
        .await
        .unwrap();
    assert_eq!(next_json(&mut r1).await["type"], "pong");

    let result = tokio::time::timeout(Duration::from_millis(200), r2.next()).await;
    assert!(result.is_err(), "pong must not be broadcast");
}

#[tokio::test]
async fn ws_subscribe_command_adds_second_game() {
    let base = start_server().await;
    let game1 = create_game(&base).await;
    let game2 = create_game(&base).await;

    let (mut write, mut read) = ws_connect(&base, &game1).await;
    let _subscribed = next_json(&mut read).await;

    let cmd = serde_json::json!({"type": "subscribe", "game_id": game2});
    write
        .send(Message::Text(cmd.to_string().into()))
        .await
        .unwrap();

    let msg = next_json(&mut read).await;
    assert_eq!(msg["type"], "subscribed");
    assert_eq!(msg["gameId"], game2);

    post_move(&base, &game2, (6, 0), (5, 0)).await;
    let msg = next_json(&mut read).await;
    assert_eq!(msg["type"], "move_made");
    assert_eq!(msg["gameId"], game2);
}

#[tokio::test]
async fn ws_game_over_event_on_checkmate() {
    let base = start_server().await;
    let game_id = create_game(&base).await;

    let (_write, mut read) = ws_connect(&base, &game_id).await;
    let _subscribed = next_json(&mut read).await;

    // Fool's mate: 1. f3 e5 2. g4 Qh4#
    for (from, to) in [((6, 5), (5, 5)), ((1, 4), (3, 4)), ((6, 6), (4, 6))] {
        post_move(&base, &game_id, from, to).await;
        assert_eq!(next_json(&mut read).await["type"], "move_made");
    }
    let body = post_move(&base, &game_id, (0, 3), (4, 7)).await;
    assert_eq!(body["status"], "checkmate");

    let move_msg = next_json(&mut read).await;
    assert_eq!(move_msg["type"], "move_made");
    assert_eq!(move_msg["status"], "checkmate");
    assert_eq!(move_msg["check"], true);

    let go_msg = next_json(&mut read).await;
    assert_eq!(go_msg["type"], "game_over");
    assert_eq!(go_msg["result"], "checkmate");
    assert_eq!(go_msg["winner"], "black");
    assert_eq!(go_msg["message"], "black won");
}

#[tokio::test]
async fn ws_health_reports_games() {
    let base = start_server().await;
    create_game(&base).await;

    let resp = reqwest::Client::new()
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["games"], 1);
}

#[tokio::test]
async fn ws_delete_game_notifies_subscriber() {
    let base = start_server().await;
    let game_id = create_game(&base).await;

    let (_write, mut read) = ws_connect(&base, &game_id).await;
    let _subscribed = next_json(&mut read).await;

    let health: serde_json::Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["subscriptions"], 1);

    let resp = reqwest::Client::new()
        .delete(format!("{base}/api/games/{game_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let msg = next_json(&mut read).await;
    assert_eq!(msg["type"], "error");
    assert!(msg["message"].as_str().unwrap().contains("deleted"));

    let health: serde_json::Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["subscriptions"], 0);
}
