//! WebSocket upgrade handler. Connects a client to a game's live event
//! stream through the `WsManager`.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info};

use crate::api::state::SharedState;

use super::manager::{ClientId, ClientSender};
use super::messages::{WsCommand, WsEvent};

/// GET /ws/games/{id}: upgrade to WebSocket.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(id): Path<String>,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, id, state))
}

async fn handle_socket(socket: WebSocket, game_id: String, state: SharedState) {
    // Snapshot and registration share one read lock. Moves broadcast under
    // the write lock, so nothing falls between the two.
    let games = state.games.read().await;
    let Some(initial_event) = games.get(&game_id).map(WsEvent::subscribed) else {
        drop(games);
        let (mut sink, _) = socket.split();
        let err = WsEvent::error(&format!("game not found: {game_id}"));
        let _ = sink.send(Message::Text(err.to_json().into())).await;
        let _ = sink.close().await;
        return;
    };

    let (client_id, tx, mut rx) = state.ws.connect(&game_id).await;
    drop(games);
    info!(game_id = %game_id, client_id, "WS client connected");
    let (mut sink, mut stream) = socket.split();

    if sink
        .send(Message::Text(initial_event.to_json().into()))
        .await
        .is_err()
    {
        state.ws.disconnect(client_id).await;
        return;
    }

    // Writer: manager → socket.
    let mut writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if sink
                .send(Message::Text(event.to_json().into()))
                .await
                .is_err()
            {
                break;
            }
        }
        let _ = sink.close().await;
    });

    // Reader: client commands.
    let reader_state = state.clone();
    let mut reader = tokio::spawn(async move {
        while let Some(Ok(msg)) = stream.next().await {
            match msg {
                Message::Text(text) => {
                    handle_client_message(&reader_state, client_id, &tx, &text).await;
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut writer => { reader.abort(); }
        _ = &mut reader => { writer.abort(); }
    }

    state.ws.disconnect(client_id).await;
    info!(game_id = %game_id, client_id, "WS client disconnected");
}

/// Process a client-sent text message. Replies go to this client only.
async fn handle_client_message(
    state: &SharedState,
    client_id: ClientId,
    tx: &ClientSender,
    text: &str,
) {
    let cmd = match serde_json::from_str::<WsCommand>(text) {
        Ok(c) => c,
        Err(e) => {
            debug!(client_id, "invalid WS command: {e}");
            let _ = tx.send(WsEvent::error(&format!("invalid command: {e}")));
            return;
        }
    };

    match cmd {
        WsCommand::Ping => {
            let _ = tx.send(WsEvent::pong());
        }
        WsCommand::Subscribe { game_id } => {
            let games = state.games.read().await;
            match games.get(&game_id) {
                Some(game) => {
                    let _ = tx.send(WsEvent::subscribed(game));
                    state.ws.attach(&game_id, client_id, tx.clone()).await;
                }
                None => {
                    let _ = tx.send(WsEvent::error(&format!("game not found: {game_id}")));
                }
            }
        }
        WsCommand::Unsubscribe { game_id } => {
            state.ws.unsubscribe(&game_id, client_id).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
