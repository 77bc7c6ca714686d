//! WebSocket message types for real-time game events.

use serde::{Deserialize, Serialize};

use crate::api::models::SquareDto;
use crate::engine::game::{Game, MoveOutcome};
use crate::engine::types::GameStatus;

// ---------------------------------------------------------------------------
// Server → Client events
// ---------------------------------------------------------------------------

/// Envelope sent from server to every subscribed WebSocket client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WsEvent {
    /// Discriminator so clients can switch on event type.
    #[serde(rename = "type")]
    pub event_type: WsEventType,
    /// Event-specific payload.
    #[serde(flatten)]
    pub payload: WsPayload,
}

/// Event type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WsEventType {
    GameState,
    MoveMade,
    GameOver,
    Error,
    Pong,
    Subscribed,
}

/// Event payload variants.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum WsPayload {
    GameState(GameStatePayload),
    MoveMade(MoveMadePayload),
    GameOver(GameOverPayload),
    Error(ErrorPayload),
    Pong(PongPayload),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatePayload {
    pub game_id: String,
    pub placement: String,
    pub status: String,
    pub current_player: String,
    pub check: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveMadePayload {
    pub game_id: String,
    pub piece: String,
    pub player: String,
    pub from: SquareDto,
    pub to: SquareDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured: Option<String>,
    pub placement: String,
    pub status: String,
    pub check: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOverPayload {
    pub game_id: String,
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    pub message: String,
    pub placement: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PongPayload {
    pub timestamp: u64,
}

// ---------------------------------------------------------------------------
// Client → Server commands
// ---------------------------------------------------------------------------

/// Commands sent from client to server over WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsCommand {
    Subscribe { game_id: String },
    Unsubscribe { game_id: String },
    Ping,
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

fn is_check(status: GameStatus) -> bool {
    matches!(status, GameStatus::Check | GameStatus::Checkmate)
}

fn state_payload(game: &Game) -> GameStatePayload {
    GameStatePayload {
        game_id: game.id.clone(),
        placement: game.board().to_placement(),
        status: game.status().as_str().to_string(),
        current_player: game.current_player().as_str().to_string(),
        check: is_check(game.status()),
    }
}

impl WsEvent {
    pub fn game_state(game: &Game) -> Self {
        WsEvent {
            event_type: WsEventType::GameState,
            payload: WsPayload::GameState(state_payload(game)),
        }
    }

    /// Event for `mv`, taken from `game` after the move was applied.
    pub fn move_made(game: &Game, mv: &MoveOutcome) -> Self {
        WsEvent {
            event_type: WsEventType::MoveMade,
            payload: WsPayload::MoveMade(MoveMadePayload {
                game_id: game.id.clone(),
                piece: mv.piece.kind.as_str().to_string(),
                player: mv.piece.color.as_str().to_string(),
                from: mv.from.into(),
                to: mv.to.into(),
                captured: mv.captured.map(|p| p.kind.as_str().to_string()),
                placement: game.board().to_placement(),
                status: mv.status.as_str().to_string(),
                check: is_check(mv.status),
            }),
        }
    }

    pub fn game_over(game: &Game) -> Self {
        WsEvent {
            event_type: WsEventType::GameOver,
            payload: WsPayload::GameOver(GameOverPayload {
                game_id: game.id.clone(),
                result: game.status().as_str().to_string(),
                winner: game.winner().map(|c| c.as_str().to_string()),
                message: game.message(),
                placement: game.board().to_placement(),
            }),
        }
    }

    pub fn error(message: &str) -> Self {
        WsEvent {
            event_type: WsEventType::Error,
            payload: WsPayload::Error(ErrorPayload {
                message: message.to_string(),
            }),
        }
    }

    pub fn pong() -> Self {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        WsEvent {
            event_type: WsEventType::Pong,
            payload: WsPayload::Pong(PongPayload { timestamp: ts }),
        }
    }

    /// Sent once on connect (and on `subscribe`) with the current state.
    pub fn subscribed(game: &Game) -> Self {
        WsEvent {
            event_type: WsEventType::Subscribed,
            payload: WsPayload::GameState(state_payload(game)),
        }
    }

    /// Serialize to JSON text for sending over WebSocket.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"type":"error","message":"serialization failed"}"#.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
