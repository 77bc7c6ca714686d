use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::engine::ChessError;

/// Structured API error that serializes to JSON.
#[derive(Debug)]
pub enum ApiError {
    GameNotFound(String),
    InvalidMove(ChessError),
    InvalidPlacement(ChessError),
    InvalidRequest(String),
    GameOver(String),
    TooManyGames(usize),
    InternalError(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::GameNotFound(id) => (
                StatusCode::NOT_FOUND,
                "GAME_NOT_FOUND",
                format!("Game not found: {id}"),
            ),
            ApiError::InvalidMove(err) => {
                (StatusCode::BAD_REQUEST, "INVALID_MOVE", err.to_string())
            }
            ApiError::InvalidPlacement(err) => (
                StatusCode::BAD_REQUEST,
                "INVALID_PLACEMENT",
                err.to_string(),
            ),
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg),
            ApiError::GameOver(msg) => (StatusCode::BAD_REQUEST, "GAME_OVER", msg),
            ApiError::TooManyGames(limit) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "TOO_MANY_GAMES",
                format!("Game limit reached ({limit})"),
            ),
            ApiError::InternalError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChessError> for ApiError {
    fn from(err: ChessError) -> Self {
        match &err {
            ChessError::NoPiece(_)
            | ChessError::NotYourTurn { .. }
            | ChessError::IllegalMove { .. } => ApiError::InvalidMove(err),
            ChessError::InvalidPlacement(_)
            | ChessError::KingCount { .. }
            | ChessError::OpponentInCheck(_) => ApiError::InvalidPlacement(err),
            ChessError::InvalidSquare { .. } => ApiError::InvalidRequest(err.to_string()),
            ChessError::GameOver(_) => ApiError::GameOver(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{Color, GameStatus, Square};
    use http_body_util::BodyExt;

    async fn error_to_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = response.into_body();
        let bytes = body.collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn game_not_found_returns_404() {
        let (status, json) = error_to_json(ApiError::GameNotFound("abc".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "GAME_NOT_FOUND");
    }

    #[tokio::test]
    async fn invalid_request_returns_400() {
        let (status, json) = error_to_json(ApiError::InvalidRequest("bad input".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn too_many_games_returns_503() {
        let (status, json) = error_to_json(ApiError::TooManyGames(3)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"]["code"], "TOO_MANY_GAMES");
    }

    #[tokio::test]
    async fn internal_error_returns_500() {
        let (status, json) = error_to_json(ApiError::InternalError("oops".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn king_count_maps_to_invalid_placement() {
        let api_err: ApiError = ChessError::KingCount {
            color: Color::White,
            found: 0,
        }
        .into();
        let (status, json) = error_to_json(api_err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "INVALID_PLACEMENT");
    }

    #[tokio::test]
    async fn opponent_in_check_maps_to_invalid_placement() {
        let api_err: ApiError = ChessError::OpponentInCheck(Color::Black).into();
        let (status, json) = error_to_json(api_err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "INVALID_PLACEMENT");
    }

    #[tokio::test]
    async fn illegal_move_maps_to_invalid_move() {
        let sq = Square::new(6, 4).unwrap();
        let api_err: ApiError = ChessError::IllegalMove { from: sq, to: sq }.into();
        let (_, json) = error_to_json(api_err).await;
        assert_eq!(json["error"]["code"], "INVALID_MOVE");
    }

    #[tokio::test]
    async fn game_over_maps_to_game_over() {
        let api_err: ApiError = ChessError::GameOver(GameStatus::Checkmate).into();
        let (status, json) = error_to_json(api_err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "GAME_OVER");
        assert_eq!(json["error"]["message"], "game is already over: checkmate");
    }
}
