use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tracing::{debug, info};

use crate::engine::board::Board;
use crate::engine::game::{ClickOutcome, Game};
use crate::engine::movegen;
use crate::engine::status;
use crate::engine::types::{ChessError, Color, GameStatus, Square};
use crate::ws::WsEvent;

use super::errors::ApiError;
use super::models::*;
use super::state::SharedState;

// =========================================================================
// Health
// =========================================================================

/// GET /health
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime = state.start_time.elapsed().as_secs();
    let games = state.games.read().await.len();
    let subscriptions = state.ws.total_connections().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: "selfplay-chess".to_string(),
        uptime,
        games,
        subscriptions,
    })
}

// =========================================================================
// Create Game
// =========================================================================

/// POST /api/games
pub async fn create_game(
    State(state): State<SharedState>,
    Json(input): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameResponse>), ApiError> {
    let side = match input.current_player.as_deref() {
        Some(s) => parse_color(s)?,
        None => Color::White,
    };

    let game = match input.placement.as_deref() {
        Some(placement) => Game::from_board(Board::from_placement(placement)?, side)?,
        None if side == Color::White => Game::new(),
        None => Game::from_board(Board::starting(), side)?,
    };

    let response = game_to_response(&game);
    let id = game.id.clone();

    let mut games = state.games.write().await;
    if games.len() >= state.config.max_games {
        return Err(ApiError::TooManyGames(state.config.max_games));
    }
    games.insert(id.clone(), game);
    drop(games);

    info!(game_id = %id, status = %response.status, "game created");
    Ok((StatusCode::CREATED, Json(response)))
}

// =========================================================================
// List Games
// =========================================================================

/// GET /api/games
pub async fn list_games(
    State(state): State<SharedState>,
    Query(query): Query<ListGamesQuery>,
) -> Result<Json<ListGamesResponse>, ApiError> {
    let status_filter = match query.status.as_deref() {
        Some(s) => Some(
            GameStatus::from_str_loose(s)
                .ok_or_else(|| ApiError::InvalidRequest(format!("invalid status: {s}")))?,
        ),
        None => None,
    };

    let limit = query.limit.unwrap_or(10).min(100);
    let offset = query.offset.unwrap_or(0);

    let games = state.games.read().await;
    let mut filtered: Vec<&Game> = games.values().collect();

    if let Some(sf) = status_filter {
        filtered.retain(|g| g.status() == sf);
    }

    let total = filtered.len();

    // Newest first.
    filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let page: Vec<GameResponse> = filtered
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(game_to_response)
        .collect();

    Ok(Json(ListGamesResponse {
        games: page,
        total,
        limit,
        offset,
    }))
}

// =========================================================================
// Get Game
// =========================================================================

/// GET /api/games/:id
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let games = state.games.read().await;
    let game = games
        .get(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;
    Ok(Json(game_to_response(game)))
}

// =========================================================================
// Delete Game
// =========================================================================

/// DELETE /api/games/:id
pub async fn delete_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let mut games = state.games.write().await;
    games
        .remove(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;
    // Watchers get a final notice and are dropped before another request
    // can see the id free.
    state
        .ws
        .close_game(&id, WsEvent::error(&format!("game {id} was deleted")))
        .await;
    drop(games);

    info!(game_id = %id, "game deleted");
    Ok(Json(DeleteResponse {
        success: true,
        message: "Game deleted".to_string(),
    }))
}

// =========================================================================
// Make Move
// =========================================================================

/// POST /api/games/:id/moves
pub async fn make_move(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<MoveRequest>,
) -> Result<Json<GameResponse>, ApiError> {
    let from = to_square(input.from)?;
    let to = to_square(input.to)?;

    let mut games = state.games.write().await;
    let game = games
        .get_mut(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;

    let mv = game.make_move(from, to)?;
    let game = &*game;
    debug!(game_id = %id, %from, %to, status = %mv.status, "move applied");

    // Broadcast under the write lock so subscribers see moves in the order
    // they were applied. Sends only enqueue, nothing here waits on a client.
    state.ws.broadcast(&id, WsEvent::move_made(game, &mv)).await;
    if game.is_game_over() {
        state.ws.broadcast(&id, WsEvent::game_over(game)).await;
    }
    let response = game_to_response(game);
    drop(games);

    if mv.status.is_game_over() {
        info!(game_id = %id, result = %mv.status, "game over");
    }

    Ok(Json(response))
}

// =========================================================================
// Select Square
// =========================================================================

/// POST /api/games/:id/select
///
/// One click on the board: picks a piece up, switches or clears the
/// selection, or moves the selected piece.
pub async fn select_square(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<SquareDto>,
) -> Result<Json<SelectResponse>, ApiError> {
    let sq = to_square(input)?;

    let mut games = state.games.write().await;
    let game = games
        .get_mut(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;

    let outcome = game.select(sq)?;
    debug!(game_id = %id, square = %sq, outcome = outcome.as_str(), "square clicked");

    if let ClickOutcome::Moved(mv) = &outcome {
        state.ws.broadcast(&id, WsEvent::move_made(game, mv)).await;
        if game.is_game_over() {
            state.ws.broadcast(&id, WsEvent::game_over(game)).await;
        }
    }
    let response = select_to_response(&outcome, game);
    drop(games);

    Ok(Json(response))
}

// =========================================================================
// Legal Moves
// =========================================================================

/// GET /api/games/:id/legal-moves?row=&col=
pub async fn legal_moves(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<LegalMovesQuery>,
) -> Result<Json<LegalMovesResponse>, ApiError> {
    let sq = to_square(SquareDto {
        row: query.row,
        col: query.col,
    })?;

    let games = state.games.read().await;
    let game = games
        .get(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;

    Ok(Json(LegalMovesResponse {
        from: sq.into(),
        piece: game.board().piece_at(sq).map(PieceInfo::from),
        moves: squares(&game.legal_moves_from(sq)),
    }))
}

// =========================================================================
// Reset
// =========================================================================

/// POST /api/games/:id/reset
pub async fn reset_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let mut games = state.games.write().await;
    let game = games
        .get_mut(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;

    game.reset();

    state.ws.broadcast(&id, WsEvent::game_state(game)).await;
    let response = game_to_response(game);
    drop(games);

    info!(game_id = %id, "game reset");
    Ok(Json(response))
}

// =========================================================================
// Stateless engine queries
// =========================================================================

/// POST /api/legal-moves
pub async fn analyze_legal_moves(
    Json(input): Json<AnalyzeMovesRequest>,
) -> Result<Json<LegalMovesResponse>, ApiError> {
    let board = Board::from_placement(&input.placement)?;
    let from = to_square(input.from)?;

    Ok(Json(LegalMovesResponse {
        from: from.into(),
        piece: board.piece_at(from).map(PieceInfo::from),
        moves: squares(&movegen::legal_moves_from(&board, from)),
    }))
}

/// POST /api/status
pub async fn analyze_status(
    Json(input): Json<AnalyzeStatusRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let board = Board::from_placement(&input.placement)?;
    let side = parse_color(&input.side_to_move)?;
    let status = status::classify(&board, side);

    Ok(Json(StatusResponse {
        status: status.as_str().to_string(),
        side_to_move: side.as_str().to_string(),
        check: matches!(status, GameStatus::Check | GameStatus::Checkmate),
    }))
}

// =========================================================================
// Helpers
// =========================================================================

fn to_square(dto: SquareDto) -> Result<Square, ApiError> {
    dto.to_square().ok_or_else(|| {
        ChessError::InvalidSquare {
            row: dto.row,
            col: dto.col,
        }
        .into()
    })
}

fn parse_color(s: &str) -> Result<Color, ApiError> {
    Color::from_str_loose(s).ok_or_else(|| ApiError::InvalidRequest(format!("invalid color: {s}")))
}

// =========================================================================
// Tests
// =========================================================================
