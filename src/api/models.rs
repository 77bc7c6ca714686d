use serde::{Deserialize, Serialize};

use crate::engine::board::{Board, square_is_white};
use crate::engine::game::{ClickOutcome, Game, MoveOutcome, Selection};
use crate::engine::types::{Color, GameStatus, Piece, Square};

// ---------------------------------------------------------------------------
// Shared value types
// ---------------------------------------------------------------------------

/// A `(row, col)` pair on the wire. Range is checked by [`SquareDto::to_square`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SquareDto {
    pub row: u8,
    pub col: u8,
}

impl SquareDto {
    pub fn to_square(self) -> Option<Square> {
        Square::new(self.row, self.col)
    }
}

impl From<Square> for SquareDto {
    fn from(sq: Square) -> Self {
        SquareDto {
            row: sq.row(),
            col: sq.col(),
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PieceInfo {
    #[serde(rename = "type")]
    pub piece_type: String,
    pub color: String,
}

impl From<Piece> for PieceInfo {
    fn from(p: Piece) -> Self {
        PieceInfo {
            piece_type: p.kind.as_str().to_string(),
            color: p.color.as_str().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Request models
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    /// FEN piece-placement field; the standard layout when absent.
    pub placement: Option<String>,
    pub current_player: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub from: SquareDto,
    pub to: SquareDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGamesQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalMovesQuery {
    pub row: u8,
    pub col: u8,
}

/// Stateless legal-move query on a caller-supplied board.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeMovesRequest {
    pub placement: String,
    pub from: SquareDto,
}

/// Stateless status query on a caller-supplied board.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeStatusRequest {
    pub placement: String,
    pub side_to_move: String,
}

// ---------------------------------------------------------------------------
// Response models
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub engine: String,
    pub uptime: u64,
    pub games: usize,
    /// Live WebSocket subscriptions across all games.
    pub subscriptions: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionView {
    pub square: SquareDto,
    pub piece: PieceInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub id: String,
    pub board: Vec<Vec<Option<PieceInfo>>>,
    pub square_colors: Vec<Vec<String>>,
    pub placement: String,
    pub status: String,
    pub current_player: String,
    pub check: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<SelectionView>,
    /// Destinations of the selected piece; empty without a selection.
    pub legal_moves: Vec<SquareDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    pub message: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGamesResponse {
    pub games: Vec<GameResponse>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveSummary {
    pub piece: PieceInfo,
    pub from: SquareDto,
    pub to: SquareDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured: Option<PieceInfo>,
}

impl From<&MoveOutcome> for MoveSummary {
    fn from(mv: &MoveOutcome) -> Self {
        MoveSummary {
            piece: mv.piece.into(),
            from: mv.from.into(),
            to: mv.to.into(),
            captured: mv.captured.map(PieceInfo::from),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectResponse {
    pub outcome: String,
    #[serde(rename = "move", skip_serializing_if = "Option::is_none")]
    pub mv: Option<MoveSummary>,
    pub game: GameResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalMovesResponse {
    pub from: SquareDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub piece: Option<PieceInfo>,
    pub moves: Vec<SquareDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: String,
    pub side_to_move: String,
    pub check: bool,
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// 8×8 view of a board, row 0 first; empty squares are `null`.
pub fn board_view(board: &Board) -> Vec<Vec<Option<PieceInfo>>> {
    board
        .rows()
        .iter()
        .map(|rank| rank.iter().map(|cell| cell.map(PieceInfo::from)).collect())
        .collect()
}

/// 8×8 grid of square colours, `"white"` or `"black"`.
pub fn square_colors() -> Vec<Vec<String>> {
    (0..8u8)
        .map(|row| {
            (0..8u8)
                .map(|col| {
                    let color = if square_is_white(row, col) {
                        Color::White
                    } else {
                        Color::Black
                    };
                    color.as_str().to_string()
                })
                .collect()
        })
        .collect()
}

pub fn squares(list: &[Square]) -> Vec<SquareDto> {
    list.iter().copied().map(SquareDto::from).collect()
}

pub fn game_to_response(game: &Game) -> GameResponse {
    let status = game.status();
    let (selected, legal_moves) = match game.selection() {
        Some(Selection {
            square,
            piece,
            targets,
        }) => (
            Some(SelectionView {
                square: (*square).into(),
                piece: (*piece).into(),
            }),
            squares(targets),
        ),
        None => (None, Vec::new()),
    };

    GameResponse {
        id: game.id.clone(),
        board: board_view(game.board()),
        square_colors: square_colors(),
        placement: game.board().to_placement(),
        status: status.as_str().to_string(),
        current_player: game.current_player().as_str().to_string(),
        check: matches!(status, GameStatus::Check | GameStatus::Checkmate),
        selected,
        legal_moves,
        winner: game.winner().map(|c| c.as_str().to_string()),
        message: game.message(),
        created_at: game.created_at.to_rfc3339(),
    }
}

pub fn select_to_response(outcome: &ClickOutcome, game: &Game) -> SelectResponse {
    let mv = match outcome {
        ClickOutcome::Moved(mv) => Some(MoveSummary::from(mv)),
        _ => None,
    };
    SelectResponse {
        outcome: outcome.as_str().to_string(),
        mv,
        game: game_to_response(game),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
