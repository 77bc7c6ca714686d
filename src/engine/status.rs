//! Game status classification.

use crate::engine::attacks::king_in_check;
use crate::engine::board::Board;
use crate::engine::movegen::legal_moves;
use crate::engine::types::{Color, GameStatus};

/// Does `side` have at least one legal move?
///
/// Scans row-major and stops at the first piece with a legal destination.
pub fn has_legal_move(board: &Board, side: Color) -> bool {
    board
        .pieces_of(side)
        .any(|(from, piece)| !legal_moves(piece, from, board).is_empty())
}

/// Classify `board` for `side` to move.
///
/// | in check | has a move | status      |
/// |----------|------------|-------------|
/// | yes      | yes        | `Check`     |
/// | yes      | no         | `Checkmate` |
/// | no       | no         | `Draw`      |
/// | no       | yes        | `Playing`   |
pub fn classify(board: &Board, side: Color) -> GameStatus {
    let in_check = king_in_check(board, side);
    let has_move = has_legal_move(board, side);

    match (in_check, has_move) {
        (true, true) => GameStatus::Check,
        (true, false) => GameStatus::Checkmate,
        (false, false) => GameStatus::Draw,
        (false, true) => GameStatus::Playing,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
