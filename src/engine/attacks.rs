//! Check detection.
//!
//! Attacks are computed from the move generators themselves: a square is
//! attacked by a side when some piece of that side has it among its
//! pseudo-legal destinations. Pawn pushes never land on an occupied square,
//! so the only pawn "moves" that can reach a king are its diagonal captures,
//! which is exactly the pawn's attack pattern.

use crate::engine::board::Board;
use crate::engine::movegen::pseudo_legal_moves;
use crate::engine::types::{ChessError, Color, PieceType, Square};

/// Locate the king of `color`.
///
/// Returns `ChessError::KingCount` unless there is exactly one.
pub fn find_king(board: &Board, color: Color) -> Result<Square, ChessError> {
    let mut kings = board
        .pieces_of(color)
        .filter(|(_, p)| p.kind == PieceType::King)
        .map(|(sq, _)| sq);

    match (kings.next(), kings.next()) {
        (Some(sq), None) => Ok(sq),
        (None, _) => Err(ChessError::KingCount { color, found: 0 }),
        (Some(_), Some(_)) => Err(ChessError::KingCount {
            color,
            found: board.king_count(color),
        }),
    }
}

/// Is `target` reachable by any piece of colour `by`?
///
/// `target` is normally occupied by the other side (a king); an empty
/// `target` is only reported for pieces that may move onto empty squares.
pub fn is_square_attacked(board: &Board, target: Square, by: Color) -> bool {
    board
        .pieces_of(by)
        .any(|(from, p)| pseudo_legal_moves(p.kind, from, board, by).contains(&target))
}

/// Is the king of `color` attacked?
///
/// # Panics
///
/// Panics if the board does not hold exactly one king of `color`. Boards that
/// come from outside the engine are validated on entry (see
/// [`Board::validate`]), so reaching this is a programming error.
pub fn king_in_check(board: &Board, color: Color) -> bool {
    let king = find_king(board, color).unwrap_or_else(|e| panic!("{e}"));
    is_square_attacked(board, king, !color)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
