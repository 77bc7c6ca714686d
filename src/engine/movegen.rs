//! Move generation.
//!
//! Pipeline:
//!   1. Generate pseudo-legal destinations for one piece (movement pattern and
//!      occupancy only; the mover's own king is ignored).
//!   2. Filter: apply each candidate to a copy of the board and keep it only
//!      if the mover's king is not attacked afterwards.
//!
//! Every candidate costs a board copy plus a full attack scan. That is cheap
//! on an 8×8 board and keeps the legality rule in exactly one place.

use crate::engine::attacks;
use crate::engine::board::Board;
use crate::engine::types::{Color, Piece, PieceType, Square};

// =========================================================================
// Direction tables
// =========================================================================

pub const ROOK_DIRS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

pub const BISHOP_DIRS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

pub const QUEEN_DIRS: [(i8, i8); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (2, -1),
    (2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
];

/// The king's steps are the queen's directions taken once.
pub const KING_OFFSETS: [(i8, i8); 8] = QUEEN_DIRS;

// =========================================================================
// Public API
// =========================================================================

/// Legal destinations for `piece` standing on `from`.
///
/// The piece's own colour decides direction and friendliness; the board is
/// only read.
pub fn legal_moves(piece: Piece, from: Square, board: &Board) -> Vec<Square> {
    pseudo_legal_moves(piece.kind, from, board, piece.color)
        .into_iter()
        .filter(|&to| !attacks::king_in_check(&board.with_move(from, to), piece.color))
        .collect()
}

/// Legal destinations for whatever stands on `from`; empty if nothing does.
pub fn legal_moves_from(board: &Board, from: Square) -> Vec<Square> {
    match board.piece_at(from) {
        Some(piece) => legal_moves(piece, from, board),
        None => Vec::new(),
    }
}

/// Whether moving the piece on `from` to `to` is legal.
pub fn is_legal_move(board: &Board, from: Square, to: Square) -> bool {
    legal_moves_from(board, from).contains(&to)
}

/// Pseudo-legal destinations of a `kind` piece of colour `us` on `from`.
pub fn pseudo_legal_moves(kind: PieceType, from: Square, board: &Board, us: Color) -> Vec<Square> {
    match kind {
        PieceType::Pawn => pawn_moves(from, board, us),
        PieceType::Knight => step_moves(from, board, us, &KNIGHT_OFFSETS),
        PieceType::King => step_moves(from, board, us, &KING_OFFSETS),
        PieceType::Rook => slider_moves(from, board, us, &ROOK_DIRS),
        PieceType::Bishop => slider_moves(from, board, us, &BISHOP_DIRS),
        PieceType::Queen => slider_moves(from, board, us, &QUEEN_DIRS),
    }
}

// =========================================================================
// Occupancy helpers
// =========================================================================

#[inline]
fn is_enemy(board: &Board, sq: Square, us: Color) -> bool {
    board.piece_at(sq).is_some_and(|p| p.color != us)
}

/// Empty or enemy-occupied.
#[inline]
fn is_open(board: &Board, sq: Square, us: Color) -> bool {
    board.piece_at(sq).is_none_or(|p| p.color != us)
}

// =========================================================================
// Pawn moves
// =========================================================================

fn pawn_moves(from: Square, board: &Board, us: Color) -> Vec<Square> {
    let mut moves = Vec::with_capacity(4);
    let dir = us.forward();

    // --- Pushes ---
    if let Some(one) = from.offset(dir, 0)
        && board.is_empty(one)
    {
        moves.push(one);

        if from.row() == us.pawn_start_row()
            && let Some(two) = from.offset(2 * dir, 0)
            && board.is_empty(two)
        {
            moves.push(two);
        }
    }

    // --- Captures ---
    for dc in [-1, 1] {
        if let Some(target) = from.offset(dir, dc)
            && is_enemy(board, target, us)
        {
            moves.push(target);
        }
    }

    moves
}

// =========================================================================
// Knight / King moves
// =========================================================================

fn step_moves(from: Square, board: &Board, us: Color, offsets: &[(i8, i8)]) -> Vec<Square> {
    offsets
        .iter()
        .filter_map(|&(dr, dc)| from.offset(dr, dc))
        .filter(|&to| is_open(board, to, us))
        .collect()
}

// =========================================================================
// Sliding pieces (bishop, rook, queen)
// =========================================================================

fn slider_moves(from: Square, board: &Board, us: Color, dirs: &[(i8, i8)]) -> Vec<Square> {
    let mut moves = Vec::with_capacity(27);
    for &(dr, dc) in dirs {
        let mut cur = from;
        while let Some(next) = cur.offset(dr, dc) {
            match board.piece_at(next) {
                None => moves.push(next),
                Some(p) => {
                    if p.color != us {
                        moves.push(next);
                    }
                    break;
                }
            }
            cur = next;
        }
    }
    moves
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sq(row: u8, col: u8) -> Square {
        Square::new(row, col).unwrap()
    }

    fn board(placement: &str) -> Board {
        Board::from_placement(placement).unwrap()
    }

    fn set(squares: &[Square]) -> HashSet<Square> {
        squares.iter().copied().collect()
    }

    fn targets(b: &Board, row: u8, col: u8) -> HashSet<Square> {
        set(&legal_moves_from(b, sq(row, col)))
    }

    // -------------------------------------------------------------------
    // Starting position
    // -------------------------------------------------------------------

    #[test]
    fn starting_pawn_e2() {
        let b = Board::starting();
        assert_eq!(targets(&b, 6, 4), set(&[sq(5, 4), sq(4, 4)]));
    }

    #[test]
    fn starting_knight_b1() {
        let b = Board::starting();
        assert_eq!(targets(&b, 7, 1), set(&[sq(5, 0), sq(5, 2)]));
    }

    #[test]
    fn starting_position_has_20_moves_per_side() {
        let b = Board::starting();
        for color in [Color::White, Color::Black] {
            let total: usize = b
                .pieces_of(color)
                .map(|(from, p)| legal_moves(p, from, &b).len())
                .sum();
            assert_eq!(total, 20, "{color}");
        }
    }

    #[test]
    fn starting_back_rank_sliders_are_stuck() {
        let b = Board::starting();
        for col in [0, 2, 3, 4, 5, 7] {
            assert!(legal_moves_from(&b, sq(7, col)).is_empty());
        }
    }

    #[test]
    fn empty_square_has_no_moves() {
        assert!(legal_moves_from(&Board::starting(), sq(4, 4)).is_empty());
    }

    // -------------------------------------------------------------------
    // Pawn moves
    // -------------------------------------------------------------------

    #[test]
    fn black_pawn_moves_down() {
        let b = Board::starting();
        assert_eq!(targets(&b, 1, 3), set(&[sq(2, 3), sq(3, 3)]));
    }

    #[test]
    fn pawn_single_push_off_start_row() {
        let b = board("4k3/8/8/8/8/4P3/8/4K3");
        assert_eq!(targets(&b, 5, 4), set(&[sq(4, 4)]));
    }

    #[test]
    fn pawn_blocked() {
        let b = board("4k3/8/8/8/8/4p3/4P3/4K3");
        assert!(targets(&b, 6, 4).is_empty());
    }

    #[test]
    fn pawn_double_push_needs_both_squares_empty() {
        let b = board("4k3/8/8/8/4p3/8/4P3/4K3");
        assert_eq!(targets(&b, 6, 4), set(&[sq(5, 4)]));
    }

    #[test]
    fn pawn_captures_diagonally_only_enemies() {
        let b = board("4k3/8/8/8/8/3p1N2/4P3/4K3");
        assert_eq!(targets(&b, 6, 4), set(&[sq(5, 4), sq(4, 4), sq(5, 3)]));
    }

    #[test]
    fn pawn_on_edge_file() {
        let b = board("4k3/8/8/8/8/1p6/P7/4K3");
        assert_eq!(targets(&b, 6, 0), set(&[sq(5, 0), sq(4, 0), sq(5, 1)]));
    }

    #[test]
    fn pawn_on_last_row_stays_put() {
        // No promotion: a white pawn on row 0 has nowhere to go.
        let b = board("P3k3/8/8/8/8/8/8/4K3");
        assert!(targets(&b, 0, 0).is_empty());
    }

    // -------------------------------------------------------------------
    // Knight / King
    // -------------------------------------------------------------------

    #[test]
    fn knight_in_centre_has_eight_moves() {
        let b = board("4k3/8/8/8/3N4/8/8/4K3");
        assert_eq!(targets(&b, 4, 3).len(), 8);
    }

    #[test]
    fn knight_in_corner_has_two_moves() {
        let b = board("4k3/8/8/8/8/8/8/N3K3");
        assert_eq!(targets(&b, 7, 0), set(&[sq(5, 1), sq(6, 2)]));
    }

    #[test]
    fn king_excludes_friendly_squares() {
        let b = board("4k3/8/8/8/8/8/3PP3/3QK3");
        assert_eq!(targets(&b, 7, 4), set(&[sq(7, 5), sq(6, 5)]));
    }

    #[test]
    fn king_never_steps_into_check() {
        // Black rook on the f-file covers (x, 5).
        let b = board("4kr2/8/8/8/8/8/8/4K3");
        let moves = targets(&b, 7, 4);
        assert!(!moves.contains(&sq(7, 5)));
        assert!(!moves.contains(&sq(6, 5)));
        assert!(moves.contains(&sq(7, 3)));
        for &to in &moves {
            let after = b.with_move(sq(7, 4), to);
            assert!(!attacks::king_in_check(&after, Color::White));
        }
    }

    #[test]
    fn king_cannot_capture_defended_piece() {
        // Black rook (6,3) is covered by the black rook on (0,3).
        let b = board("3rk3/8/8/8/8/8/3r4/4K3");
        assert_eq!(targets(&b, 7, 4), set(&[sq(7, 5)]));
    }

    // -------------------------------------------------------------------
    // Sliders
    // -------------------------------------------------------------------

    #[test]
    fn rook_capture_boundary() {
        // White rook (4,0), black pawn two squares right at (4,2).
        let b = board("4k3/8/8/8/R1p5/8/8/4K3");
        let moves = targets(&b, 4, 0);
        assert!(moves.contains(&sq(4, 1)));
        assert!(moves.contains(&sq(4, 2)));
        for col in 3..8 {
            assert!(!moves.contains(&sq(4, col)));
        }
    }

    #[test]
    fn rook_stops_before_friend() {
        let b = board("4k3/8/8/8/R1P5/8/8/4K3");
        let moves = targets(&b, 4, 0);
        assert!(moves.contains(&sq(4, 1)));
        assert!(!moves.contains(&sq(4, 2)));
    }

    #[test]
    fn bishop_diagonals_only() {
        let b = board("4k3/8/8/8/3B4/8/8/7K");
        let moves = targets(&b, 4, 3);
        assert_eq!(moves.len(), 13);
        assert!(moves.iter().all(|m| m.row() != 4 && m.col() != 3));
    }

    #[test]
    fn queen_is_rook_plus_bishop() {
        let b = board("7k/8/8/8/3Q4/8/8/K7");
        let queen = set(&pseudo_legal_moves(PieceType::Queen, sq(4, 3), &b, Color::White));
        let rook = set(&pseudo_legal_moves(PieceType::Rook, sq(4, 3), &b, Color::White));
        let bishop = set(&pseudo_legal_moves(PieceType::Bishop, sq(4, 3), &b, Color::White));
        assert_eq!(queen, rook.union(&bishop).copied().collect());
    }

    #[test]
    fn generators_never_repeat_a_square() {
        let b = board("r3k2r/pp1n1ppp/2pbpn2/q2p4/3P1B2/2NBPN2/PPQ2PPP/R3K2R");
        for (from, p) in b.pieces() {
            let moves = pseudo_legal_moves(p.kind, from, &b, p.color);
            assert_eq!(moves.len(), set(&moves).len(), "{p} on {from}");
        }
    }

    // -------------------------------------------------------------------
    // Legality filter
    // -------------------------------------------------------------------

    #[test]
    fn pinned_piece_stays_on_pin_line() {
        // White rook (5,4) pinned by black rook (0,4) against king (7,4).
        let b = board("4r2k/8/8/8/8/4R3/8/4K3");
        let moves = targets(&b, 5, 4);
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|m| m.col() == 4));
        assert!(moves.contains(&sq(0, 4)));
    }

    #[test]
    fn pinned_knight_has_no_moves() {
        let b = board("4r2k/8/8/8/8/4N3/8/4K3");
        assert!(targets(&b, 5, 4).is_empty());
    }

    #[test]
    fn must_resolve_check() {
        // Black rook checks along column 4; the bishop can only interpose.
        let b = board("4r2k/8/8/8/8/8/3B4/4K3");
        assert_eq!(targets(&b, 6, 3), set(&[sq(5, 4)]));
    }

    #[test]
    fn legal_moves_is_idempotent() {
        let b = board("r1bqkbnr/pppp1ppp/2n5/4p2Q/4P3/8/PPPP1PPP/RNB1KBNR");
        for (from, p) in b.pieces() {
            assert_eq!(legal_moves(p, from, &b), legal_moves(p, from, &b));
        }
    }

    #[test]
    fn legal_moves_do_not_mutate_board() {
        let b = Board::starting();
        let before = b.clone();
        for (from, p) in b.pieces() {
            let _ = legal_moves(p, from, &b);
        }
        assert_eq!(b, before);
    }

    #[test]
    fn is_legal_move_matches_targets() {
        let b = Board::starting();
        assert!(is_legal_move(&b, sq(6, 4), sq(4, 4)));
        assert!(!is_legal_move(&b, sq(6, 4), sq(3, 4)));
        assert!(!is_legal_move(&b, sq(4, 4), sq(3, 4)));
    }
}
