//! Mailbox board representation.
//!
//! `Board` is a plain 8×8 grid of `Option<Piece>` indexed `[row][col]`, with
//! black's back rank on row 0 and white's on row 7. It carries no side to
//! move and no counters; callers pass the side explicitly, which keeps every
//! engine function a pure function of `(&Board, Color)`.

use std::fmt;

use crate::engine::types::{ChessError, Color, Piece, PieceType, Square};

/// Back rank layout, queen side first.
const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// Piece-placement text of the standard starting position.
pub const STARTING_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// An 8×8 chess board.
///
/// Cloning yields a fully independent grid, so a simulated move on a clone
/// can never leak into the original.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

impl Board {
    /// A board with no pieces.
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
        }
    }

    /// Standard starting position.
    pub fn starting() -> Self {
        let mut board = Board::empty();
        for (col, &kind) in BACK_RANK.iter().enumerate() {
            board.squares[0][col] = Some(Piece::new(Color::Black, kind));
            board.squares[1][col] = Some(Piece::new(Color::Black, PieceType::Pawn));
            board.squares[6][col] = Some(Piece::new(Color::White, PieceType::Pawn));
            board.squares[7][col] = Some(Piece::new(Color::White, kind));
        }
        board
    }

    // -----------------------------------------------------------------------
    // Square access
    // -----------------------------------------------------------------------

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.row() as usize][sq.col() as usize]
    }

    /// Place (or overwrite with) a piece.
    #[inline]
    pub fn set(&mut self, sq: Square, piece: Piece) {
        self.squares[sq.row() as usize][sq.col() as usize] = Some(piece);
    }

    /// Clear a square, returning what was on it.
    #[inline]
    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.row() as usize][sq.col() as usize].take()
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.piece_at(sq).is_none()
    }

    /// Raw rows, row 0 first.
    pub fn rows(&self) -> &[[Option<Piece>; 8]; 8] {
        &self.squares
    }

    /// Occupied squares in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    /// Occupied squares of one colour in row-major order.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.color == color)
    }

    /// A copy of this board with the piece on `from` moved to `to`.
    ///
    /// Whatever stood on `to` is overwritten and `from` is left empty. No
    /// legality checks are made.
    pub fn with_move(&self, from: Square, to: Square) -> Board {
        let mut next = self.clone();
        if let Some(piece) = next.remove(from) {
            next.set(to, piece);
        }
        next
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Number of kings of a colour on the board.
    pub fn king_count(&self, color: Color) -> usize {
        self.pieces_of(color)
            .filter(|(_, p)| p.kind == PieceType::King)
            .count()
    }

    /// Ensure exactly one king per side; check detection relies on it.
    pub fn validate(&self) -> Result<(), ChessError> {
        for color in [Color::White, Color::Black] {
            let found = self.king_count(color);
            if found != 1 {
                return Err(ChessError::KingCount { color, found });
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Placement text
    // -----------------------------------------------------------------------

    /// Parse the piece-placement field of a FEN string.
    ///
    /// Ranks are listed row 0 first and separated by `/`; digits encode runs
    /// of empty squares. The result must hold exactly one king per side.
    pub fn from_placement(placement: &str) -> Result<Self, ChessError> {
        let ranks: Vec<&str> = placement.trim().split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidPlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut board = Board::empty();
        for (row, rank) in ranks.iter().enumerate() {
            let mut col = 0usize;
            for ch in rank.chars() {
                if let Some(run) = ch.to_digit(10) {
                    if !(1..=8).contains(&run) {
                        return Err(ChessError::InvalidPlacement(format!(
                            "bad empty-square count '{ch}' in rank {}",
                            row + 1
                        )));
                    }
                    col += run as usize;
                } else {
                    let piece = Piece::from_char(ch).ok_or_else(|| {
                        ChessError::InvalidPlacement(format!("unknown piece '{ch}'"))
                    })?;
                    if col >= 8 {
                        return Err(ChessError::InvalidPlacement(format!(
                            "rank {} is wider than 8 squares",
                            row + 1
                        )));
                    }
                    board.squares[row][col] = Some(piece);
                    col += 1;
                }
                if col > 8 {
                    return Err(ChessError::InvalidPlacement(format!(
                        "rank {} is wider than 8 squares",
                        row + 1
                    )));
                }
            }
            if col != 8 {
                return Err(ChessError::InvalidPlacement(format!(
                    "rank {} covers {col} squares",
                    row + 1
                )));
            }
        }

        board.validate()?;
        Ok(board)
    }

    /// Render the board as a FEN piece-placement field.
    pub fn to_placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for (row, rank) in self.squares.iter().enumerate() {
            if row > 0 {
                out.push('/');
            }
            let mut empty = 0u8;
            for cell in rank {
                match cell {
                    Some(piece) => {
                        if empty > 0 {
                            out.push((b'0' + empty) as char);
                            empty = 0;
                        }
                        out.push(piece.to_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push((b'0' + empty) as char);
            }
        }
        out
    }

    /// Render the board as an 8-line grid (row 0 on top), for logs and tests.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(160);
        for (row, rank) in self.squares.iter().enumerate() {
            s.push((b'0' + row as u8) as char);
            s.push(' ');
            for (col, cell) in rank.iter().enumerate() {
                s.push(cell.map_or('.', Piece::to_char));
                if col < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  0 1 2 3 4 5 6 7");
        s
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::starting()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Free-function helpers
// ---------------------------------------------------------------------------

/// A fresh board in the standard starting position.
pub fn new_board() -> Board {
    Board::starting()
}

/// An independent copy of `board`.
pub fn copy_board(board: &Board) -> Board {
    board.clone()
}

/// Checkerboard colouring for `(row, col)`: odd sums are light squares.
#[inline]
pub fn square_is_white(row: u8, col: u8) -> bool {
    (row + col) % 2 == 1
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
