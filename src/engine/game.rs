//! Stateful game session wrapping a `Board`.
//!
//! `Game` owns the board, whose turn it is, the currently selected piece and
//! the last computed status. It is the only place the board is mutated; the
//! engine functions it calls only ever see borrowed snapshots.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::engine::attacks;
use crate::engine::board::Board;
use crate::engine::movegen;
use crate::engine::status;
use crate::engine::types::{ChessError, Color, GameStatus, Piece, PieceType, Square};

// =========================================================================
// Selection / outcomes
// =========================================================================

/// A piece picked up by the player, with its legal destinations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub square: Square,
    pub piece: Piece,
    pub targets: Vec<Square>,
}

/// Result of a successfully applied move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
    pub captured: Option<Piece>,
    /// Status of the position for the side that moves next.
    pub status: GameStatus,
}

/// What a click on a square did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A piece of the player to move is now selected.
    Selected(Selection),
    /// The selection was cleared.
    Deselected,
    /// The selected piece moved to the clicked square.
    Moved(MoveOutcome),
    /// Nothing was selected and the click was not on an own piece.
    Ignored,
}

impl ClickOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClickOutcome::Selected(_) => "selected",
            ClickOutcome::Deselected => "deselected",
            ClickOutcome::Moved(_) => "moved",
            ClickOutcome::Ignored => "ignored",
        }
    }
}

// =========================================================================
// Game
// =========================================================================

/// A single self-play game.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    /// Side to move, or the winner once the game ends in checkmate.
    current_player: Color,
    selection: Option<Selection>,
    status: GameStatus,

    // Metadata
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Create a new game from the standard starting position.
    pub fn new() -> Self {
        Self {
            board: Board::starting(),
            current_player: Color::White,
            selection: None,
            status: GameStatus::Playing,
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        }
    }

    /// Create a game from an arbitrary board with `side_to_move` to play.
    ///
    /// If that side is already checkmated the game starts finished, with
    /// the other side recorded as the winner. A position where the side not
    /// to move is in check is rejected: its king could be captured.
    pub fn from_board(board: Board, side_to_move: Color) -> Result<Self, ChessError> {
        board.validate()?;
        if attacks::king_in_check(&board, !side_to_move) {
            return Err(ChessError::OpponentInCheck(!side_to_move));
        }
        let status = status::classify(&board, side_to_move);
        let current_player = if status == GameStatus::Checkmate {
            !side_to_move
        } else {
            side_to_move
        };
        Ok(Self {
            board,
            current_player,
            selection: None,
            status,
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        })
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn current_player(&self) -> Color {
        self.current_player
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    /// The side that delivered checkmate, if any.
    pub fn winner(&self) -> Option<Color> {
        (self.status == GameStatus::Checkmate).then_some(self.current_player)
    }

    /// End-of-game banner text; empty while the game is running.
    pub fn message(&self) -> String {
        match self.status {
            GameStatus::Checkmate => format!("{} won", self.current_player),
            GameStatus::Draw => "Draw".to_string(),
            GameStatus::Playing | GameStatus::Check => String::new(),
        }
    }

    pub fn belongs_to_current_player(&self, piece: Piece) -> bool {
        piece.color == self.current_player
    }

    /// Legal destinations for the piece on `sq` (either colour).
    pub fn legal_moves_from(&self, sq: Square) -> Vec<Square> {
        movegen::legal_moves_from(&self.board, sq)
    }

    // -----------------------------------------------------------------
    // Click handling
    // -----------------------------------------------------------------

    /// Handle a click on `sq`.
    ///
    /// With nothing selected, clicking an own piece selects it. With a piece
    /// selected, clicking it again deselects, clicking another own piece
    /// switches the selection, clicking one of its targets moves, and
    /// anything else deselects.
    pub fn select(&mut self, sq: Square) -> Result<ClickOutcome, ChessError> {
        if self.is_game_over() {
            return Err(ChessError::GameOver(self.status));
        }

        let clicked = self
            .board
            .piece_at(sq)
            .filter(|&p| self.belongs_to_current_player(p));

        let Some(current) = self.selection.take() else {
            return Ok(match clicked {
                Some(piece) => ClickOutcome::Selected(self.pick_up(sq, piece)),
                None => ClickOutcome::Ignored,
            });
        };

        if current.square == sq {
            return Ok(ClickOutcome::Deselected);
        }

        if let Some(piece) = clicked {
            return Ok(ClickOutcome::Selected(self.pick_up(sq, piece)));
        }

        if current.targets.contains(&sq) {
            let outcome = self.make_move(current.square, sq)?;
            return Ok(ClickOutcome::Moved(outcome));
        }

        Ok(ClickOutcome::Deselected)
    }

    fn pick_up(&mut self, sq: Square, piece: Piece) -> Selection {
        let selection = Selection {
            square: sq,
            piece,
            targets: movegen::legal_moves(piece, sq, &self.board),
        };
        self.selection = Some(selection.clone());
        selection
    }

    /// Clear the current selection, if any.
    pub fn deselect(&mut self) {
        self.selection = None;
    }

    // -----------------------------------------------------------------
    // Make move
    // -----------------------------------------------------------------

    /// Move the current player's piece from `from` to `to`.
    ///
    /// The position is then classified for the opponent. The turn passes to
    /// the opponent unless that classification is checkmate, in which case
    /// the mover stays recorded as the winner.
    pub fn make_move(&mut self, from: Square, to: Square) -> Result<MoveOutcome, ChessError> {
        if self.is_game_over() {
            return Err(ChessError::GameOver(self.status));
        }

        let piece = self.board.piece_at(from).ok_or(ChessError::NoPiece(from))?;
        if !self.belongs_to_current_player(piece) {
            return Err(ChessError::NotYourTurn {
                expected: self.current_player,
            });
        }

        if !movegen::is_legal_move(&self.board, from, to) {
            return Err(ChessError::IllegalMove { from, to });
        }

        let captured = self.board.piece_at(to);
        if captured.is_some_and(|p| p.kind == PieceType::King) {
            return Err(ChessError::IllegalMove { from, to });
        }
        self.board = self.board.with_move(from, to);
        self.selection = None;

        let next = !self.current_player;
        self.status = status::classify(&self.board, next);
        if self.status != GameStatus::Checkmate {
            self.current_player = next;
        }

        Ok(MoveOutcome {
            piece,
            from,
            to,
            captured,
            status: self.status,
        })
    }

    // -----------------------------------------------------------------
    // Rematch
    // -----------------------------------------------------------------

    /// Start over from the standard position, keeping the game id.
    pub fn reset(&mut self) {
        self.board = Board::starting();
        self.current_player = Color::White;
        self.selection = None;
        self.status = GameStatus::Playing;
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
