//! Rules engine: board model, move generation, check detection and status.
//!
//! The two entry points a front-end needs are [`legal_moves`] (destinations
//! for a selected piece) and [`classify`] (status of a position for the side
//! to move). Both borrow the board and keep no state between calls.

pub mod attacks;
pub mod board;
pub mod game;
pub mod movegen;
pub mod status;
pub mod types;

pub use board::{Board, copy_board, new_board, square_is_white};
pub use game::Game;
pub use movegen::{legal_moves, legal_moves_from};
pub use status::classify;
pub use types::*;
