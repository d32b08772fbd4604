//! Strictly Gomoku - pure game logic
//!
//! Five-in-a-row on a square grid, with no I/O and no synchronization.
//! The server crate wraps a [`Board`] in a lock and drives it from network
//! connections.
//!
//! # Architecture
//!
//! - **Types**: [`Mark`], [`Cell`], [`Position`], [`Move`], [`Rules`]
//! - **Grid**: row-major cells and the comma-separated wire shape
//! - **Rules**: win detection around the last placed mark
//! - **Board**: move validation, turn tracking, win/draw status, reset
//!
//! # Example
//!
//! ```
//! use strictly_gomoku::{Board, Mark, Move};
//!
//! let mut board = Board::default();
//! for col in 0..5 {
//!     let outcome = board.apply_move(Move::at(2, col, Mark::X)).unwrap();
//!     if col == 4 {
//!         assert_eq!(outcome.winner, Some(Mark::X));
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod grid;
pub mod rules;
mod types;

pub use board::{Board, MoveError, MoveOutcome};
pub use grid::{CELL_SEPARATOR, Grid, ParseGridError};
pub use types::{Cell, GRID_SIZE, GameStatus, Mark, Move, Position, Rules, WINNING_LENGTH};
