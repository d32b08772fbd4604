//! The game board: grid state, move validation, and win tracking.

use crate::grid::Grid;
use crate::rules;
use crate::types::{Cell, GameStatus, Mark, Move, Position, Rules};
use derive_more::{Display, Error};
use tracing::{debug, info, instrument};

/// Reasons a move is not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// Row or column is outside the grid.
    #[display("Position {} is outside the {}x{} grid", position, size, size)]
    OutOfBounds {
        /// Requested position.
        position: Position,
        /// Grid side length.
        size: usize,
    },
    /// Target cell already holds a mark.
    #[display("Cell {} is already occupied", position)]
    CellOccupied {
        /// Requested position.
        position: Position,
    },
    /// The game has ended and the board has not been reset.
    #[display("Game is already over")]
    GameOver,
    /// Turn order is enforced and the other mark is due.
    #[display("It is {}'s turn", expected)]
    WrongTurn {
        /// Mark expected to move next.
        expected: Mark,
    },
}

/// Result of an applied move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Always true for a returned outcome; rejected moves are errors.
    pub applied: bool,
    /// Set when the move completed a winning run.
    pub winner: Option<Mark>,
    /// Set when the move filled the last empty cell without winning.
    pub board_full: bool,
}

/// Gomoku board for a single game.
///
/// Has no synchronization of its own; the server wraps it in a lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rules: Rules,
    grid: Grid,
    status: GameStatus,
    next_mark: Mark,
    enforce_turns: bool,
    moves: usize,
}

impl Board {
    /// Creates an empty board with the given rules. X is due first.
    #[instrument]
    pub fn new(rules: Rules) -> Self {
        Self {
            rules,
            grid: Grid::new(rules.grid_size),
            status: GameStatus::InProgress,
            next_mark: Mark::X,
            enforce_turns: false,
            moves: 0,
        }
    }

    /// Makes [`Board::apply_move`] reject marks that are not due.
    pub fn with_turn_order(mut self, enforce: bool) -> Self {
        self.enforce_turns = enforce;
        self
    }

    /// Rules this board was created with.
    pub fn rules(&self) -> Rules {
        self.rules
    }

    /// The underlying grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Current game status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Mark expected to move next.
    pub fn next_mark(&self) -> Mark {
        self.next_mark
    }

    /// Moves applied since the last reset.
    pub fn moves(&self) -> usize {
        self.moves
    }

    /// Cell at `(row, col)`, or `None` off the grid.
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        self.grid.get(Position::new(row, col))
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.grid.occupied()
    }

    /// Validates and applies a move, then checks for a win or a full grid.
    ///
    /// A rejected move leaves the board untouched.
    #[instrument(skip(self), fields(status = ?self.status, next = %self.next_mark))]
    pub fn apply_move(&mut self, mv: Move) -> Result<MoveOutcome, MoveError> {
        if self.status != GameStatus::InProgress {
            return Err(MoveError::GameOver);
        }

        let position = mv.position;
        if !self.rules.contains(position) {
            return Err(MoveError::OutOfBounds {
                position,
                size: self.rules.grid_size,
            });
        }

        if !self.grid.get(position).is_some_and(Cell::is_empty) {
            return Err(MoveError::CellOccupied { position });
        }

        if self.enforce_turns && mv.mark != self.next_mark {
            return Err(MoveError::WrongTurn {
                expected: self.next_mark,
            });
        }

        self.grid.set(position, Cell::Occupied(mv.mark));
        self.moves += 1;
        self.next_mark = mv.mark.opponent();

        let winner = self
            .check_win(position.row, position.col, mv.mark)
            .then_some(mv.mark);
        let board_full = winner.is_none() && self.grid.is_full();

        if let Some(mark) = winner {
            info!(%mark, %position, moves = self.moves, "Winning move");
            self.status = GameStatus::Won(mark);
        } else if board_full {
            info!(moves = self.moves, "Board full without a winner");
            self.status = GameStatus::Draw;
        } else {
            debug!(mark = %mv.mark, %position, "Move applied");
        }

        Ok(MoveOutcome {
            applied: true,
            winner,
            board_full,
        })
    }

    /// Returns true if the mark at `(row, col)` is part of a winning run.
    pub fn check_win(&self, row: usize, col: usize, mark: Mark) -> bool {
        rules::check_win(
            &self.grid,
            Position::new(row, col),
            mark,
            self.rules.winning_length,
        )
    }

    /// Clears every cell and starts a new game with X due.
    #[instrument(skip(self), fields(moves = self.moves))]
    pub fn reset(&mut self) {
        self.grid.clear();
        self.status = GameStatus::InProgress;
        self.next_mark = Mark::X;
        self.moves = 0;
        debug!("Board reset");
    }

    /// Wire shape of the grid. See [`Grid::serialize`].
    pub fn serialize(&self) -> String {
        self.grid.serialize()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(Rules::default())
    }
}
