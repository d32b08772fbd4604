//! Core domain types for gomoku.

use derive_new::new;
use serde::{Deserialize, Serialize};

/// Default side length of the square grid.
pub const GRID_SIZE: usize = 10;

/// Default number of contiguous marks needed to win.
pub const WINNING_LENGTH: usize = 5;

/// Player mark.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum Mark {
    /// Player X (opens every game).
    X,
    /// Player O.
    O,
}

impl Mark {
    /// Returns the opponent mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    /// Wire symbol for this mark.
    pub fn symbol(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }

    /// Parses a wire symbol. Only uppercase `X` and `O` are marks.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'X' => Some(Mark::X),
            'O' => Some(Mark::O),
            _ => None,
        }
    }
}

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// No mark yet.
    #[default]
    Empty,
    /// Cell holds a mark.
    Occupied(Mark),
}

impl Cell {
    /// Symbol used for an empty cell on the wire.
    pub const EMPTY_SYMBOL: char = '-';

    /// Wire symbol for this cell.
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => Self::EMPTY_SYMBOL,
            Cell::Occupied(mark) => mark.symbol(),
        }
    }

    /// Parses a wire symbol.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        if symbol == Self::EMPTY_SYMBOL {
            return Some(Cell::Empty);
        }
        Mark::from_symbol(symbol).map(Cell::Occupied)
    }

    /// Returns true for [`Cell::Empty`].
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// Zero-based grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
pub struct Position {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub col: usize,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A request to place `mark` at `position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
pub struct Move {
    /// Target cell.
    pub position: Position,
    /// Mark to place.
    pub mark: Mark,
}

impl Move {
    /// Convenience constructor from raw coordinates.
    pub fn at(row: usize, col: usize, mark: Mark) -> Self {
        Self::new(Position::new(row, col), mark)
    }
}

/// Grid geometry and win condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    /// Side length of the square grid.
    pub grid_size: usize,
    /// Contiguous marks needed to win.
    pub winning_length: usize,
}

impl Rules {
    /// Creates rules for a custom grid.
    pub fn new(grid_size: usize, winning_length: usize) -> Self {
        Self {
            grid_size,
            winning_length,
        }
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.grid_size * self.grid_size
    }

    /// Returns true if `position` lies on the grid.
    pub fn contains(&self, position: Position) -> bool {
        position.row < self.grid_size && position.col < self.grid_size
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new(GRID_SIZE, WINNING_LENGTH)
    }
}

/// Current status of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Moves are accepted.
    InProgress,
    /// A player completed a run.
    Won(Mark),
    /// The grid filled up without a winner.
    Draw,
}
