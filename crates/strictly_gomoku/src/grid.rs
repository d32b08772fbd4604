//! Square grid of cells and its wire shape.
//!
//! The wire shape is fixed: every cell symbol in row-major order,
//! each followed by a comma, including the last cell. `Grid::parse` is the
//! inverse of `Grid::serialize`.

use crate::types::{Cell, Mark, Position};
use derive_more::{Display, Error};

/// Separator emitted after every cell.
pub const CELL_SEPARATOR: char = ',';

/// Row-major square grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an all-empty grid with `size` rows and columns.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size * size],
        }
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    fn index(&self, position: Position) -> Option<usize> {
        (position.row < self.size && position.col < self.size)
            .then(|| position.row * self.size + position.col)
    }

    /// Cell at `position`, or `None` off the grid.
    pub fn get(&self, position: Position) -> Option<Cell> {
        self.index(position).map(|i| self.cells[i])
    }

    /// True when `position` is on the grid and holds `mark`.
    pub fn holds(&self, position: Position, mark: Mark) -> bool {
        self.get(position) == Some(Cell::Occupied(mark))
    }

    /// Overwrites the cell at `position`. Returns false off the grid.
    pub fn set(&mut self, position: Position, cell: Cell) -> bool {
        match self.index(position) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of non-empty cells.
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// True when no empty cell remains.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    /// Empties every cell.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    /// Renders the wire shape, e.g. `X,-,-,...,-,`.
    pub fn serialize(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() * 2);
        for cell in &self.cells {
            out.push(cell.symbol());
            out.push(CELL_SEPARATOR);
        }
        out
    }

    /// Parses the wire shape produced by [`Grid::serialize`].
    ///
    /// Surrounding whitespace (such as the line terminator) is ignored. The
    /// trailing separator after the last cell is required.
    pub fn parse(text: &str, size: usize) -> Result<Self, ParseGridError> {
        let text = text.trim();
        let body = text
            .strip_suffix(CELL_SEPARATOR)
            .ok_or(ParseGridError::MissingTrailingSeparator)?;

        let mut cells = Vec::with_capacity(size * size);
        for field in body.split(CELL_SEPARATOR) {
            let mut chars = field.chars();
            let cell = match (chars.next(), chars.next()) {
                (Some(symbol), None) => Cell::from_symbol(symbol),
                _ => None,
            }
            .ok_or_else(|| ParseGridError::UnknownSymbol {
                field: field.to_string(),
            })?;
            cells.push(cell);
        }

        if cells.len() != size * size {
            return Err(ParseGridError::WrongCellCount {
                expected: size * size,
                found: cells.len(),
            });
        }

        Ok(Self { size, cells })
    }
}

/// Failure to parse a serialized grid.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ParseGridError {
    /// The last cell was not followed by a separator.
    #[display("Grid text does not end with ','")]
    MissingTrailingSeparator,
    /// A field was not a single known cell symbol.
    #[display("Unknown cell symbol {:?}", field)]
    UnknownSymbol {
        /// The offending field.
        field: String,
    },
    /// The number of cells does not match the grid size.
    #[display("Expected {} cells, found {}", expected, found)]
    WrongCellCount {
        /// Cells required by the grid size.
        expected: usize,
        /// Cells present in the text.
        found: usize,
    },
}
