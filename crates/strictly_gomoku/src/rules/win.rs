//! Win detection around the most recently placed mark.

use crate::grid::Grid;
use crate::types::{Mark, Position};
use tracing::instrument;

/// Line directions as (row step, column step): horizontal, vertical,
/// main diagonal, anti-diagonal. Each is walked both ways.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Steps from `from` by `(dr, dc)`, staying on the grid.
fn step(grid: &Grid, from: Position, (dr, dc): (isize, isize)) -> Option<Position> {
    let row = from.row.checked_add_signed(dr)?;
    let col = from.col.checked_add_signed(dc)?;
    (row < grid.size() && col < grid.size()).then_some(Position::new(row, col))
}

/// Counts contiguous `mark` cells starting next to `origin` and walking
/// in `direction`. The origin itself is not counted.
fn count_from(grid: &Grid, origin: Position, mark: Mark, direction: (isize, isize)) -> usize {
    let mut count = 0;
    let mut cursor = origin;
    while let Some(next) = step(grid, cursor, direction) {
        if !grid.holds(next, mark) {
            break;
        }
        count += 1;
        cursor = next;
    }
    count
}

/// Length of the longest run of `mark` through `origin` along any of the
/// four line directions, counting `origin` itself.
pub fn longest_run(grid: &Grid, origin: Position, mark: Mark) -> usize {
    DIRECTIONS
        .iter()
        .map(|&(dr, dc)| {
            1 + count_from(grid, origin, mark, (dr, dc))
                + count_from(grid, origin, mark, (-dr, -dc))
        })
        .max()
        .unwrap_or(1)
}

/// Returns true if the mark at `origin` completes a run of at least
/// `winning_length`.
///
/// Only cells on the four lines through `origin` are read, so the cost does
/// not depend on how full the grid is.
#[instrument(skip(grid))]
pub fn check_win(grid: &Grid, origin: Position, mark: Mark, winning_length: usize) -> bool {
    longest_run(grid, origin, mark) >= winning_length
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;

    fn place(grid: &mut Grid, cells: &[(usize, usize)], mark: Mark) {
        for &(row, col) in cells {
            grid.set(Position::new(row, col), Cell::Occupied(mark));
        }
    }

    #[test]
    fn test_single_mark_no_win() {
        let mut grid = Grid::new(10);
        place(&mut grid, &[(5, 5)], Mark::X);
        assert!(!check_win(&grid, Position::new(5, 5), Mark::X, 5));
        assert_eq!(longest_run(&grid, Position::new(5, 5), Mark::X), 1);
    }

    #[test]
    fn test_four_in_a_row_no_win() {
        let mut grid = Grid::new(10);
        place(&mut grid, &[(2, 0), (2, 1), (2, 2), (2, 3)], Mark::X);
        assert!(!check_win(&grid, Position::new(2, 3), Mark::X, 5));
    }

    #[test]
    fn test_five_horizontal_wins() {
        let mut grid = Grid::new(10);
        place(
            &mut grid,
            &[(2, 0), (2, 1), (2, 2), (2, 3), (2, 4)],
            Mark::X,
        );
        assert!(check_win(&grid, Position::new(2, 4), Mark::X, 5));
    }

    #[test]
    fn test_five_vertical_wins_from_middle() {
        let mut grid = Grid::new(10);
        place(
            &mut grid,
            &[(3, 6), (4, 6), (5, 6), (6, 6), (7, 6)],
            Mark::O,
        );
        // Last stone placed in the middle of the run.
        assert!(check_win(&grid, Position::new(5, 6), Mark::O, 5));
    }

    #[test]
    fn test_main_diagonal_wins() {
        let mut grid = Grid::new(10);
        place(
            &mut grid,
            &[(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)],
            Mark::X,
        );
        assert!(check_win(&grid, Position::new(0, 0), Mark::X, 5));
    }

    #[test]
    fn test_anti_diagonal_wins() {
        let mut grid = Grid::new(10);
        place(
            &mut grid,
            &[(0, 9), (1, 8), (2, 7), (3, 6), (4, 5)],
            Mark::O,
        );
        assert!(check_win(&grid, Position::new(2, 7), Mark::O, 5));
    }

    #[test]
    fn test_run_along_bottom_edge_wins() {
        let mut grid = Grid::new(10);
        place(
            &mut grid,
            &[(9, 5), (9, 6), (9, 7), (9, 8), (9, 9)],
            Mark::X,
        );
        assert!(check_win(&grid, Position::new(9, 9), Mark::X, 5));
    }

    #[test]
    fn test_run_in_corner_stops_at_edge() {
        let mut grid = Grid::new(10);
        place(&mut grid, &[(9, 6), (9, 7), (9, 8), (9, 9)], Mark::X);
        assert!(!check_win(&grid, Position::new(9, 9), Mark::X, 5));
    }

    #[test]
    fn test_opponent_mark_breaks_run() {
        let mut grid = Grid::new(10);
        place(&mut grid, &[(4, 0), (4, 1), (4, 3), (4, 4)], Mark::X);
        place(&mut grid, &[(4, 2)], Mark::O);
        assert!(!check_win(&grid, Position::new(4, 4), Mark::X, 5));
    }

    #[test]
    fn test_longer_run_still_wins() {
        let mut grid = Grid::new(10);
        place(
            &mut grid,
            &[(0, 0), (0, 1), (0, 2), (0, 3), (0, 4), (0, 5)],
            Mark::X,
        );
        assert!(check_win(&grid, Position::new(0, 5), Mark::X, 5));
    }
}
