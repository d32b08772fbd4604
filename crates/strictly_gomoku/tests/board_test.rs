//! Tests for board moves, win detection, and the wire shape.

use strictly_gomoku::{Board, Cell, GameStatus, Grid, Mark, Move, MoveError, Rules};

#[test]
fn test_every_cell_accepts_one_mark() {
    for row in 0..10 {
        for col in 0..10 {
            let mut board = Board::default();
            let before = board.grid().clone();
            board.apply_move(Move::at(row, col, Mark::O)).unwrap();

            assert_eq!(board.cell(row, col), Some(Cell::Occupied(Mark::O)));
            assert_eq!(board.occupied(), 1);
            for (i, (old, new)) in before.cells().iter().zip(board.grid().cells()).enumerate() {
                if i != row * 10 + col {
                    assert_eq!(old, new, "cell {i} changed");
                }
            }
        }
    }
}

#[test]
fn test_second_move_on_same_cell_is_rejected() {
    let mut board = Board::default();
    board.apply_move(Move::at(7, 7, Mark::X)).unwrap();
    let snapshot = board.serialize();

    for mark in [Mark::X, Mark::O] {
        let result = board.apply_move(Move::at(7, 7, mark));
        assert!(matches!(result, Err(MoveError::CellOccupied { .. })));
    }
    assert_eq!(board.serialize(), snapshot);
    assert_eq!(board.moves(), 1);
}

#[test]
fn test_out_of_range_coordinates() {
    let mut board = Board::default();
    for (row, col) in [(10, 0), (0, 10), (usize::MAX, 3), (42, 42)] {
        let result = board.apply_move(Move::at(row, col, Mark::X));
        assert!(matches!(result, Err(MoveError::OutOfBounds { .. })));
    }
    assert_eq!(board.occupied(), 0);
}

#[test]
fn test_exactly_four_does_not_win() {
    let mut board = Board::default();
    for row in 0..4 {
        let outcome = board.apply_move(Move::at(row, 9, Mark::O)).unwrap();
        assert_eq!(outcome.winner, None);
    }
    assert_eq!(board.status(), GameStatus::InProgress);
}

#[test]
fn test_gap_filled_in_middle_wins() {
    let mut board = Board::default();
    for col in [0, 1, 3, 4] {
        board.apply_move(Move::at(6, col, Mark::X)).unwrap();
    }
    let outcome = board.apply_move(Move::at(6, 2, Mark::X)).unwrap();
    assert_eq!(outcome.winner, Some(Mark::X));
}

#[test]
fn test_diagonal_through_corner() {
    let mut board = Board::default();
    for i in 5..9 {
        board.apply_move(Move::at(i, i, Mark::O)).unwrap();
    }
    let outcome = board.apply_move(Move::at(9, 9, Mark::O)).unwrap();
    assert_eq!(outcome.winner, Some(Mark::O));
    assert!(board.check_win(9, 9, Mark::O));
    assert!(!board.check_win(9, 9, Mark::X));
}

#[test]
fn test_custom_rules() {
    let mut board = Board::new(Rules::new(15, 3));
    board.apply_move(Move::at(14, 12, Mark::X)).unwrap();
    board.apply_move(Move::at(14, 13, Mark::X)).unwrap();
    let outcome = board.apply_move(Move::at(14, 14, Mark::X)).unwrap();
    assert_eq!(outcome.winner, Some(Mark::X));
    assert_eq!(board.serialize().matches(',').count(), 225);
}

#[test]
fn test_serialize_parse_roundtrip_mixed_board() {
    let mut board = Board::default();
    let moves = [
        (0, 0, Mark::X),
        (0, 1, Mark::O),
        (5, 5, Mark::X),
        (9, 0, Mark::O),
        (3, 8, Mark::X),
    ];
    for (row, col, mark) in moves {
        board.apply_move(Move::at(row, col, mark)).unwrap();
    }

    let wire = board.serialize();
    assert!(wire.starts_with("X,O,-,"));
    assert!(wire.ends_with("-,"));

    let parsed = Grid::parse(&wire, 10).unwrap();
    assert_eq!(&parsed, board.grid());
}

#[test]
fn test_reset_clears_everything() {
    let mut board = Board::default();
    board.apply_move(Move::at(1, 1, Mark::X)).unwrap();
    board.apply_move(Move::at(1, 2, Mark::O)).unwrap();
    board.reset();

    assert_eq!(board.occupied(), 0);
    assert_eq!(board.moves(), 0);
    assert_eq!(board.next_mark(), Mark::X);
    assert_eq!(board.serialize(), Grid::new(10).serialize());
}
