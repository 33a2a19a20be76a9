//! Unit tests for the move and state evaluation terms.

use super::*;
use crate::game::board::Cell;

/// 4x4 opening plus a White disc on B1 and a Black disc on C1, making the
/// A1 corner a legal capture for Black.
fn board_with_open_corner() -> Board {
    let mut board = Board::new(4).unwrap();
    board.place(board.point(1, 0), Cell::White);
    board.place(board.point(2, 0), Cell::Black);
    board
}

#[test]
fn corner_capture_outscores_ordinary_moves() {
    let mut board = board_with_open_corner();
    let corner = board.point(0, 0);
    assert!(board.is_legal(corner));

    let corner_value = evaluate_move(&mut board, corner);
    for m in board.legal_moves() {
        if m == corner {
            continue;
        }
        assert!(
            corner_value > evaluate_move(&mut board, m),
            "corner should outscore {}",
            board.point_to_str(m)
        );
    }
}

#[test]
fn evaluate_move_leaves_the_board_untouched() {
    let mut board = Board::new(4).unwrap();
    let before = (board.to_string(), board.history_len());
    for m in board.legal_moves() {
        evaluate_move(&mut board, m);
    }
    assert_eq!((board.to_string(), board.history_len()), before);
}

#[test]
fn evaluate_move_is_deterministic() {
    let mut board = Board::new(6).unwrap();
    let m = board.legal_moves()[0];
    assert_eq!(evaluate_move(&mut board, m), evaluate_move(&mut board, m));
}

#[test]
fn open_corner_raises_the_state_score() {
    let plain = Board::new(4).unwrap();
    let with_corner = board_with_open_corner();
    assert!(evaluate_state(&with_corner) > evaluate_state(&plain));
}

#[test]
fn fewer_opponent_replies_score_higher() {
    // On the 2x2 terminal board the opponent has no replies at all; that
    // should never score below the busy 4x4 opening.
    let terminal = Board::new(2).unwrap();
    let opening = Board::new(4).unwrap();
    assert!(evaluate_state(&terminal) > evaluate_state(&opening));
}
