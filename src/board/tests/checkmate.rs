//! Mate and stalemate detection tests.

use super::{play, pos};
use crate::board::{GenType, Position};

#[test]
fn fools_mate() {
    let mut board = Position::startpos();
    play(&mut board, &["f2f3", "e7e5", "g2g4", "d8h4"]);
    assert!(board.in_check());
    assert!(board.is_checkmate());
    assert!(!board.is_stalemate());
    assert!(board.legal_moves().is_empty());
}

#[test]
fn back_rank_mate() {
    let board = pos("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1");
    assert!(board.is_checkmate());
}

#[test]
fn queen_mate_on_edge() {
    let board = pos("7k/7Q/7K/8/8/8/8/8 b - - 0 1");
    assert!(board.is_checkmate());
    assert!(board.generate(GenType::Captures).is_empty());
}

#[test]
fn stalemate_is_not_mate() {
    let board = pos("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
    assert!(!board.in_check());
    assert!(board.is_stalemate());
    assert!(!board.is_checkmate());
}

#[test]
fn check_with_escape_is_not_mate() {
    let board = pos("5k2/8/8/8/8/8/8/4KR2 b - - 0 1");
    assert!(board.in_check());
    assert!(!board.is_checkmate());
    let king = board.king_square(board.side_to_move());
    assert!(board.legal_moves().iter().all(|m| m.from() == king));
}
