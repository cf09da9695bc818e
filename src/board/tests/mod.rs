//! Board module tests.
//!
//! Tests are organized into separate files by category:
//! - `perft.rs` - Performance tests for move generation
//! - `make_unmake.rs` - Make/unmake move correctness
//! - `hashing.rs` - Zobrist key maintenance
//! - `draw.rs` - Draw detection (50-move, repetition, insufficient material)
//! - `checkmate.rs` - Mate and stalemate detection
//! - `proptest.rs` - Property-based tests

use crate::board::{Move, Position};

mod checkmate;
mod hashing;
mod perft;

fn pos(fen: &str) -> Position {
    Position::from_fen(fen).unwrap()
}

/// Resolve coordinate text against the legal moves of `pos`.
fn mv(pos: &Position, text: &str) -> Move {
    pos.parse_move(text)
        .unwrap_or_else(|e| panic!("{text} in {}: {e}", pos.to_fen()))
}

fn play(pos: &mut Position, moves: &[&str]) {
    for text in moves {
        pos.make_move_text(text).unwrap();
    }
}
