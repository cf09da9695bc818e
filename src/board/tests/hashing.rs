//! Zobrist key maintenance tests.

use super::{play, pos};
use crate::board::{Color, Position};
use rand::prelude::*;

#[test]
fn key_is_path_independent() {
    let mut a = Position::startpos();
    play(&mut a, &["g1f3", "g8f6", "b1c3", "b8c6"]);
    let mut b = Position::startpos();
    play(&mut b, &["b1c3", "b8c6", "g1f3", "g8f6"]);
    assert_eq!(a.key(), b.key());
    assert_eq!(a.pawn_key(), b.pawn_key());
}

#[test]
fn castling_rights_change_the_key() {
    let all = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    let some = pos("r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1");
    assert_ne!(all.key(), some.key());
    assert_eq!(all.pawn_key(), some.pawn_key());
}

#[test]
fn ep_file_changes_the_key() {
    let with_ep = pos("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
    let without = pos("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq - 0 3");
    assert_ne!(with_ep.key(), without.key());
}

#[test]
fn side_to_move_changes_the_key() {
    let white = pos("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
    let black = pos("4k3/8/8/8/8/8/8/4K3 b - - 0 1");
    assert_ne!(white.key(), black.key());
}

#[test]
fn incremental_keys_match_recompute_on_random_walks() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..20 {
        let mut board = Position::startpos();
        for _ in 0..80 {
            let moves = board.legal_moves();
            if moves.is_empty() {
                break;
            }
            let m = moves[rng.gen_range(0..moves.len())];
            board.make_move(m);
            let (key, pawn_key, non_pawn) = board.recompute_keys();
            assert_eq!(board.key(), key, "after {m} in {}", board.to_fen());
            assert_eq!(board.pawn_key(), pawn_key);
            assert_eq!(
                [board.non_pawn_key(Color::White), board.non_pawn_key(Color::Black)],
                non_pawn
            );
        }
    }
}

#[test]
fn fen_key_equals_played_key() {
    let mut played = Position::startpos();
    play(&mut played, &["e2e4", "c7c5", "g1f3"]);
    let parsed = pos(&played.to_fen());
    assert_eq!(played.key(), parsed.key());
}
