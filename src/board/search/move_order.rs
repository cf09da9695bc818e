//! Move ordering for search.
//!
//! Every candidate gets a signed score and the list is sorted descending.
//! Bands, best first: TT move, winning or equal captures, queen promotions,
//! killers, checks, castling, quiet history, losing captures, under-promotions.

use super::constants::{
    CASTLE_SCORE, CHECK_SCORE, GOOD_CAPTURE_SCORE, KILLER1_SCORE, KILLER2_SCORE,
    LOSING_CAPTURE_SCORE, QUEEN_PROMOTION_SCORE, TT_MOVE_SCORE, UNDER_PROMOTION_SCORE,
};
use super::{HistoryTable, KillerTable};
use crate::board::{Move, MoveList, Piece, Position, ScoredMoveList};

/// Score a single move for ordering.
pub(super) fn score_move(
    pos: &Position,
    mv: Move,
    tt_move: Move,
    killers: &KillerTable,
    history: &HistoryTable,
    ply: usize,
) -> i32 {
    if !tt_move.is_null() && mv == tt_move {
        return TT_MOVE_SCORE;
    }

    if pos.is_capture(mv) {
        let see = pos.see(mv);
        return if see >= 0 {
            GOOD_CAPTURE_SCORE + see
        } else {
            LOSING_CAPTURE_SCORE + see
        };
    }

    if let Some(promo) = mv.promotion_piece() {
        return if promo == Piece::Queen {
            QUEEN_PROMOTION_SCORE
        } else {
            UNDER_PROMOTION_SCORE
        };
    }

    if mv == killers.primary(ply) {
        KILLER1_SCORE
    } else if mv == killers.secondary(ply) {
        KILLER2_SCORE
    } else if pos.gives_check(mv) {
        CHECK_SCORE
    } else if mv.is_castle() {
        CASTLE_SCORE
    } else {
        history.score(pos.side_to_move(), mv)
    }
}

/// Score and sort a move list, best first.
pub(super) fn order_moves(
    pos: &Position,
    moves: &MoveList,
    tt_move: Move,
    killers: &KillerTable,
    history: &HistoryTable,
    ply: usize,
) -> ScoredMoveList {
    let mut scored = ScoredMoveList::new();
    for &mv in moves {
        scored.push(mv, score_move(pos, mv, tt_move, killers, history, ply));
    }
    scored.sort_by_score_desc();
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::GenType;

    fn ordered(fen: &str, tt_move: Move, killers: &KillerTable) -> Vec<(Move, i32)> {
        let pos = Position::from_fen(fen).expect("valid fen");
        let moves = pos.generate(GenType::All);
        let history = HistoryTable::new();
        order_moves(&pos, &moves, tt_move, killers, &history, 0)
            .iter()
            .map(|s| (s.mv, s.score))
            .collect()
    }

    #[test]
    fn tt_move_comes_first() {
        let pos = Position::startpos();
        let tt_move = pos.parse_move("b1c3").unwrap();
        let list = ordered(
            &pos.to_fen(),
            tt_move,
            &KillerTable::new(),
        );
        assert_eq!(list[0], (tt_move, TT_MOVE_SCORE));
    }

    #[test]
    fn capture_bands_follow_see() {
        // Pawn takes free knight, queen takes defended pawn
        let fen = "k7/8/2p5/3p4/4Q3/7n/6P1/4K3 w - - 0 1";
        let pos = Position::from_fen(fen).unwrap();
        let list = ordered(fen, Move::NULL, &KillerTable::new());
        let good = pos.parse_move("g2h3").unwrap();
        let bad = pos.parse_move("e4d5").unwrap();

        assert_eq!(list[0], (good, GOOD_CAPTURE_SCORE + 320));
        let bad_score = list.iter().find(|(m, _)| *m == bad).unwrap().1;
        assert_eq!(bad_score, LOSING_CAPTURE_SCORE - 800);
        // Losing capture sorts below every quiet move
        assert!(list.iter().all(|&(m, s)| m == bad || s > bad_score));
    }

    #[test]
    fn promotions_split_by_piece() {
        let fen = "8/4P3/8/8/8/8/k7/4K3 w - - 0 1";
        let pos = Position::from_fen(fen).unwrap();
        let list = ordered(fen, Move::NULL, &KillerTable::new());
        assert_eq!(list[0].0, pos.parse_move("e7e8q").unwrap());
        assert_eq!(list[0].1, QUEEN_PROMOTION_SCORE);
        let last_three: Vec<i32> = list[list.len() - 3..].iter().map(|&(_, s)| s).collect();
        assert_eq!(last_three, vec![UNDER_PROMOTION_SCORE; 3]);
    }

    #[test]
    fn killers_rank_above_checks_and_castling() {
        let fen = "r3k3/8/8/8/8/8/8/R3K2R w KQ - 0 1";
        let pos = Position::from_fen(fen).unwrap();
        let killer = pos.parse_move("h1h7").unwrap();
        let mut killers = KillerTable::new();
        killers.update(0, killer);

        let list = ordered(fen, Move::NULL, &killers);
        let score_of = |text: &str| {
            let m = pos.parse_move(text).unwrap();
            list.iter().find(|(x, _)| *x == m).unwrap().1
        };
        assert_eq!(score_of("h1h7"), KILLER1_SCORE);
        assert_eq!(score_of("h1h8"), CHECK_SCORE);
        assert_eq!(score_of("e1g1"), CASTLE_SCORE);
        assert_eq!(score_of("e1f2"), 0);
    }
}
