//! Attack tables for move generation.
//!
//! Knights, kings and pawns use plain 64-entry tables. Bishops and rooks
//! use magic bitboards (see [`magic`]); queens are the union of both. All
//! tables are process-wide, built on first use and never mutated again.

#![allow(clippy::inline_always)] // Performance-critical hot path functions

mod magic;
mod tables;

use super::types::{Bitboard, Color, Piece, Square};
use magic::SLIDERS;
use tables::{GEOMETRY, KING_ATTACKS, KNIGHT_ATTACKS, PAWN_ATTACKS};

/// Build every table now instead of on first lookup.
///
/// Panics if a fixed magic constant maps two blocker sets with different
/// attacks to the same slot.
pub fn init() {
    once_cell::sync::Lazy::force(&SLIDERS);
    once_cell::sync::Lazy::force(&GEOMETRY);
    once_cell::sync::Lazy::force(&KNIGHT_ATTACKS);
    once_cell::sync::Lazy::force(&KING_ATTACKS);
    once_cell::sync::Lazy::force(&PAWN_ATTACKS);
}

#[inline(always)]
#[must_use]
pub fn knight_attacks(sq: Square) -> Bitboard {
    Bitboard(KNIGHT_ATTACKS[sq.index()])
}

#[inline(always)]
#[must_use]
pub fn king_attacks(sq: Square) -> Bitboard {
    Bitboard(KING_ATTACKS[sq.index()])
}

/// Squares a pawn of `color` standing on `sq` attacks
#[inline(always)]
#[must_use]
pub fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    Bitboard(PAWN_ATTACKS[color.index()][sq.index()])
}

#[inline(always)]
#[must_use]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    Bitboard(SLIDERS.bishop(sq.index(), occupied.0))
}

#[inline(always)]
#[must_use]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    Bitboard(SLIDERS.rook(sq.index(), occupied.0))
}

#[inline(always)]
#[must_use]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

/// Attack set of any piece; `color` only matters for pawns.
#[inline]
#[must_use]
pub fn piece_attacks(piece: Piece, color: Color, sq: Square, occupied: Bitboard) -> Bitboard {
    match piece {
        Piece::Pawn => pawn_attacks(color, sq),
        Piece::Knight => knight_attacks(sq),
        Piece::Bishop => bishop_attacks(sq, occupied),
        Piece::Rook => rook_attacks(sq, occupied),
        Piece::Queen => queen_attacks(sq, occupied),
        Piece::King => king_attacks(sq),
    }
}

/// Squares strictly between two aligned squares (empty if not aligned)
#[inline(always)]
#[must_use]
pub fn between(a: Square, b: Square) -> Bitboard {
    Bitboard(GEOMETRY.between[a.index()][b.index()])
}

/// Full line through two aligned squares (empty if not aligned)
#[inline(always)]
#[must_use]
pub fn line(a: Square, b: Square) -> Bitboard {
    Bitboard(GEOMETRY.line[a.index()][b.index()])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn queen_is_union_of_bishop_and_rook() {
        let occ = Bitboard(0x0000_1234_5678_0000);
        let d4 = sq("d4");
        assert_eq!(
            queen_attacks(d4, occ),
            bishop_attacks(d4, occ) | rook_attacks(d4, occ)
        );
    }

    #[test]
    fn open_board_slider_counts() {
        assert_eq!(rook_attacks(sq("d4"), Bitboard::EMPTY).popcount(), 14);
        assert_eq!(bishop_attacks(sq("d4"), Bitboard::EMPTY).popcount(), 13);
        assert_eq!(queen_attacks(sq("a1"), Bitboard::EMPTY).popcount(), 21);
    }

    #[test]
    fn init_is_idempotent() {
        init();
        init();
        assert_eq!(knight_attacks(sq("g1")).popcount(), 3);
    }

    #[test]
    fn line_contains_endpoints() {
        let l = line(sq("b2"), sq("d4"));
        assert!(l.contains(sq("a1")));
        assert!(l.contains(sq("h8")));
        assert!(between(sq("b2"), sq("d4")).contains(sq("c3")));
    }
}
