//! Castling rights type.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::piece::Color;
use super::square::Square;

pub(crate) const CASTLE_WHITE_K: u8 = 1 << 0;
pub(crate) const CASTLE_WHITE_Q: u8 = 1 << 1;
pub(crate) const CASTLE_BLACK_K: u8 = 1 << 2;
pub(crate) const CASTLE_BLACK_Q: u8 = 1 << 3;

/// All castling rights combined
pub(crate) const ALL_CASTLING_RIGHTS: u8 =
    CASTLE_WHITE_K | CASTLE_WHITE_Q | CASTLE_BLACK_K | CASTLE_BLACK_Q;

/// Castling rights represented as a 4-bit mask (K/Q for each color)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CastlingRights(u8);

impl CastlingRights {
    /// No castling rights
    #[must_use]
    pub const fn none() -> Self {
        CastlingRights(0)
    }

    /// All castling rights (both sides can castle kingside and queenside)
    #[must_use]
    pub const fn all() -> Self {
        CastlingRights(ALL_CASTLING_RIGHTS)
    }

    /// Check if a specific castling right is set
    #[inline]
    #[must_use]
    pub const fn has(self, color: Color, kingside: bool) -> bool {
        self.0 & Self::bit_for(color, kingside) != 0
    }

    /// Set a specific castling right
    #[inline]
    pub fn set(&mut self, color: Color, kingside: bool) {
        self.0 |= Self::bit_for(color, kingside);
    }

    /// Remove a specific castling right
    #[inline]
    pub fn remove(&mut self, color: Color, kingside: bool) {
        self.0 &= !Self::bit_for(color, kingside);
    }

    /// Drop every right that a move touching `sq` invalidates
    #[inline]
    pub fn update_for_square(&mut self, sq: Square) {
        self.0 &= CASTLING_KEEP[sq.index()];
    }

    /// Get the raw bitmask value (for Zobrist hashing)
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Create from raw bitmask value
    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        CastlingRights(value & ALL_CASTLING_RIGHTS)
    }

    #[inline]
    const fn bit_for(color: Color, kingside: bool) -> u8 {
        match (color, kingside) {
            (Color::White, true) => CASTLE_WHITE_K,
            (Color::White, false) => CASTLE_WHITE_Q,
            (Color::Black, true) => CASTLE_BLACK_K,
            (Color::Black, false) => CASTLE_BLACK_Q,
        }
    }
}

/// Rights kept when a piece leaves or arrives on each square
const CASTLING_KEEP: [u8; 64] = {
    let mut table = [ALL_CASTLING_RIGHTS; 64];
    table[0] = ALL_CASTLING_RIGHTS & !CASTLE_WHITE_Q;
    table[4] = ALL_CASTLING_RIGHTS & !(CASTLE_WHITE_K | CASTLE_WHITE_Q);
    table[7] = ALL_CASTLING_RIGHTS & !CASTLE_WHITE_K;
    table[56] = ALL_CASTLING_RIGHTS & !CASTLE_BLACK_Q;
    table[60] = ALL_CASTLING_RIGHTS & !(CASTLE_BLACK_K | CASTLE_BLACK_Q);
    table[63] = ALL_CASTLING_RIGHTS & !CASTLE_BLACK_K;
    table
};

/// Fixed geometry of one castling move.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CastlePath {
    pub right_kingside: bool,
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
    /// Squares that must be empty (between king and rook)
    pub travel: u64,
    /// Squares the king stands on or crosses; none may be attacked
    pub safe: u64,
}

const fn sq(idx: u8) -> Square {
    Square::from_index(idx as usize)
}

/// Castling paths indexed by `[color][kingside as usize]`
pub(crate) const CASTLE_PATHS: [[CastlePath; 2]; 2] = [
    [
        CastlePath {
            right_kingside: false,
            king_from: sq(4),
            king_to: sq(2),
            rook_from: sq(0),
            rook_to: sq(3),
            travel: (1 << 1) | (1 << 2) | (1 << 3),
            safe: (1 << 4) | (1 << 3) | (1 << 2),
        },
        CastlePath {
            right_kingside: true,
            king_from: sq(4),
            king_to: sq(6),
            rook_from: sq(7),
            rook_to: sq(5),
            travel: (1 << 5) | (1 << 6),
            safe: (1 << 4) | (1 << 5) | (1 << 6),
        },
    ],
    [
        CastlePath {
            right_kingside: false,
            king_from: sq(60),
            king_to: sq(58),
            rook_from: sq(56),
            rook_to: sq(59),
            travel: (1 << 57) | (1 << 58) | (1 << 59),
            safe: (1 << 60) | (1 << 59) | (1 << 58),
        },
        CastlePath {
            right_kingside: true,
            king_from: sq(60),
            king_to: sq(62),
            rook_from: sq(63),
            rook_to: sq(61),
            travel: (1 << 61) | (1 << 62),
            safe: (1 << 60) | (1 << 61) | (1 << 62),
        },
    ],
];

/// Look up the castling path for a king move already known to be a castle
#[inline]
pub(crate) fn castle_path(color: Color, king_to: Square) -> &'static CastlePath {
    let kingside = king_to.file() == 6;
    &CASTLE_PATHS[color.index()][kingside as usize]
}
