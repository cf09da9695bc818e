//! Zobrist hashing for chess positions.
//!
//! Provides incrementally-updatable 64-bit position hashes for transposition tables.
//! Keys are drawn once from a fixed-seed generator so hashes are reproducible
//! across runs.

use once_cell::sync::Lazy;
use rand::prelude::*;

use crate::board::{CastlingRights, Color, Piece, Square};

pub(crate) struct ZobristKeys {
    // piece_keys[color][piece][square]
    pub(crate) piece_keys: [[[u64; 64]; 6]; 2],
    pub(crate) black_to_move_key: u64,
    // One key per castling-rights mask so a rights change is a single XOR pair
    pub(crate) castling_keys: [u64; 16],
    // en_passant_keys[file_index] (only file matters for EP target)
    pub(crate) en_passant_keys: [u64; 8],
}

impl ZobristKeys {
    fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(1234567890_u64); // Use a fixed seed for reproducibility
        let mut piece_keys = [[[0; 64]; 6]; 2];
        let mut castling_keys = [0; 16];
        let mut en_passant_keys = [0; 8];

        for color in &mut piece_keys {
            for piece in color.iter_mut() {
                for key in piece.iter_mut() {
                    *key = rng.gen();
                }
            }
        }

        let black_to_move_key = rng.gen();

        // Mask 0 hashes to nothing so "no rights" leaves the key untouched
        for key in castling_keys.iter_mut().skip(1) {
            *key = rng.gen();
        }

        for key in &mut en_passant_keys {
            *key = rng.gen();
        }

        ZobristKeys {
            piece_keys,
            black_to_move_key,
            castling_keys,
            en_passant_keys,
        }
    }
}

// Initialize Zobrist keys lazily and globally
pub(crate) static ZOBRIST: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::new);

#[inline]
pub(crate) fn piece_key(color: Color, piece: Piece, sq: Square) -> u64 {
    ZOBRIST.piece_keys[color.index()][piece.index()][sq.index()]
}

#[inline]
pub(crate) fn castling_key(rights: CastlingRights) -> u64 {
    ZOBRIST.castling_keys[rights.as_u8() as usize]
}

#[inline]
pub(crate) fn en_passant_key(file: u8) -> u64 {
    ZOBRIST.en_passant_keys[file as usize]
}

#[inline]
pub(crate) fn side_key() -> u64 {
    ZOBRIST.black_to_move_key
}
