//! Core chess types.
//!
//! This module contains the fundamental types used throughout the engine:
//! - `Piece` and `Color` - chess piece types and colors
//! - `Square` - compact board square (u8 index)
//! - `Bitboard` - 64-bit square set
//! - `Move` and `MoveList` - packed move representation
//! - `CastlingRights` - castling state

mod bitboard;
mod castling;
mod moves;
mod piece;
mod square;

pub use bitboard::{Bitboard, BitboardIter};
pub use castling::CastlingRights;
pub use moves::{Move, MoveList, MoveListIntoIter, ScoredMove, ScoredMoveList, MAX_PLY};
pub use piece::{Color, Piece};
pub use square::Square;

pub(crate) use castling::{castle_path, CASTLE_PATHS};
