//! Chess board representation, move generation and search.
//!
//! Uses bitboards and magic sliding attacks for fully legal move generation,
//! a reversible make/unmake state stack, and an iterative-deepening
//! alpha-beta search on top of them.
//!
//! # Example
//! ```
//! use chess_search::board::Position;
//!
//! let mut pos = Position::startpos();
//! let moves = pos.legal_moves();
//! println!("Starting position has {} legal moves", moves.len());
//! assert_eq!(pos.perft(2), 400);
//! ```

mod attack_tables;
mod error;
mod eval;
mod fen;
mod make_unmake;
mod movegen;
mod search;
mod see;
mod state;
mod types;

#[cfg(test)]
mod tests;

// Public API - types users need
pub use error::{FenError, MoveParseError, SquareError};
pub use eval::{Evaluator, MaterialEvaluator, PestoEvaluator};
pub use movegen::GenType;
pub use state::{Position, StateInfo, START_FEN};
pub use types::{
    Bitboard, BitboardIter, CastlingRights, Color, Move, MoveList, MoveListIntoIter, Piece,
    ScoredMove, ScoredMoveList, Square, MAX_PLY,
};

// Public API - search functions and configuration
pub use search::smp::{smp_search, SmpConfig};
pub use search::{
    find_best_move, search, HistoryTable, KillerTable, SearchInfoCallback, SearchIterationInfo,
    SearchLimits, SearchResult, SearchTables, DEFAULT_TT_MB, DRAW_SCORE, INFINITY, MATE_SCORE,
    MATE_THRESHOLD, MAX_SEARCH_DEPTH,
};

/// Force construction of the attack tables and Zobrist keys.
///
/// Optional: everything is built lazily on first use. Calling this up front
/// keeps the one-time cost out of the first search.
pub fn init() {
    attack_tables::init();
    once_cell::sync::Lazy::force(&crate::zobrist::ZOBRIST);
}
