//! Chess move generation and parallel alpha-beta search.
//!
//! `board` holds the position, legal move generation and the search,
//! `tt` the shared transposition table, `engine` the controller that runs
//! searches in the background and `uci` the text front-end.

pub mod board;
pub mod engine;
pub mod tt;
pub mod uci;
pub mod zobrist;

pub use board::{Color, Move, Piece, Position, SearchLimits, SearchResult, Square};
pub use engine::{EngineConfig, EngineController};
pub use tt::TranspositionTable;
