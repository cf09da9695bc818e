//! Engine controller for managing search and game state.
//!
//! Owns the current position and the transposition table, runs searches on a
//! background thread and turns clock information into search deadlines. The
//! UCI front-end talks to the engine only through this module.

mod controller;
pub mod time;

pub use controller::{
    EngineConfig, EngineController, EngineError, GoRequest, PositionRequest, SearchJob,
};
pub use time::{compute_deadlines, TimeControl};
