//! Search constants.
//!
//! Score scale, pruning parameters and move-ordering bands used by the
//! alpha-beta search.

use crate::board::MAX_PLY;

// ============================================================================
// SCORES
// ============================================================================

/// Score of a side that delivers mate at the root
pub const MATE_SCORE: i32 = 32000;

/// Scores with absolute value >= this are mate scores
pub const MATE_THRESHOLD: i32 = MATE_SCORE - MAX_PLY as i32;

/// Bound wider than any reachable score
pub const INFINITY: i32 = 32001;

pub const DRAW_SCORE: i32 = 0;

// ============================================================================
// SEARCH LIMITS
// ============================================================================

/// Depth ceiling when the caller sets no depth limit
pub const MAX_SEARCH_DEPTH: u32 = 64;

/// Safety cap on quiescence plies below the horizon
pub const MAX_QSEARCH_PLY: i32 = 16;

/// Cancellation is polled when `nodes & NODE_POLL_MASK == 0`
pub const NODE_POLL_MASK: u64 = 1023;

// ============================================================================
// PRUNING AND REDUCTIONS
// ============================================================================

/// Minimum remaining depth for null-move pruning
pub const NULL_MOVE_MIN_DEPTH: i32 = 3;

/// Null-move reduction is `NULL_MOVE_BASE_REDUCTION + depth / NULL_MOVE_DEPTH_DIVISOR`
pub const NULL_MOVE_BASE_REDUCTION: i32 = 2;
pub const NULL_MOVE_DEPTH_DIVISOR: i32 = 4;

/// Moves searched at full depth before LMR kicks in
pub const LMR_FULL_DEPTH_MOVES: usize = 3;

/// Minimum remaining depth for LMR
pub const LMR_MIN_DEPTH: i32 = 3;

/// Move index and depth from which the reduction grows to two plies
pub const LMR_DEEP_MOVE_INDEX: usize = 10;
pub const LMR_DEEP_MIN_DEPTH: i32 = 6;

/// Quiescence searches a capture only if `see >= QS_SEE_BASE + QS_SEE_STEP * qply`
pub const QS_SEE_BASE: i32 = 0;
pub const QS_SEE_STEP: i32 = 25;

// ============================================================================
// MOVE ORDERING PRIORITIES
// ============================================================================
// Higher scores are tried earlier.

pub const TT_MOVE_SCORE: i32 = 1_000_000;
pub const GOOD_CAPTURE_SCORE: i32 = 200_000;
pub const QUEEN_PROMOTION_SCORE: i32 = 150_000;
pub const KILLER1_SCORE: i32 = 100_000;
pub const KILLER2_SCORE: i32 = 90_000;
pub const CHECK_SCORE: i32 = 80_000;
pub const CASTLE_SCORE: i32 = 70_000;
pub const LOSING_CAPTURE_SCORE: i32 = -200_000;
pub const UNDER_PROMOTION_SCORE: i32 = -300_000;

/// History scores stay within `[-HISTORY_MAX, HISTORY_MAX]`
pub const HISTORY_MAX: i32 = 16384;
