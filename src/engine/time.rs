//! Time management.
//!
//! Converts the clock situation sent by the front-end into the soft and hard
//! deadlines the search consumes. The search itself knows nothing about
//! clocks, increments or moves-to-go.

use std::time::{Duration, Instant};

/// Time threshold below which we enter "panic mode" (in ms)
const PANIC_THRESHOLD_MS: u64 = 5000;

/// Minimum moves-to-go estimate to avoid over-thinking
const MIN_MOVES_TO_GO: u64 = 10;

/// Safety margin added to overhead for critical time detection
const CRITICAL_TIME_MARGIN_MS: u64 = 50;

/// Panic mode: divisors of the remaining time for the soft and hard limits
const PANIC_SOFT_DIVISOR: u64 = 20;
const PANIC_HARD_DIVISOR: u64 = 5;

/// Time thresholds for moves-to-go estimation (in ms)
const LONG_TIME_CONTROL_MS: u64 = 300_000;
const MEDIUM_TIME_CONTROL_MS: u64 = 60_000;

/// Estimated moves for different time controls
const LONG_MOVES_ESTIMATE: u64 = 40;
const MEDIUM_MOVES_ESTIMATE: u64 = 30;
const SHORT_MOVES_ESTIMATE: u64 = 25;

/// Cap on the soft and hard limits as a percentage of the safe remaining time
const SOFT_TIME_PERCENT: u64 = 40;
const HARD_TIME_PERCENT: u64 = 75;

/// Time control settings for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeControl {
    /// No time limit; the search runs until stopped or a depth/node limit hits
    #[default]
    Infinite,
    /// Fixed time per move
    MoveTime { time_ms: u64 },
    /// Remaining clock time and increment for the side to move
    Incremental {
        time_left_ms: u64,
        inc_ms: u64,
        movestogo: Option<u64>,
    },
}

impl TimeControl {
    /// Create a new incremental time control from Duration values.
    #[must_use]
    pub fn incremental(time_left: Duration, inc: Duration, movestogo: Option<u64>) -> Self {
        TimeControl::Incremental {
            time_left_ms: time_left.as_millis() as u64,
            inc_ms: inc.as_millis() as u64,
            movestogo,
        }
    }

    /// Create a fixed move time control from Duration.
    #[must_use]
    pub fn move_time(time: Duration) -> Self {
        TimeControl::MoveTime {
            time_ms: time.as_millis() as u64,
        }
    }

    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        matches!(self, TimeControl::Infinite)
    }

    /// Soft and hard limits in milliseconds, `None` when unlimited.
    ///
    /// The move overhead is reserved for communication latency.
    #[must_use]
    pub fn compute_limits(&self, move_overhead_ms: u64) -> Option<(u64, u64)> {
        match *self {
            TimeControl::Infinite => None,
            TimeControl::MoveTime { time_ms } => {
                // Spend the whole move time but leave room to answer
                let hard = time_ms.saturating_sub(move_overhead_ms).max(1);
                Some((hard, hard))
            }
            TimeControl::Incremental {
                time_left_ms,
                inc_ms,
                movestogo,
            } => Some(compute_incremental_limits(
                time_left_ms,
                inc_ms,
                movestogo,
                move_overhead_ms,
            )),
        }
    }
}

/// Compute soft and hard time limits for incremental time control.
fn compute_incremental_limits(
    time_left_ms: u64,
    inc_ms: u64,
    movestogo: Option<u64>,
    move_overhead_ms: u64,
) -> (u64, u64) {
    let safe_ms = time_left_ms.saturating_sub(move_overhead_ms);

    // Critical time: less than overhead + safety margin
    if time_left_ms <= move_overhead_ms.saturating_add(CRITICAL_TIME_MARGIN_MS) {
        let fallback = (time_left_ms / 4).max(1);
        return (fallback, fallback);
    }

    // Panic mode: use very little time when running low
    if safe_ms < PANIC_THRESHOLD_MS {
        let soft = (safe_ms / PANIC_SOFT_DIVISOR + inc_ms / 2).max(1);
        let hard = (safe_ms / PANIC_HARD_DIVISOR).max(soft);
        return (soft.min(hard), hard);
    }

    // Estimate moves to go if not provided
    let moves_to_go = movestogo
        .unwrap_or(if safe_ms > LONG_TIME_CONTROL_MS {
            LONG_MOVES_ESTIMATE
        } else if safe_ms > MEDIUM_TIME_CONTROL_MS {
            MEDIUM_MOVES_ESTIMATE
        } else {
            SHORT_MOVES_ESTIMATE
        })
        .max(MIN_MOVES_TO_GO);

    let base_time = safe_ms / moves_to_go + inc_ms;

    let soft_cap = safe_ms * SOFT_TIME_PERCENT / 100;
    let hard_cap = safe_ms * HARD_TIME_PERCENT / 100;

    let soft_ms = base_time.min(soft_cap).max(1);
    let hard_ms = (soft_ms * 3).min(hard_cap).max(soft_ms);

    (soft_ms, hard_ms)
}

/// Resolve a time control into `(soft, hard)` deadlines measured from `now`.
#[must_use]
pub fn compute_deadlines(
    tc: &TimeControl,
    now: Instant,
    move_overhead_ms: u64,
) -> (Option<Instant>, Option<Instant>) {
    match tc.compute_limits(move_overhead_ms) {
        None => (None, None),
        Some((soft_ms, hard_ms)) => {
            let hard = now + Duration::from_millis(hard_ms);
            // A fixed move time uses the whole budget: no soft stop
            let soft = match tc {
                TimeControl::MoveTime { .. } => None,
                _ => Some(now + Duration::from_millis(soft_ms)),
            };
            (soft, Some(hard))
        }
    }
}
