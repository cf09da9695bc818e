//! Search module implementing alpha-beta with iterative deepening.
//!
//! Features:
//! - Iterative deepening keeping the last completed iteration's move
//! - Negamax alpha-beta with PVS, null move pruning and LMR
//! - Check extensions and mate distance pruning
//! - Quiescence search with stand-pat and SEE pruning
//! - Move ordering (TT move, SEE captures, killers, checks, history)
//! - Transposition table for move ordering and cutoffs
//! - Lazy SMP parallel search support

mod constants;
mod move_order;
mod negamax;
pub mod smp;

use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::tt::TranspositionTable;

use super::eval::{Evaluator, PestoEvaluator};
use super::state::Position;
use super::types::{Color, Move, MAX_PLY};

pub use constants::{DRAW_SCORE, INFINITY, MATE_SCORE, MATE_THRESHOLD, MAX_SEARCH_DEPTH};
pub(crate) use constants::HISTORY_MAX;
use negamax::SearchContext;

/// Default transposition table size in MB
pub const DEFAULT_TT_MB: usize = 16;

/// Outcome of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchResult {
    /// Best move of the last completed iteration, or the first legal move
    /// when none completed. `None` only when the side to move has no moves.
    pub best_move: Option<Move>,
    /// Score of `best_move` from the side to move's point of view
    pub score: i32,
    /// Depth of the last completed iteration (0 if none completed)
    pub depth: u32,
    pub nodes: u64,
}

/// Budget for one search. Unset fields are unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    /// Checked between iterations: no new iteration starts after it
    pub soft_deadline: Option<Instant>,
    /// Polled inside the tree: the running iteration is abandoned
    pub hard_deadline: Option<Instant>,
}

impl SearchLimits {
    /// No limits at all; the search runs until stopped.
    #[must_use]
    pub fn infinite() -> Self {
        SearchLimits::default()
    }

    #[must_use]
    pub fn depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth.max(1));
        self
    }

    #[must_use]
    pub fn nodes(mut self, nodes: u64) -> Self {
        self.nodes = Some(nodes);
        self
    }

    /// Spend exactly `time` from now, abandoning the running iteration at the end.
    #[must_use]
    pub fn movetime(mut self, time: Duration) -> Self {
        self.hard_deadline = Some(Instant::now() + time);
        self
    }

    #[must_use]
    pub fn deadlines(mut self, soft: Option<Instant>, hard: Option<Instant>) -> Self {
        self.soft_deadline = soft;
        self.hard_deadline = hard;
        self
    }

    /// Deepest iteration this budget allows
    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.depth
            .unwrap_or(MAX_SEARCH_DEPTH)
            .min(MAX_SEARCH_DEPTH)
    }
}

/// Information about a completed search iteration.
#[derive(Debug, Clone)]
pub struct SearchIterationInfo {
    pub depth: u32,
    pub seldepth: u32,
    pub score: i32,
    pub nodes: u64,
    pub nps: u64,
    pub time_ms: u64,
    /// Transposition table fill in per mille
    pub hashfull: u32,
    pub pv: Vec<Move>,
}

impl SearchIterationInfo {
    /// Moves to mate (positive when the side to move mates), if `score` is a mate score.
    #[must_use]
    pub fn mate_in(&self) -> Option<i32> {
        if self.score >= MATE_THRESHOLD {
            Some((MATE_SCORE - self.score + 1) / 2)
        } else if self.score <= -MATE_THRESHOLD {
            Some(-(MATE_SCORE + self.score + 1) / 2)
        } else {
            None
        }
    }
}

/// Callback type for iteration info.
pub type SearchInfoCallback = Arc<dyn Fn(&SearchIterationInfo) + Send + Sync>;

/// Two killer moves per ply: quiet moves that caused a beta cutoff in a sibling.
pub struct KillerTable {
    slots: [[Move; 2]; MAX_PLY],
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KillerTable {
    #[must_use]
    pub fn new() -> Self {
        KillerTable {
            slots: [[Move::NULL; 2]; MAX_PLY],
        }
    }

    #[must_use]
    pub fn primary(&self, ply: usize) -> Move {
        self.slots.get(ply).map_or(Move::NULL, |row| row[0])
    }

    #[must_use]
    pub fn secondary(&self, ply: usize) -> Move {
        self.slots.get(ply).map_or(Move::NULL, |row| row[1])
    }

    #[must_use]
    pub fn is_killer(&self, ply: usize, mv: Move) -> bool {
        mv == self.primary(ply) || mv == self.secondary(ply)
    }

    pub fn update(&mut self, ply: usize, mv: Move) {
        if ply >= MAX_PLY {
            return;
        }
        if self.slots[ply][0] != mv {
            self.slots[ply][1] = self.slots[ply][0];
            self.slots[ply][0] = mv;
        }
    }

    pub fn reset(&mut self) {
        self.slots = [[Move::NULL; 2]; MAX_PLY];
    }
}

/// Quiet-move success counters indexed by `[color][from][to]`.
pub struct HistoryTable {
    entries: Box<[[[i32; 64]; 64]; 2]>,
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryTable {
    #[must_use]
    pub fn new() -> Self {
        HistoryTable {
            entries: Box::new([[[0; 64]; 64]; 2]),
        }
    }

    #[must_use]
    pub fn score(&self, color: Color, mv: Move) -> i32 {
        self.entries[color.index()][mv.from().index()][mv.to().index()]
    }

    /// Reward a quiet move that caused a beta cutoff
    pub fn update(&mut self, color: Color, mv: Move, depth: i32) {
        self.apply(color, mv, depth * depth);
    }

    /// Penalize a quiet move searched before the cutoff move
    pub fn penalize(&mut self, color: Color, mv: Move, depth: i32) {
        self.apply(color, mv, -(depth * depth));
    }

    // Gravity: the closer an entry is to the bound, the less a bonus moves it
    fn apply(&mut self, color: Color, mv: Move, bonus: i32) {
        let bonus = bonus.clamp(-HISTORY_MAX, HISTORY_MAX);
        let entry = &mut self.entries[color.index()][mv.from().index()][mv.to().index()];
        *entry += bonus - *entry * bonus.abs() / HISTORY_MAX;
    }

    /// Halve every entry
    pub fn decay(&mut self) {
        for side in self.entries.iter_mut() {
            for row in side.iter_mut() {
                for entry in row.iter_mut() {
                    *entry /= 2;
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.entries = Box::new([[[0; 64]; 64]; 2]);
    }
}

/// Tables used during search. The TT is shared; killers and history are per thread.
pub struct SearchTables {
    pub tt: Arc<TranspositionTable>,
    pub killer_moves: KillerTable,
    pub history: HistoryTable,
}

impl SearchTables {
    #[must_use]
    pub fn new(tt: Arc<TranspositionTable>) -> Self {
        SearchTables {
            tt,
            killer_moves: KillerTable::new(),
            history: HistoryTable::new(),
        }
    }

    /// Fresh tables around a private transposition table of `tt_mb` MB.
    #[must_use]
    pub fn with_tt_size(tt_mb: usize) -> Self {
        SearchTables::new(Arc::new(TranspositionTable::new(tt_mb)))
    }

    /// Prepare for a new search: decay history, forget killers.
    pub fn new_search(&mut self) {
        self.history.decay();
        self.killer_moves.reset();
    }
}

impl Default for SearchTables {
    fn default() -> Self {
        SearchTables::with_tt_size(DEFAULT_TT_MB)
    }
}

/// Run an iterative-deepening search on the calling thread.
///
/// The position is restored before returning. `stop` is only read; raising it
/// from another thread abandons the running iteration.
pub fn search<E: Evaluator>(
    pos: &mut Position,
    evaluator: &mut E,
    tables: &mut SearchTables,
    limits: &SearchLimits,
    stop: &AtomicBool,
    info_callback: Option<SearchInfoCallback>,
) -> SearchResult {
    let node_counter = AtomicU64::new(0);
    SearchContext::new(pos, evaluator, tables, limits, stop, &node_counter)
        .with_info_callback(info_callback)
        .iterative_deepening()
}

/// Find the best move at a fixed depth with the default evaluator and a fresh table.
pub fn find_best_move(pos: &mut Position, depth: u32) -> Option<Move> {
    let mut evaluator = PestoEvaluator::new();
    let mut tables = SearchTables::default();
    let stop = AtomicBool::new(false);
    let limits = SearchLimits::default().depth(depth);
    search(pos, &mut evaluator, &mut tables, &limits, &stop, None).best_move
}
