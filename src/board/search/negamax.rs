//! Core search implementation.
//!
//! This module implements:
//! - Iterative deepening over a negamax alpha-beta search
//! - Principal variation search with null windows
//! - Null move pruning
//! - Late move reductions (LMR) with full-depth re-search
//! - Check extensions
//! - Mate distance pruning
//! - Quiescence search with stand-pat and SEE pruning
//! - Move ordering (TT move, SEE captures, killers, checks, history)

mod iterative;
mod pruning;
mod quiescence;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use crate::board::{Evaluator, GenType, Move, Position, MAX_PLY};
use crate::tt::{score_from_tt, score_to_tt, BoundType};

use super::constants::{
    DRAW_SCORE, LMR_DEEP_MIN_DEPTH, LMR_DEEP_MOVE_INDEX, LMR_FULL_DEPTH_MOVES, LMR_MIN_DEPTH,
    MATE_SCORE, NODE_POLL_MASK,
};
use super::move_order::order_moves;
use super::{SearchInfoCallback, SearchLimits, SearchTables};

/// Quiet moves remembered per node for history penalties
const MAX_QUIETS_TRACKED: usize = 64;

/// State of one search on one thread.
pub(super) struct SearchContext<'a, E: Evaluator> {
    pos: &'a mut Position,
    evaluator: &'a mut E,
    tables: &'a mut SearchTables,
    limits: &'a SearchLimits,
    stop: &'a AtomicBool,
    /// Nodes flushed by every thread sharing this search
    node_counter: &'a AtomicU64,
    info_callback: Option<SearchInfoCallback>,
    start_time: Instant,
    start_depth: u32,
    nodes: u64,
    seldepth: u32,
    stopped: bool,
    /// Best root move of the running iteration
    root_best: Option<Move>,
}

impl<'a, E: Evaluator> SearchContext<'a, E> {
    pub(super) fn new(
        pos: &'a mut Position,
        evaluator: &'a mut E,
        tables: &'a mut SearchTables,
        limits: &'a SearchLimits,
        stop: &'a AtomicBool,
        node_counter: &'a AtomicU64,
    ) -> Self {
        SearchContext {
            pos,
            evaluator,
            tables,
            limits,
            stop,
            node_counter,
            info_callback: None,
            start_time: Instant::now(),
            start_depth: 1,
            nodes: 0,
            seldepth: 0,
            stopped: false,
            root_best: None,
        }
    }

    #[must_use]
    pub(super) fn with_info_callback(mut self, callback: Option<SearchInfoCallback>) -> Self {
        self.info_callback = callback;
        self
    }

    /// First iteration depth (helper threads skip ahead)
    #[must_use]
    pub(super) fn with_start_depth(mut self, depth: u32) -> Self {
        self.start_depth = depth.max(1);
        self
    }

    #[inline]
    fn make(&mut self, mv: Move) {
        self.evaluator.on_make_move(self.pos, mv);
        self.pos.make_move(mv);
    }

    #[inline]
    fn unmake(&mut self) {
        self.pos.unmake_move();
        self.evaluator.on_unmake_move();
    }

    #[inline]
    fn make_null(&mut self) {
        self.evaluator.on_make_move(self.pos, Move::NULL);
        self.pos.make_null_move();
    }

    #[inline]
    fn unmake_null(&mut self) {
        self.pos.unmake_null_move();
        self.evaluator.on_unmake_move();
    }

    /// Evaluate position from side-to-move's perspective
    #[inline]
    fn evaluate(&mut self) -> i32 {
        self.evaluator.evaluate(self.pos)
    }

    /// Count a node and poll the stop conditions every 1024 nodes.
    #[inline]
    fn count_node(&mut self, ply: usize) {
        self.nodes += 1;
        self.seldepth = self.seldepth.max(ply as u32 + 1);
        if self.nodes & NODE_POLL_MASK == 0 {
            self.node_counter
                .fetch_add(NODE_POLL_MASK + 1, Ordering::Relaxed);
            self.poll();
        }
    }

    fn poll(&mut self) {
        if self.stop.load(Ordering::Relaxed) {
            self.stopped = true;
            return;
        }
        if self
            .limits
            .hard_deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            self.stopped = true;
            return;
        }
        if self
            .limits
            .nodes
            .is_some_and(|cap| self.node_counter.load(Ordering::Relaxed) >= cap)
        {
            self.stopped = true;
        }
    }

    /// Nodes searched so far by all threads, including this thread's unflushed count
    fn total_nodes(&self) -> u64 {
        self.node_counter.load(Ordering::Relaxed) + (self.nodes & NODE_POLL_MASK)
    }

    /// Negamax alpha-beta. Returns a score inside `[alpha, beta]`; when the
    /// search has been stopped the value is meaningless and discarded.
    pub(super) fn negamax(
        &mut self,
        depth: i32,
        mut alpha: i32,
        mut beta: i32,
        ply: usize,
        allow_null: bool,
    ) -> i32 {
        if self.stopped {
            return 0;
        }
        self.count_node(ply);
        if self.stopped {
            return 0;
        }

        let is_root = ply == 0;
        let is_pv = beta - alpha > 1;

        if !is_root {
            if self.pos.is_effective_draw() {
                return DRAW_SCORE;
            }
            if ply >= MAX_PLY - 1 {
                return self.evaluate().clamp(alpha, beta);
            }

            // Mate distance pruning
            alpha = alpha.max(-MATE_SCORE + ply as i32);
            beta = beta.min(MATE_SCORE - ply as i32 - 1);
            if alpha >= beta {
                return alpha;
            }
        }

        let key = self.pos.key();
        let mut tt_move = Move::NULL;
        if let Some(entry) = self.tables.tt.probe(key) {
            tt_move = entry.best_move().unwrap_or(Move::NULL);
            let score = score_from_tt(entry.score(), ply);
            if entry.usable(depth.max(0) as u32, alpha, beta, score) {
                if !is_root {
                    return score;
                }
                // At the root the cutoff is only taken with a legal move to publish
                if let Some(mv) = self.pos.legal_moves().find(tt_move) {
                    self.root_best = Some(mv);
                    return score;
                }
            }
        }

        let in_check = self.pos.in_check();
        let moves = self.pos.generate(GenType::All);
        if moves.is_empty() {
            return if in_check {
                -MATE_SCORE + ply as i32
            } else {
                DRAW_SCORE
            };
        }

        if depth <= 0 {
            return self.quiescence_node(alpha, beta, ply, 0);
        }

        if !is_pv && !is_root && !in_check && allow_null {
            if let Some(score) = self.try_null_move(depth, beta, ply) {
                return score;
            }
        }

        let ordered = order_moves(
            self.pos,
            &moves,
            tt_move,
            &self.tables.killer_moves,
            &self.tables.history,
            ply,
        );
        let us = self.pos.side_to_move();

        let mut best_move = Move::NULL;
        let mut raised_alpha = false;
        let mut quiets_tried = [Move::NULL; MAX_QUIETS_TRACKED];
        let mut quiets_count = 0usize;

        for (i, scored) in ordered.iter().enumerate() {
            let mv = scored.mv;
            let is_quiet = !self.pos.is_capture(mv) && !mv.is_promotion();
            let is_killer = self.tables.killer_moves.is_killer(ply, mv);

            self.make(mv);
            let gives_check = self.pos.in_check();
            let new_depth = depth - 1 + i32::from(gives_check);

            let reduction = if i >= LMR_FULL_DEPTH_MOVES
                && depth >= LMR_MIN_DEPTH
                && is_quiet
                && !is_killer
                && !in_check
                && !gives_check
            {
                if i >= LMR_DEEP_MOVE_INDEX && depth >= LMR_DEEP_MIN_DEPTH {
                    2
                } else {
                    1
                }
            } else {
                0
            };

            let mut score;
            if i == 0 {
                score = -self.negamax(new_depth, -beta, -alpha, ply + 1, true);
            } else {
                score = -self.negamax(new_depth - reduction, -alpha - 1, -alpha, ply + 1, true);

                // Reduced search beat alpha: verify at full depth
                if reduction > 0 && score > alpha {
                    score = -self.negamax(new_depth, -alpha - 1, -alpha, ply + 1, true);
                }

                if score > alpha && score < beta {
                    score = -self.negamax(new_depth, -beta, -alpha, ply + 1, true);
                }
            }

            self.unmake();

            if self.stopped {
                return 0;
            }

            if score > alpha {
                best_move = mv;
                if is_root {
                    self.root_best = Some(mv);
                }

                if score >= beta {
                    self.tables.tt.store(
                        key,
                        depth as u32,
                        score_to_tt(beta, ply),
                        BoundType::LowerBound,
                        Some(mv),
                    );
                    if is_quiet {
                        self.tables.killer_moves.update(ply, mv);
                        self.tables.history.update(us, mv, depth);
                        for &quiet in &quiets_tried[..quiets_count] {
                            self.tables.history.penalize(us, quiet, depth);
                        }
                    }
                    return beta;
                }

                alpha = score;
                raised_alpha = true;
            }

            if is_quiet && quiets_count < MAX_QUIETS_TRACKED {
                quiets_tried[quiets_count] = mv;
                quiets_count += 1;
            }
        }

        let (bound, stored_move) = if raised_alpha {
            (BoundType::Exact, best_move)
        } else {
            (BoundType::UpperBound, tt_move)
        };
        self.tables.tt.store(
            key,
            depth as u32,
            score_to_tt(alpha, ply),
            bound,
            Some(stored_move),
        );
        alpha
    }
}
