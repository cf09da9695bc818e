use std::sync::atomic::Ordering;

use super::super::constants::{DRAW_SCORE, INFINITY, MATE_SCORE, MATE_THRESHOLD, NODE_POLL_MASK};
use super::super::{SearchIterationInfo, SearchResult};
use super::SearchContext;
use crate::board::{Evaluator, Move};

impl<E: Evaluator> SearchContext<'_, E> {
    /// Iterative deepening from the start depth up to the depth limit.
    ///
    /// The answer is always the best move of the last iteration that ran to
    /// completion; an iteration cut short by a stop signal is thrown away.
    pub(in crate::board::search) fn iterative_deepening(mut self) -> SearchResult {
        self.evaluator.reset(self.pos);
        self.tables.new_search();

        let mut result = SearchResult {
            best_move: None,
            score: DRAW_SCORE,
            depth: 0,
            nodes: 0,
        };

        let root_moves = self.pos.legal_moves();
        if root_moves.is_empty() {
            if self.pos.in_check() {
                result.score = -MATE_SCORE;
            }
            return result;
        }

        let max_depth = self.limits.max_depth();
        let first_depth = self.start_depth.min(max_depth);

        for depth in first_depth..=max_depth {
            if self.stop.load(Ordering::Relaxed) {
                break;
            }
            // Soft deadline: never start an iteration we are not expected to finish
            if depth > first_depth
                && self
                    .limits
                    .soft_deadline
                    .is_some_and(|deadline| std::time::Instant::now() >= deadline)
            {
                break;
            }

            self.root_best = None;
            self.seldepth = 0;
            let score = self.negamax(depth as i32, -INFINITY, INFINITY, 0, true);
            if self.stopped {
                break;
            }

            if let Some(mv) = self.root_best {
                result.best_move = Some(mv);
            }
            result.score = score;
            result.depth = depth;

            log::debug!(
                "depth {depth} score {score} nodes {} best {}",
                self.total_nodes(),
                result.best_move.unwrap_or(Move::NULL)
            );
            self.report_iteration(depth, score, result.best_move);

            // A mate this close cannot get shorter by searching deeper
            if score.abs() >= MATE_THRESHOLD && MATE_SCORE - score.abs() <= depth as i32 {
                break;
            }
        }

        if result.best_move.is_none() {
            result.best_move = root_moves.first();
        }

        self.node_counter
            .fetch_add(self.nodes & NODE_POLL_MASK, Ordering::Relaxed);
        result.nodes = self.node_counter.load(Ordering::Relaxed);
        result
    }

    fn report_iteration(&mut self, depth: u32, score: i32, best_move: Option<Move>) {
        let Some(callback) = self.info_callback.clone() else {
            return;
        };
        let pv = best_move.map_or_else(Vec::new, |mv| self.extract_pv(mv, depth as usize));
        let elapsed = self.start_time.elapsed();
        let time_ms = elapsed.as_millis() as u64;
        let nodes = self.total_nodes();
        let nps = if time_ms > 0 { nodes * 1000 / time_ms } else { 0 };
        let info = SearchIterationInfo {
            depth,
            seldepth: self.seldepth,
            score,
            nodes,
            nps,
            time_ms,
            hashfull: self.tables.tt.hashfull_per_mille(),
            pv,
        };
        callback(&info);
    }

    /// Principal variation: the root move followed by TT best moves.
    ///
    /// Each move is checked for legality and the walk stops when a position
    /// repeats, so a stale or colliding entry only shortens the line.
    fn extract_pv(&mut self, root_move: Move, max_len: usize) -> Vec<Move> {
        let max_len = max_len.max(1);
        let mut pv = Vec::with_capacity(max_len);
        let mut seen = Vec::with_capacity(max_len);

        let mut next = Some(root_move);
        while let Some(candidate) = next {
            if pv.len() >= max_len {
                break;
            }
            let key = self.pos.key();
            if seen.contains(&key) {
                break;
            }
            seen.push(key);

            let Some(mv) = self.pos.legal_moves().find(candidate) else {
                break;
            };
            pv.push(mv);
            self.pos.make_move(mv);
            next = self
                .tables
                .tt
                .probe(self.pos.key())
                .and_then(|entry| entry.best_move());
        }

        for _ in 0..pv.len() {
            self.pos.unmake_move();
        }
        pv
    }
}
