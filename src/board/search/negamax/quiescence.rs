use super::super::constants::{MATE_SCORE, MAX_QSEARCH_PLY, QS_SEE_BASE, QS_SEE_STEP};
use super::super::move_order::order_moves;
use super::SearchContext;
use crate::board::{Evaluator, GenType, Move, MAX_PLY};

impl<E: Evaluator> SearchContext<'_, E> {
    /// Quiescence search entry for a child node.
    fn quiescence(&mut self, alpha: i32, beta: i32, ply: usize, qply: i32) -> i32 {
        if self.stopped {
            return 0;
        }
        self.count_node(ply);
        if self.stopped {
            return 0;
        }
        self.quiescence_node(alpha, beta, ply, qply)
    }

    /// Quiescence body for an already counted node.
    ///
    /// Out of check the side to move may stand pat on the static eval and
    /// otherwise only tries captures whose SEE clears a threshold that rises
    /// with `qply`. In check every evasion is searched so mates are seen.
    pub(super) fn quiescence_node(
        &mut self,
        mut alpha: i32,
        beta: i32,
        ply: usize,
        qply: i32,
    ) -> i32 {
        if ply >= MAX_PLY - 1 {
            return self.evaluate().clamp(alpha, beta);
        }

        let in_check = self.pos.in_check();
        let threshold = QS_SEE_BASE + QS_SEE_STEP * qply;

        let moves = if in_check {
            let moves = self.pos.generate(GenType::All);
            if moves.is_empty() {
                return (-MATE_SCORE + ply as i32).clamp(alpha, beta);
            }
            if qply >= MAX_QSEARCH_PLY {
                return self.evaluate().clamp(alpha, beta);
            }
            moves
        } else {
            let stand_pat = self.evaluate();
            if stand_pat >= beta {
                return beta;
            }
            alpha = alpha.max(stand_pat);
            if qply >= MAX_QSEARCH_PLY {
                return alpha;
            }
            self.pos.generate(GenType::Captures)
        };

        let ordered = order_moves(
            self.pos,
            &moves,
            Move::NULL,
            &self.tables.killer_moves,
            &self.tables.history,
            ply,
        );

        for scored in ordered.iter() {
            let mv = scored.mv;
            if !in_check && !self.pos.see_ge(mv, threshold) {
                continue;
            }

            self.make(mv);
            let score = -self.quiescence(-beta, -alpha, ply + 1, qply + 1);
            self.unmake();

            if self.stopped {
                return 0;
            }
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }
}
