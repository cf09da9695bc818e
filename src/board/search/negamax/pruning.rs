use super::super::constants::{
    NULL_MOVE_BASE_REDUCTION, NULL_MOVE_DEPTH_DIVISOR, NULL_MOVE_MIN_DEPTH,
};
use super::SearchContext;
use crate::board::Evaluator;

impl<E: Evaluator> SearchContext<'_, E> {
    /// Null move pruning: pass the turn and search reduced with a null window
    /// around beta. If the opponent still cannot get below beta, cut.
    ///
    /// The caller guarantees a non-PV, non-root node that is not in check and
    /// was not itself reached by a null move.
    pub(super) fn try_null_move(&mut self, depth: i32, beta: i32, ply: usize) -> Option<i32> {
        // Zugzwang guard: pawn-only sides often have no safe waiting move
        if depth < NULL_MOVE_MIN_DEPTH
            || !self.pos.has_non_pawn_material(self.pos.side_to_move())
        {
            return None;
        }
        if self.evaluate() < beta {
            return None;
        }

        let r = NULL_MOVE_BASE_REDUCTION + depth / NULL_MOVE_DEPTH_DIVISOR;

        self.make_null();
        let score = -self.negamax(depth - 1 - r, -beta, -beta + 1, ply + 1, false);
        self.unmake_null();

        if self.stopped {
            return None;
        }

        (score >= beta).then_some(beta)
    }
}
