//! Static Exchange Evaluation (SEE).
//!
//! Evaluates capture sequences on a single square to determine
//! if a capture is winning, losing, or equal.

use super::attack_tables::{bishop_attacks, rook_attacks};
use super::make_unmake::ep_victim_square;
use super::state::Position;
use super::types::{Bitboard, Color, Move, Piece};

impl Position {
    /// Static Exchange Evaluation for a move.
    ///
    /// Returns the material balance after all exchanges on the target square,
    /// from the mover's point of view, where either side may stop capturing
    /// when continuing would lose material. Quiet moves return the loss of
    /// the moved piece if the square is attacked, otherwise 0; promotions
    /// count the promotion gain.
    #[must_use]
    pub fn see(&self, mv: Move) -> i32 {
        let from = mv.from();
        let to = mv.to();
        let Some(mut current) = self.piece_on(from) else {
            return 0;
        };
        if mv.is_castle() {
            return 0;
        }

        // Maximum depth of exchanges (should never be exceeded)
        const MAX_DEPTH: usize = 32;
        let mut gain = [0i32; MAX_DEPTH];
        let mut depth = 0;

        let mut occupancy = self.occupied;
        if mv.is_en_passant() {
            occupancy ^= Bitboard::from_square(ep_victim_square(self.side_to_move, to));
        }
        gain[0] = self.captured_by(mv).map_or(0, Piece::value);
        if let Some(promo) = mv.promotion_piece() {
            gain[0] += promo.value() - Piece::Pawn.value();
            current = promo;
        }

        let diagonal = self.pieces_of_type(Piece::Bishop) | self.pieces_of_type(Piece::Queen);
        let straight = self.pieces_of_type(Piece::Rook) | self.pieces_of_type(Piece::Queen);

        let mut from_bb = Bitboard::from_square(from);
        let mut attackers = self.attackers_to(to, occupancy);
        let mut side = self.side_to_move;

        loop {
            // Remove the attacker from the board
            occupancy ^= from_bb;
            attackers &= !from_bb;

            // Removing a piece on the line can uncover a slider behind it
            if matches!(current, Piece::Pawn | Piece::Bishop | Piece::Queen) {
                attackers |= bishop_attacks(to, occupancy) & diagonal & occupancy;
            }
            if matches!(current, Piece::Rook | Piece::Queen) {
                attackers |= rook_attacks(to, occupancy) & straight & occupancy;
            }

            side = side.opponent();
            let side_attackers = attackers & self.color_bb(side);
            if side_attackers.is_empty() {
                break;
            }

            depth += 1;
            if depth >= MAX_DEPTH {
                break;
            }

            let (lva_piece, lva_bb) = self.least_valuable_attacker(side_attackers, side);

            // Score from making this capture (negated, as it's opponent's gain)
            gain[depth] = current.value() - gain[depth - 1];

            // Pruning: if standing pat is better than any possible continuation, stop
            if (-gain[depth - 1]).max(gain[depth]) < 0 {
                break;
            }

            // A king may only capture when nothing defends the square
            if lva_piece == Piece::King
                && (attackers & self.color_bb(side.opponent()) & occupancy).any()
            {
                depth -= 1;
                break;
            }

            current = lva_piece;
            from_bb = lva_bb;
        }

        // Minimax the gains back up
        while depth > 0 {
            depth -= 1;
            gain[depth] = -(-gain[depth]).max(gain[depth + 1]);
        }

        gain[0]
    }

    /// True when the exchange on the move's square is worth at least `threshold`.
    #[inline]
    #[must_use]
    pub fn see_ge(&self, mv: Move, threshold: i32) -> bool {
        self.see(mv) >= threshold
    }

    /// Find the least valuable attacker from a set of attackers.
    /// Returns the piece type and a bitboard with just that piece.
    fn least_valuable_attacker(&self, attackers: Bitboard, color: Color) -> (Piece, Bitboard) {
        for piece in Piece::ALL {
            let candidates = attackers & self.pieces(color, piece);
            if candidates.any() {
                return (piece, Bitboard::from_square(candidates.lsb()));
            }
        }
        // Should never reach here if attackers is non-empty
        (Piece::King, Bitboard::EMPTY)
    }
}
