use super::super::attack_tables::pawn_attacks;
use super::super::make_unmake::ep_victim_square;
use super::super::state::Position;
use super::super::types::{Bitboard, Color, Move, MoveList, Piece, Square};
use super::GenContext;

/// Promotion pieces in generation order
const PROMOTION_PIECES: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

#[inline]
fn push_pawn_move(moves: &mut MoveList, from: Square, to: Square, promotion_rank: usize) {
    if to.rank() == promotion_rank {
        for promo in PROMOTION_PIECES {
            moves.push(Move::promotion(from, to, promo));
        }
    } else {
        moves.push(Move::new(from, to));
    }
}

impl Position {
    pub(super) fn gen_pawn_moves(
        &self,
        ctx: &GenContext,
        gen_quiet: bool,
        gen_captures: bool,
        moves: &mut MoveList,
    ) {
        let us = ctx.us;
        let push = us.pawn_push();
        let (start_rank, promotion_rank) = match us {
            Color::White => (1, 7),
            Color::Black => (6, 0),
        };
        let empty = !self.occupied;
        let enemies = self.color_bb(ctx.them);
        let ep_square = self.ep_square();

        for from in self.pieces(us, Piece::Pawn) {
            let allowed = ctx.evasion & ctx.pin_ray(from);

            if gen_quiet {
                let one = from.offset(push);
                if empty.contains(one) {
                    if allowed.contains(one) {
                        push_pawn_move(moves, from, one, promotion_rank);
                    }
                    if from.rank() == start_rank {
                        let two = one.offset(push);
                        if empty.contains(two) && allowed.contains(two) {
                            moves.push(Move::double_push(from, two));
                        }
                    }
                }
            }

            if gen_captures {
                let attacks = pawn_attacks(us, from);
                for to in attacks & enemies & allowed {
                    push_pawn_move(moves, from, to, promotion_rank);
                }
                if let Some(ep) = ep_square {
                    if attacks.contains(ep) && self.en_passant_is_legal(ctx, from, ep) {
                        moves.push(Move::en_passant(from, ep));
                    }
                }
            }
        }
    }

    /// Replay the capture on a scratch occupancy and look for attacks on the king.
    ///
    /// Catches the horizontal pin where both pawns leave the king's rank at once,
    /// which the ordinary pin mask cannot see.
    fn en_passant_is_legal(&self, ctx: &GenContext, from: Square, ep: Square) -> bool {
        let victim = ep_victim_square(ctx.us, ep);
        let victim_bb = Bitboard::from_square(victim);
        let occ = (self.occupied ^ Bitboard::from_square(from) ^ victim_bb) | Bitboard::from_square(ep);
        let attackers = self.attackers_to(ctx.ksq, occ) & self.color_bb(ctx.them) & !victim_bb;
        attackers.is_empty()
    }
}
