use super::super::attack_tables::{bishop_attacks, knight_attacks, queen_attacks, rook_attacks};
use super::super::state::Position;
use super::super::types::{Move, MoveList, Piece};
use super::GenContext;

impl Position {
    /// Knight, bishop, rook and queen moves.
    pub(super) fn gen_piece_moves(&self, ctx: &GenContext, moves: &mut MoveList) {
        let mask = ctx.targets & ctx.evasion;
        let occ = self.occupied;

        // A pinned knight can never stay on its pin line
        for from in self.pieces(ctx.us, Piece::Knight) & !ctx.pinned {
            for to in knight_attacks(from) & mask {
                moves.push(Move::new(from, to));
            }
        }

        for piece in [Piece::Bishop, Piece::Rook, Piece::Queen] {
            for from in self.pieces(ctx.us, piece) {
                let attacks = match piece {
                    Piece::Bishop => bishop_attacks(from, occ),
                    Piece::Rook => rook_attacks(from, occ),
                    _ => queen_attacks(from, occ),
                };
                for to in attacks & mask & ctx.pin_ray(from) {
                    moves.push(Move::new(from, to));
                }
            }
        }
    }
}
