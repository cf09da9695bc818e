use super::super::attack_tables::king_attacks;
use super::super::state::Position;
use super::super::types::{Bitboard, Move, MoveList, Piece, CASTLE_PATHS};
use super::GenContext;

impl Position {
    /// King steps to squares that stay safe once the king has left its square.
    pub(super) fn gen_king_moves(&self, ctx: &GenContext, moves: &mut MoveList) {
        // Lifting the king exposes squares behind it along a checking slider's ray
        let occ = self.occupied ^ Bitboard::from_square(ctx.ksq);
        let enemies = self.color_bb(ctx.them);
        for to in king_attacks(ctx.ksq) & ctx.targets {
            if (self.attackers_to(to, occ) & enemies).is_empty() {
                moves.push(Move::new(ctx.ksq, to));
            }
        }
    }

    /// Castling, only called when the side to move is not in check.
    pub(super) fn gen_castling(&self, ctx: &GenContext, moves: &mut MoveList) {
        let rights = self.castling_rights();
        let enemies = self.color_bb(ctx.them);
        for path in &CASTLE_PATHS[ctx.us.index()] {
            if !rights.has(ctx.us, path.right_kingside)
                || ctx.ksq != path.king_from
                || !self.pieces(ctx.us, Piece::Rook).contains(path.rook_from)
                || (self.occupied & Bitboard(path.travel)).any()
            {
                continue;
            }
            let attacked = Bitboard(path.safe)
                .iter()
                .any(|sq| (self.attackers_to(sq, self.occupied) & enemies).any());
            if !attacked {
                moves.push(Move::castle(path.king_from, path.king_to));
            }
        }
    }
}
