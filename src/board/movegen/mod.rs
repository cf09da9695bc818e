//! Legal move generation.
//!
//! Generation is strictly legal: checkers and pinned pieces are computed once
//! per call, and every generator intersects its targets with the check-evasion
//! mask and, for pinned pieces, the line through the king. En passant is the
//! one case checked by replaying the capture on a scratch occupancy.

mod kings;
mod pawns;
mod pieces;

use super::attack_tables::{
    between, bishop_attacks, king_attacks, knight_attacks, line, pawn_attacks, piece_attacks,
    rook_attacks,
};
use super::error::MoveParseError;
use super::make_unmake::ep_victim_square;
use super::state::Position;
use super::types::{castle_path, Bitboard, Color, Move, MoveList, Piece, Square};

/// Which subset of legal moves to produce
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenType {
    /// Every legal move
    All,
    /// Captures, en passant and capture-promotions
    Captures,
    /// Captures, promotions and checking moves
    Noisy,
    /// Everything that is not a capture (quiet promotions and castling included)
    Quiet,
}

/// Per-call analysis shared by the piece generators.
pub(crate) struct GenContext {
    pub us: Color,
    pub them: Color,
    pub ksq: Square,
    pub checkers: Bitboard,
    pub pinned: Bitboard,
    /// Destination squares allowed by check evasion (all squares when not in check)
    pub evasion: Bitboard,
    /// Destination squares allowed by the filter (own pieces already excluded)
    pub targets: Bitboard,
}

impl GenContext {
    /// Squares a piece on `from` may move to without exposing its king.
    #[inline]
    pub fn pin_ray(&self, from: Square) -> Bitboard {
        if self.pinned.contains(from) {
            line(self.ksq, from)
        } else {
            Bitboard::ALL
        }
    }
}

impl Position {
    /// All pieces of either color attacking `sq` given an occupancy
    #[must_use]
    pub fn attackers_to(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let diagonal = self.pieces_of_type(Piece::Bishop) | self.pieces_of_type(Piece::Queen);
        let straight = self.pieces_of_type(Piece::Rook) | self.pieces_of_type(Piece::Queen);
        (pawn_attacks(Color::White, sq) & self.pieces(Color::Black, Piece::Pawn))
            | (pawn_attacks(Color::Black, sq) & self.pieces(Color::White, Piece::Pawn))
            | (knight_attacks(sq) & self.pieces_of_type(Piece::Knight))
            | (king_attacks(sq) & self.pieces_of_type(Piece::King))
            | (bishop_attacks(sq, occupied) & diagonal)
            | (rook_attacks(sq, occupied) & straight)
    }

    /// True if any piece of `by` attacks `sq`
    #[inline]
    #[must_use]
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        (self.attackers_to(sq, self.occupied) & self.color_bb(by)).any()
    }

    /// Enemy pieces giving check to the side to move
    #[inline]
    #[must_use]
    pub fn checkers(&self) -> Bitboard {
        let us = self.side_to_move;
        self.attackers_to(self.king_square(us), self.occupied) & self.color_bb(us.opponent())
    }

    /// True if `color`'s king is attacked
    #[inline]
    #[must_use]
    pub fn is_check(&self, color: Color) -> bool {
        self.is_square_attacked(self.king_square(color), color.opponent())
    }

    /// True if the side to move is in check
    #[inline]
    #[must_use]
    pub fn in_check(&self) -> bool {
        self.is_check(self.side_to_move)
    }

    /// Pieces of `color` that shield their own king from an enemy slider
    #[must_use]
    pub fn pinned_pieces(&self, color: Color) -> Bitboard {
        let ksq = self.king_square(color);
        let them = color.opponent();
        let snipers = (bishop_attacks(ksq, Bitboard::EMPTY)
            & (self.pieces(them, Piece::Bishop) | self.pieces(them, Piece::Queen)))
            | (rook_attacks(ksq, Bitboard::EMPTY)
                & (self.pieces(them, Piece::Rook) | self.pieces(them, Piece::Queen)));
        let mut pinned = Bitboard::EMPTY;
        for sniper in snipers {
            let blockers = between(ksq, sniper) & self.occupied;
            if blockers.popcount() == 1 && (blockers & self.color_bb(color)).any() {
                pinned |= blockers;
            }
        }
        pinned
    }

    fn gen_context(&self, gen: GenType) -> GenContext {
        let us = self.side_to_move;
        let them = us.opponent();
        let ksq = self.king_square(us);
        let checkers = self.attackers_to(ksq, self.occupied) & self.color_bb(them);
        let evasion = if checkers.is_empty() {
            Bitboard::ALL
        } else {
            // Only meaningful for a single checker; double check moves the king only
            let checker = checkers.lsb();
            checkers | between(ksq, checker)
        };
        let targets = match gen {
            GenType::All | GenType::Noisy => !self.color_bb(us),
            GenType::Captures => self.color_bb(them),
            GenType::Quiet => !self.occupied,
        };
        GenContext {
            us,
            them,
            ksq,
            checkers,
            pinned: self.pinned_pieces(us),
            evasion,
            targets,
        }
    }

    /// Append the legal moves of the requested kind to `moves`.
    pub fn generate_into(&self, gen: GenType, moves: &mut MoveList) {
        let ctx = self.gen_context(gen);
        let gen_quiet = matches!(gen, GenType::All | GenType::Noisy | GenType::Quiet);
        let gen_captures = gen != GenType::Quiet;

        self.gen_king_moves(&ctx, moves);
        if ctx.checkers.more_than_one() {
            return;
        }

        self.gen_pawn_moves(&ctx, gen_quiet, gen_captures, moves);
        self.gen_piece_moves(&ctx, moves);
        if gen_quiet && ctx.checkers.is_empty() {
            self.gen_castling(&ctx, moves);
        }
    }

    /// Legal moves of the requested kind
    #[must_use]
    pub fn generate(&self, gen: GenType) -> MoveList {
        let mut moves = MoveList::new();
        self.generate_into(gen, &mut moves);
        if gen == GenType::Noisy {
            moves.retain(|mv| self.is_capture(mv) || mv.is_promotion() || self.gives_check(mv));
        }
        moves
    }

    /// Every legal move in the position
    #[must_use]
    pub fn legal_moves(&self) -> MoveList {
        self.generate(GenType::All)
    }

    #[must_use]
    pub fn is_checkmate(&self) -> bool {
        self.in_check() && self.legal_moves().is_empty()
    }

    #[must_use]
    pub fn is_stalemate(&self) -> bool {
        !self.in_check() && self.legal_moves().is_empty()
    }

    /// Whether a legal move checks the opponent, decided without making it.
    #[must_use]
    pub fn gives_check(&self, mv: Move) -> bool {
        let us = self.side_to_move;
        let them_ksq = self.king_square(us.opponent());
        let from = mv.from();
        let to = mv.to();
        let Some(moved) = self.piece_on(from) else {
            return false;
        };

        let mut occ = (self.occupied ^ Bitboard::from_square(from)) | Bitboard::from_square(to);
        // Squares whose own slider no longer stands there after the move
        let mut vacated = Bitboard::from_square(from);

        if mv.is_castle() {
            let path = castle_path(us, to);
            occ ^= Bitboard::from_square(path.rook_from);
            occ |= Bitboard::from_square(path.rook_to);
            vacated |= Bitboard::from_square(path.rook_from);
            if rook_attacks(path.rook_to, occ).contains(them_ksq) {
                return true;
            }
        } else {
            if mv.is_en_passant() {
                occ ^= Bitboard::from_square(ep_victim_square(us, to));
            }
            let piece = mv.promotion_piece().unwrap_or(moved);
            if piece != Piece::King && piece_attacks(piece, us, to, occ).contains(them_ksq) {
                return true;
            }
        }

        let diagonal = (self.pieces(us, Piece::Bishop) | self.pieces(us, Piece::Queen)) & !vacated;
        let straight = (self.pieces(us, Piece::Rook) | self.pieces(us, Piece::Queen)) & !vacated;
        ((bishop_attacks(them_ksq, occ) & diagonal) | (rook_attacks(them_ksq, occ) & straight))
            .any()
    }

    /// Resolve coordinate text against the legal moves.
    ///
    /// The returned move carries the castle, en-passant and double-push flags
    /// it needs for [`Position::make_move`].
    pub fn parse_move(&self, text: &str) -> Result<Move, MoveParseError> {
        let parsed = Move::from_text(text)?;
        self.legal_moves()
            .find(parsed)
            .ok_or_else(|| MoveParseError::IllegalMove {
                notation: text.to_string(),
            })
    }

    /// Count leaf nodes of the legal move tree to `depth`.
    pub fn perft(&mut self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = self.legal_moves();
        if depth == 1 {
            return moves.len() as u64;
        }
        let mut nodes = 0;
        for mv in moves {
            self.make_move(mv);
            nodes += self.perft(depth - 1);
            self.unmake_move();
        }
        nodes
    }

    /// Perft split by root move, in generation order
    pub fn perft_divide(&mut self, depth: u32) -> Vec<(Move, u64)> {
        let moves = self.legal_moves();
        let mut out = Vec::with_capacity(moves.len());
        for mv in moves {
            self.make_move(mv);
            let count = self.perft(depth.saturating_sub(1));
            self.unmake_move();
            out.push((mv, count));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    #[test]
    fn startpos_move_counts() {
        let p = Position::startpos();
        assert_eq!(p.legal_moves().len(), 20);
        assert_eq!(p.generate(GenType::Captures).len(), 0);
        assert_eq!(p.generate(GenType::Quiet).len(), 20);
        assert_eq!(p.generate(GenType::Noisy).len(), 0);
    }

    #[test]
    fn double_check_allows_only_king_moves() {
        // Knight on f6 and rook on e1 both check the king on e8
        let p = pos("4k3/8/5N2/8/8/8/8/K3R3 b - - 0 1");
        assert!(p.checkers().more_than_one());
        for mv in p.legal_moves() {
            assert_eq!(mv.from(), Square::E8);
        }
    }

    #[test]
    fn pinned_piece_cannot_leave_the_file() {
        // Bishop e2 is pinned against its king by the rook on e8
        let p = pos("4r1k1/8/8/8/8/8/4B3/4K3 w - - 0 1");
        let e2: Square = "e2".parse().unwrap();
        assert!(p.pinned_pieces(Color::White).contains(e2));
        assert!(p.legal_moves().iter().all(|m| m.from() != e2));
    }

    #[test]
    fn pinned_rook_slides_along_pin() {
        let p = pos("4r1k1/8/8/8/8/8/4R3/4K3 w - - 0 1");
        let from_e2: Vec<Move> = p
            .legal_moves()
            .iter()
            .copied()
            .filter(|m| m.from() == "e2".parse().unwrap())
            .collect();
        assert_eq!(from_e2.len(), 6);
        assert!(from_e2.iter().all(|m| m.to().file() == 4));
    }

    #[test]
    fn en_passant_discovered_rank_pin_is_illegal() {
        // Capturing d5xe6 would empty the fifth rank between king and rook
        let p = pos("8/8/8/K2Pp2r/8/8/8/7k w - e6 0 1");
        assert!(p.parse_move("d5e6").is_err());
        let p = pos("8/8/8/K2Pp3/8/8/8/7k w - e6 0 1");
        assert!(p.parse_move("d5e6").unwrap().is_en_passant());
    }

    #[test]
    fn en_passant_resolves_check_from_pushed_pawn() {
        // The pawn that just reached e5 checks the king on f4
        let p = pos("8/8/8/3Pp3/5K2/8/8/7k w - e6 0 1");
        assert!(p.in_check());
        assert!(p.parse_move("d5e6").is_ok());
    }

    #[test]
    fn castling_through_attack_is_illegal() {
        // Black rook on f8 covers f1
        let p = pos("5rk1/8/8/8/8/8/8/4K2R w K - 0 1");
        assert!(p.parse_move("e1g1").is_err());
        let p = pos("6k1/8/8/8/8/8/8/4K2R w K - 0 1");
        assert!(p.parse_move("e1g1").unwrap().is_castle());
    }

    #[test]
    fn gives_check_variants() {
        // Direct knight check
        let p = pos("4k3/8/8/8/4N3/8/8/4K3 w - - 0 1");
        assert!(p.gives_check(p.parse_move("e4d6").unwrap()));
        assert!(!p.gives_check(p.parse_move("e4c5").unwrap()));
        // Discovered check from the rook behind the bishop
        let p = pos("4k3/8/8/8/8/8/4B3/K3R3 w - - 0 1");
        assert!(p.gives_check(p.parse_move("e2d3").unwrap()));
        // Castling rook checks
        let p = pos("5k2/8/8/8/8/8/8/4K2R w K - 0 1");
        assert!(p.gives_check(p.parse_move("e1g1").unwrap()));
        // Promotion checks
        let p = pos("k7/4P3/8/8/8/8/8/4K3 w - - 0 1");
        assert!(p.gives_check(p.parse_move("e7e8q").unwrap()));
        assert!(!p.gives_check(p.parse_move("e7e8n").unwrap()));
    }

    #[test]
    fn noisy_includes_checks_and_promotions() {
        let p = pos("k7/4P3/8/8/8/8/8/1R2K3 w - - 0 1");
        let noisy = p.generate(GenType::Noisy);
        assert!(noisy.contains(Move::promotion(
            "e7".parse().unwrap(),
            "e8".parse().unwrap(),
            Piece::Knight
        )));
        assert!(noisy.contains(Move::from_text("b1a1").unwrap()));
        assert!(!noisy.contains(Move::from_text("b1c1").unwrap()));
        for mv in noisy {
            assert!(p.is_capture(mv) || mv.is_promotion() || p.gives_check(mv));
        }
    }

    #[test]
    fn filters_partition_all_moves() {
        let p = pos("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let all = p.legal_moves().len();
        let captures = p.generate(GenType::Captures).len();
        let quiet = p.generate(GenType::Quiet).len();
        assert_eq!(all, 48);
        assert_eq!(captures + quiet, all);
        assert_eq!(captures, 8);
    }
}
