//! Reversible move application.
//!
//! Every make pushes the pre-move [`StateInfo`] and the move itself; every
//! unmake pops both. Keys are updated incrementally and always equal
//! [`Position::recompute_keys`].

use crate::zobrist::{castling_key, en_passant_key, side_key};

use super::error::MoveParseError;
use super::state::Position;
use super::types::{castle_path, Color, Move, Piece, Square};

impl Position {
    /// Apply a legal move.
    ///
    /// The move must come from this position's legal move list (or carry the
    /// same flags); legality is not re-checked here.
    ///
    /// # Panics
    /// Panics if no piece of the side to move stands on the source square.
    pub fn make_move(&mut self, mv: Move) {
        let us = self.side_to_move;
        let them = us.opponent();
        let from = mv.from();
        let to = mv.to();
        let piece = match self.board[from.index()] {
            Some((color, piece)) if color == us => piece,
            _ => panic!("make_move({mv}): no {us} piece on {from}"),
        };

        self.history.push(self.state);
        self.moves.push(mv);

        self.state.key ^= side_key();
        if let Some(file) = self.state.ep_file.take() {
            self.state.key ^= en_passant_key(file);
        }
        self.state.captured = None;
        self.state.halfmove_clock += 1;
        self.state.plies_from_null += 1;

        if mv.is_castle() {
            let path = castle_path(us, to);
            self.move_piece(us, Piece::King, from, to);
            self.hash_piece(us, Piece::King, from);
            self.hash_piece(us, Piece::King, to);
            self.move_piece(us, Piece::Rook, path.rook_from, path.rook_to);
            self.hash_piece(us, Piece::Rook, path.rook_from);
            self.hash_piece(us, Piece::Rook, path.rook_to);
        } else {
            let capture_sq = if mv.is_en_passant() {
                ep_victim_square(us, to)
            } else {
                to
            };
            if let Some((_, captured)) = self.board[capture_sq.index()] {
                self.remove_piece(them, captured, capture_sq);
                self.hash_piece(them, captured, capture_sq);
                self.state.captured = Some(captured);
                self.state.halfmove_clock = 0;
            }

            if let Some(promo) = mv.promotion_piece() {
                self.remove_piece(us, Piece::Pawn, from);
                self.hash_piece(us, Piece::Pawn, from);
                self.add_piece(us, promo, to);
                self.hash_piece(us, promo, to);
            } else {
                self.move_piece(us, piece, from, to);
                self.hash_piece(us, piece, from);
                self.hash_piece(us, piece, to);
            }

            if piece == Piece::Pawn {
                self.state.halfmove_clock = 0;
                if mv.is_double_push() {
                    let file = from.file() as u8;
                    self.state.ep_file = Some(file);
                    self.state.key ^= en_passant_key(file);
                }
            }
        }

        let old_rights = self.state.castling;
        let mut rights = old_rights;
        rights.update_for_square(from);
        rights.update_for_square(to);
        if rights != old_rights {
            self.state.key ^= castling_key(old_rights) ^ castling_key(rights);
            self.state.castling = rights;
        }

        self.side_to_move = them;
        debug_assert_eq!(self.state.key, self.recompute_keys().0);
    }

    /// Undo the last [`Position::make_move`].
    ///
    /// # Panics
    /// Panics when there is no move to undo, or when the last move was a null
    /// move. Both mean make and unmake calls are out of balance.
    pub fn unmake_move(&mut self) {
        let (Some(mv), Some(prev)) = (self.moves.pop(), self.history.pop()) else {
            panic!("unmake_move called with an empty move stack");
        };
        assert!(!mv.is_null(), "unmake_move called after make_null_move");

        let us = self.side_to_move.opponent();
        let them = self.side_to_move;
        let from = mv.from();
        let to = mv.to();
        let captured = self.state.captured;

        if mv.is_castle() {
            let path = castle_path(us, to);
            self.move_piece(us, Piece::Rook, path.rook_to, path.rook_from);
            self.move_piece(us, Piece::King, to, from);
        } else {
            if let Some(promo) = mv.promotion_piece() {
                self.remove_piece(us, promo, to);
                self.add_piece(us, Piece::Pawn, from);
            } else if let Some((_, piece)) = self.board[to.index()] {
                self.move_piece(us, piece, to, from);
            }
            if let Some(piece) = captured {
                let capture_sq = if mv.is_en_passant() {
                    ep_victim_square(us, to)
                } else {
                    to
                };
                self.add_piece(them, piece, capture_sq);
            }
        }

        self.side_to_move = us;
        self.state = prev;
    }

    /// Pass the move to the opponent. Only used by null-move pruning.
    pub fn make_null_move(&mut self) {
        self.history.push(self.state);
        self.moves.push(Move::NULL);

        self.state.key ^= side_key();
        if let Some(file) = self.state.ep_file.take() {
            self.state.key ^= en_passant_key(file);
        }
        self.state.captured = None;
        self.state.halfmove_clock += 1;
        self.state.plies_from_null = 0;
        self.side_to_move = self.side_to_move.opponent();
    }

    /// # Panics
    /// Panics unless the last move was a null move.
    pub fn unmake_null_move(&mut self) {
        let (Some(mv), Some(prev)) = (self.moves.pop(), self.history.pop()) else {
            panic!("unmake_null_move called with an empty move stack");
        };
        assert!(mv.is_null(), "unmake_null_move called after a real move {mv}");
        self.side_to_move = self.side_to_move.opponent();
        self.state = prev;
    }

    /// Parse, verify and apply a move given in coordinate text.
    ///
    /// The position is left untouched when the text does not name a legal move.
    pub fn make_move_text(&mut self, text: &str) -> Result<Move, MoveParseError> {
        let mv = self.parse_move(text)?;
        self.make_move(mv);
        Ok(mv)
    }

    /// True if the move captures something (en passant included)
    #[inline]
    #[must_use]
    pub fn is_capture(&self, mv: Move) -> bool {
        mv.is_en_passant()
            || (!mv.is_castle() && self.color_on(mv.to()) == Some(self.side_to_move.opponent()))
    }

    /// The piece a capture removes, if any
    #[inline]
    #[must_use]
    pub fn captured_by(&self, mv: Move) -> Option<Piece> {
        if mv.is_en_passant() {
            Some(Piece::Pawn)
        } else if self.is_capture(mv) {
            self.piece_on(mv.to())
        } else {
            None
        }
    }
}

/// Square of the pawn removed by an en-passant capture landing on `to`
#[inline]
pub(crate) fn ep_victim_square(us: Color, to: Square) -> Square {
    to.offset(-us.pawn_push())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "empty move stack")]
    fn unmake_without_make_panics() {
        let mut pos = Position::startpos();
        pos.unmake_move();
    }

    #[test]
    #[should_panic(expected = "after make_null_move")]
    fn unmake_move_after_null_panics() {
        let mut pos = Position::startpos();
        pos.make_null_move();
        pos.unmake_move();
    }

    #[test]
    fn illegal_text_leaves_position_untouched() {
        let mut pos = Position::startpos();
        let before = pos.clone();
        assert!(matches!(
            pos.make_move_text("e2e5"),
            Err(MoveParseError::IllegalMove { .. })
        ));
        assert!(pos.make_move_text("e9e4").is_err());
        assert_eq!(pos, before);
    }

    #[test]
    fn null_move_flips_side_and_clears_ep() {
        let mut pos = Position::startpos();
        pos.make_move_text("e2e4").unwrap();
        let before = pos.clone();
        pos.make_null_move();
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.ep_file(), None);
        assert_eq!(pos.key(), pos.recompute_keys().0);
        pos.unmake_null_move();
        assert_eq!(pos, before);
    }

    #[test]
    fn halfmove_clock_rules() {
        let mut pos = Position::startpos();
        pos.make_move_text("g1f3").unwrap();
        assert_eq!(pos.halfmove_clock(), 1);
        pos.make_move_text("g8f6").unwrap();
        assert_eq!(pos.halfmove_clock(), 2);
        pos.make_move_text("e2e4").unwrap();
        assert_eq!(pos.halfmove_clock(), 0);
        pos.make_move_text("f6e4").unwrap();
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(pos.captured_piece(), Some(Piece::Pawn));
        assert_eq!(pos.fullmove_number(), 3);
    }
}
