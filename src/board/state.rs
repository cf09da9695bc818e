//! Position representation and the recoverable state stack.

use std::fmt;

use crate::zobrist::{castling_key, en_passant_key, piece_key, side_key};

use super::types::{Bitboard, CastlingRights, Color, Move, Piece, Square};

/// Standard starting position
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Everything a move can change that cannot be recomputed from the board.
///
/// `make_move` pushes a copy of the current state before mutating it;
/// `unmake_move` pops it back, so restoring is a plain assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateInfo {
    pub(crate) key: u64,
    pub(crate) pawn_key: u64,
    pub(crate) non_pawn_keys: [u64; 2],
    pub(crate) castling: CastlingRights,
    pub(crate) ep_file: Option<u8>,
    pub(crate) halfmove_clock: u32,
    /// Plies since the last null move, bounds the repetition scan
    pub(crate) plies_from_null: u32,
    pub(crate) captured: Option<Piece>,
}

impl StateInfo {
    const fn empty() -> Self {
        StateInfo {
            key: 0,
            pawn_key: 0,
            non_pawn_keys: [0; 2],
            castling: CastlingRights::none(),
            ep_file: None,
            halfmove_clock: 0,
            plies_from_null: 0,
            captured: None,
        }
    }
}

/// A chess position with make/unmake support.
///
/// Piece placement is held three ways that are kept in lockstep: one bitboard
/// per piece type, one per color (plus their union), and a 64-entry lookup
/// array. The only mutators are [`Position::make_move`],
/// [`Position::unmake_move`], [`Position::make_null_move`] and
/// [`Position::unmake_null_move`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub(crate) pieces: [Bitboard; 6],
    pub(crate) colors: [Bitboard; 2],
    pub(crate) occupied: Bitboard,
    pub(crate) board: [Option<(Color, Piece)>; 64],
    pub(crate) side_to_move: Color,
    pub(crate) state: StateInfo,
    pub(crate) history: Vec<StateInfo>,
    pub(crate) moves: Vec<Move>,
    pub(crate) start_fullmove: u32,
    pub(crate) start_side: Color,
}

impl Position {
    /// The standard initial position
    #[must_use]
    pub fn startpos() -> Self {
        let mut pos = Position::empty();
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, piece) in back_rank.into_iter().enumerate() {
            pos.add_piece(Color::White, piece, Square::from_index(file));
            pos.add_piece(Color::White, Piece::Pawn, Square::from_index(8 + file));
            pos.add_piece(Color::Black, Piece::Pawn, Square::from_index(48 + file));
            pos.add_piece(Color::Black, piece, Square::from_index(56 + file));
        }
        pos.state.castling = CastlingRights::all();
        pos.refresh_keys();
        pos
    }

    pub(crate) fn empty() -> Self {
        Position {
            pieces: [Bitboard::EMPTY; 6],
            colors: [Bitboard::EMPTY; 2],
            occupied: Bitboard::EMPTY,
            board: [None; 64],
            side_to_move: Color::White,
            state: StateInfo::empty(),
            history: Vec::with_capacity(256),
            moves: Vec::with_capacity(256),
            start_fullmove: 1,
            start_side: Color::White,
        }
    }

    // ---- Raw board edits (no hashing) ----

    #[inline]
    pub(crate) fn add_piece(&mut self, color: Color, piece: Piece, sq: Square) {
        let bb = Bitboard::from_square(sq);
        self.pieces[piece.index()] |= bb;
        self.colors[color.index()] |= bb;
        self.occupied |= bb;
        self.board[sq.index()] = Some((color, piece));
    }

    #[inline]
    pub(crate) fn remove_piece(&mut self, color: Color, piece: Piece, sq: Square) {
        let bb = Bitboard::from_square(sq);
        self.pieces[piece.index()] ^= bb;
        self.colors[color.index()] ^= bb;
        self.occupied ^= bb;
        self.board[sq.index()] = None;
    }

    #[inline]
    pub(crate) fn move_piece(&mut self, color: Color, piece: Piece, from: Square, to: Square) {
        let bb = Bitboard::from_square(from) | Bitboard::from_square(to);
        self.pieces[piece.index()] ^= bb;
        self.colors[color.index()] ^= bb;
        self.occupied ^= bb;
        self.board[from.index()] = None;
        self.board[to.index()] = Some((color, piece));
    }

    /// Toggle one piece-square contribution in every key that tracks it
    #[inline]
    pub(crate) fn hash_piece(&mut self, color: Color, piece: Piece, sq: Square) {
        let k = piece_key(color, piece, sq);
        self.state.key ^= k;
        if piece == Piece::Pawn {
            self.state.pawn_key ^= k;
        } else {
            self.state.non_pawn_keys[color.index()] ^= k;
        }
    }

    /// Compute `(key, pawn_key, non_pawn_keys)` from scratch.
    #[must_use]
    pub fn recompute_keys(&self) -> (u64, u64, [u64; 2]) {
        let mut key = 0;
        let mut pawn_key = 0;
        let mut non_pawn = [0u64; 2];
        for sq in Square::all() {
            if let Some((color, piece)) = self.board[sq.index()] {
                let k = piece_key(color, piece, sq);
                key ^= k;
                if piece == Piece::Pawn {
                    pawn_key ^= k;
                } else {
                    non_pawn[color.index()] ^= k;
                }
            }
        }
        if self.side_to_move == Color::Black {
            key ^= side_key();
        }
        key ^= castling_key(self.state.castling);
        if let Some(file) = self.state.ep_file {
            key ^= en_passant_key(file);
        }
        (key, pawn_key, non_pawn)
    }

    pub(crate) fn refresh_keys(&mut self) {
        let (key, pawn_key, non_pawn) = self.recompute_keys();
        self.state.key = key;
        self.state.pawn_key = pawn_key;
        self.state.non_pawn_keys = non_pawn;
    }

    // ---- Queries ----

    #[inline]
    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        self.board[sq.index()]
    }

    #[inline]
    #[must_use]
    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.board[sq.index()].map(|(_, piece)| piece)
    }

    #[inline]
    #[must_use]
    pub fn color_on(&self, sq: Square) -> Option<Color> {
        self.board[sq.index()].map(|(color, _)| color)
    }

    /// Pieces of one type and color
    #[inline]
    #[must_use]
    pub fn pieces(&self, color: Color, piece: Piece) -> Bitboard {
        self.pieces[piece.index()] & self.colors[color.index()]
    }

    /// Pieces of one type, both colors
    #[inline]
    #[must_use]
    pub fn pieces_of_type(&self, piece: Piece) -> Bitboard {
        self.pieces[piece.index()]
    }

    #[inline]
    #[must_use]
    pub fn color_bb(&self, color: Color) -> Bitboard {
        self.colors[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn occupied(&self) -> Bitboard {
        self.occupied
    }

    /// King square of `color`. Every valid position has exactly one.
    #[inline]
    #[must_use]
    pub fn king_square(&self, color: Color) -> Square {
        self.pieces(color, Piece::King).lsb()
    }

    /// Full Zobrist key
    #[inline]
    #[must_use]
    pub fn key(&self) -> u64 {
        self.state.key
    }

    #[inline]
    #[must_use]
    pub fn pawn_key(&self) -> u64 {
        self.state.pawn_key
    }

    #[inline]
    #[must_use]
    pub fn non_pawn_key(&self, color: Color) -> u64 {
        self.state.non_pawn_keys[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn castling_rights(&self) -> CastlingRights {
        self.state.castling
    }

    /// En-passant file (0-7) after a double pawn push, `None` otherwise
    #[inline]
    #[must_use]
    pub fn ep_file(&self) -> Option<u8> {
        self.state.ep_file
    }

    /// The en-passant target square implied by the ep file
    #[must_use]
    pub fn ep_square(&self) -> Option<Square> {
        let rank = match self.side_to_move {
            Color::White => 5,
            Color::Black => 2,
        };
        self.state
            .ep_file
            .and_then(|file| Square::new(rank, file as usize))
    }

    #[inline]
    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.state.halfmove_clock
    }

    #[must_use]
    pub fn fullmove_number(&self) -> u32 {
        let offset = usize::from(self.start_side == Color::Black);
        self.start_fullmove + ((self.moves.len() + offset) / 2) as u32
    }

    /// Number of moves (including null moves) applied since construction
    #[inline]
    #[must_use]
    pub fn ply_count(&self) -> usize {
        self.moves.len()
    }

    #[must_use]
    pub fn last_move(&self) -> Option<Move> {
        self.moves.last().copied()
    }

    /// The piece captured by the last move, if any
    #[inline]
    #[must_use]
    pub fn captured_piece(&self) -> Option<Piece> {
        self.state.captured
    }

    /// True if `color` has anything besides pawns and king
    #[must_use]
    pub fn has_non_pawn_material(&self, color: Color) -> bool {
        let pawns_and_king = self.pieces_of_type(Piece::Pawn) | self.pieces_of_type(Piece::King);
        (self.color_bb(color) & !pawns_and_king).any()
    }

    // ---- Draw queries ----

    /// Earlier occurrences of the current position within the reversible window.
    #[must_use]
    pub fn repetition_count(&self) -> usize {
        let window = self.state.halfmove_clock.min(self.state.plies_from_null) as usize;
        let len = self.history.len();
        let mut count = 0;
        let mut back = 2;
        while back <= window && back <= len {
            if self.history[len - back].key == self.state.key {
                count += 1;
            }
            back += 2;
        }
        count
    }

    /// The current position has occurred twice before (three times in total).
    #[must_use]
    pub fn is_threefold_repetition(&self) -> bool {
        self.repetition_count() >= 2
    }

    /// A hundred half-moves without a capture or pawn move. Checkmate on the
    /// hundredth half-move still stands.
    #[must_use]
    pub fn is_fifty_move_draw(&self) -> bool {
        self.state.halfmove_clock >= 100 && !self.is_checkmate()
    }

    /// No pawns, rooks or queens and at most one minor piece per side.
    #[must_use]
    pub fn is_insufficient_material(&self) -> bool {
        let heavy = self.pieces_of_type(Piece::Pawn)
            | self.pieces_of_type(Piece::Rook)
            | self.pieces_of_type(Piece::Queen);
        if heavy.any() {
            return false;
        }
        let minors = self.pieces_of_type(Piece::Knight) | self.pieces_of_type(Piece::Bishop);
        Color::BOTH
            .iter()
            .all(|&c| (minors & self.color_bb(c)).popcount() <= 1)
    }

    /// Game-level draw: threefold, fifty-move rule or insufficient material
    #[must_use]
    pub fn is_draw(&self) -> bool {
        self.is_threefold_repetition() || self.is_fifty_move_draw() || self.is_insufficient_material()
    }

    /// Cheap draw test used inside the search.
    ///
    /// A single earlier occurrence already counts as a draw here, which can
    /// misjudge a line that would only repeat once; the search accepts that
    /// approximation.
    #[must_use]
    pub fn is_effective_draw(&self) -> bool {
        self.is_fifty_move_draw() || self.repetition_count() >= 1 || self.is_insufficient_material()
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::startpos()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let c = Square::new(rank, file)
                    .and_then(|sq| self.piece_at(sq))
                    .map_or('.', |(color, piece)| piece.to_fen_char(color));
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        writeln!(f)?;
        writeln!(f, "Fen: {}", self.to_fen())?;
        write!(f, "Key: {:016X}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_layout() {
        let pos = Position::startpos();
        assert_eq!(pos.occupied().popcount(), 32);
        assert_eq!(pos.piece_at(Square::E1), Some((Color::White, Piece::King)));
        assert_eq!(pos.piece_at(Square::D8), Some((Color::Black, Piece::Queen)));
        assert_eq!(pos.king_square(Color::Black), Square::E8);
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.castling_rights(), CastlingRights::all());
        assert_eq!(pos.ep_file(), None);
    }

    #[test]
    fn redundant_views_agree() {
        let pos = Position::startpos();
        assert_eq!(pos.color_bb(Color::White) | pos.color_bb(Color::Black), pos.occupied());
        for sq in Square::all() {
            match pos.piece_at(sq) {
                Some((color, piece)) => assert!(pos.pieces(color, piece).contains(sq)),
                None => assert!(!pos.occupied().contains(sq)),
            }
        }
    }

    #[test]
    fn keys_match_recompute() {
        let pos = Position::startpos();
        let (key, pawn_key, non_pawn) = pos.recompute_keys();
        assert_eq!(pos.key(), key);
        assert_eq!(pos.pawn_key(), pawn_key);
        assert_eq!(pos.non_pawn_key(Color::White), non_pawn[0]);
        assert_ne!(pos.non_pawn_key(Color::White), pos.non_pawn_key(Color::Black));
    }

    #[test]
    fn startpos_is_not_drawn() {
        let pos = Position::startpos();
        assert!(!pos.is_draw());
        assert!(!pos.is_effective_draw());
        assert!(pos.has_non_pawn_material(Color::White));
    }
}
