//! Move types and move list.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::piece::Piece;
use super::square::Square;
use crate::board::error::MoveParseError;

// Move flags (4 bits)
const FLAG_NONE: u16 = 0;
const FLAG_EN_PASSANT: u16 = 1;
const FLAG_CASTLE: u16 = 2;
const FLAG_DOUBLE_PUSH: u16 = 3;
const FLAG_PROMO_KNIGHT: u16 = 4;
const FLAG_PROMO_BISHOP: u16 = 5;
const FLAG_PROMO_ROOK: u16 = 6;
const FLAG_PROMO_QUEEN: u16 = 7;

/// Bits that take part in move identity: from, to and a promotion flag.
const IDENTITY_MASK: u16 = 0x0FFF;

/// Compact 16-bit move representation.
///
/// Encoding:
/// - bits 0-5:   from square (0-63)
/// - bits 6-11:  to square (0-63)
/// - bits 12-15: flag (none, en passant, castle, double push, promotion piece)
///
/// Two moves compare equal when from, to and promotion piece match. The
/// en-passant, castle and double-push flags are derived from the position
/// and are ignored by `==` and `Hash`.
#[derive(Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Move(u16);

impl Move {
    /// The "no move" sentinel (a1a1), stored in empty table slots
    pub const NULL: Move = Move(0);

    #[inline]
    const fn with_flag(from: Square, to: Square, flag: u16) -> Self {
        Move(from.index() as u16 | ((to.index() as u16) << 6) | (flag << 12))
    }

    /// Create a plain move (quiet move or ordinary capture)
    #[inline]
    #[must_use]
    pub const fn new(from: Square, to: Square) -> Self {
        Move::with_flag(from, to, FLAG_NONE)
    }

    #[inline]
    #[must_use]
    pub const fn double_push(from: Square, to: Square) -> Self {
        Move::with_flag(from, to, FLAG_DOUBLE_PUSH)
    }

    #[inline]
    #[must_use]
    pub const fn en_passant(from: Square, to: Square) -> Self {
        Move::with_flag(from, to, FLAG_EN_PASSANT)
    }

    /// King move of a castle; `to` is the king's destination (c- or g-file)
    #[inline]
    #[must_use]
    pub const fn castle(from: Square, to: Square) -> Self {
        Move::with_flag(from, to, FLAG_CASTLE)
    }

    /// Create a promotion move. Pawn and king default to a queen.
    #[inline]
    #[must_use]
    pub const fn promotion(from: Square, to: Square, piece: Piece) -> Self {
        let flag = match piece {
            Piece::Knight => FLAG_PROMO_KNIGHT,
            Piece::Bishop => FLAG_PROMO_BISHOP,
            Piece::Rook => FLAG_PROMO_ROOK,
            _ => FLAG_PROMO_QUEEN,
        };
        Move::with_flag(from, to, flag)
    }

    /// Get the source square
    #[inline]
    #[must_use]
    pub const fn from(self) -> Square {
        Square::from_index((self.0 & 0x3F) as usize)
    }

    /// Get the destination square
    #[inline]
    #[must_use]
    pub const fn to(self) -> Square {
        Square::from_index(((self.0 >> 6) & 0x3F) as usize)
    }

    #[inline]
    const fn flag(self) -> u16 {
        self.0 >> 12
    }

    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 & IDENTITY_MASK == 0
    }

    #[inline]
    #[must_use]
    pub const fn is_en_passant(self) -> bool {
        self.flag() == FLAG_EN_PASSANT
    }

    #[inline]
    #[must_use]
    pub const fn is_castle(self) -> bool {
        self.flag() == FLAG_CASTLE
    }

    #[inline]
    #[must_use]
    pub const fn is_double_push(self) -> bool {
        self.flag() == FLAG_DOUBLE_PUSH
    }

    #[inline]
    #[must_use]
    pub const fn is_promotion(self) -> bool {
        self.flag() >= FLAG_PROMO_KNIGHT
    }

    /// Get the promotion piece, if this is a promotion move
    #[inline]
    #[must_use]
    pub const fn promotion_piece(self) -> Option<Piece> {
        match self.flag() {
            FLAG_PROMO_KNIGHT => Some(Piece::Knight),
            FLAG_PROMO_BISHOP => Some(Piece::Bishop),
            FLAG_PROMO_ROOK => Some(Piece::Rook),
            FLAG_PROMO_QUEEN => Some(Piece::Queen),
            _ => None,
        }
    }

    /// Get the raw 16-bit value (for table storage)
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Create from raw 16-bit value
    #[inline]
    #[must_use]
    pub const fn from_u16(value: u16) -> Self {
        Move(value)
    }

    #[inline]
    const fn identity(self) -> u16 {
        if self.is_promotion() {
            self.0
        } else {
            self.0 & IDENTITY_MASK
        }
    }

    /// Parse coordinate text ("e2e4", "e7e8q") into from/to/promotion.
    ///
    /// The result carries no derived flags; resolve it against a position
    /// with [`crate::board::Position::parse_move`] before applying it.
    pub fn from_text(text: &str) -> Result<Move, MoveParseError> {
        if text == "0000" {
            return Ok(Move::NULL);
        }
        if !(4..=5).contains(&text.len()) || !text.is_ascii() {
            return Err(MoveParseError::InvalidLength {
                len: text.chars().count(),
            });
        }
        let from: Square = text[0..2]
            .parse()
            .map_err(|_| MoveParseError::InvalidSquare {
                notation: text.to_string(),
            })?;
        let to: Square = text[2..4]
            .parse()
            .map_err(|_| MoveParseError::InvalidSquare {
                notation: text.to_string(),
            })?;
        if from == to {
            return Err(MoveParseError::InvalidSquare {
                notation: text.to_string(),
            });
        }
        match text[4..].chars().next() {
            None => Ok(Move::new(from, to)),
            Some(c) => match Piece::from_char(c) {
                Some(piece @ (Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen))
                    if c.is_ascii_lowercase() =>
                {
                    Ok(Move::promotion(from, to, piece))
                }
                _ => Err(MoveParseError::InvalidPromotion { char: c }),
            },
        }
    }
}

impl PartialEq for Move {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl Default for Move {
    fn default() -> Self {
        Move::NULL
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({self}")?;
        if self.is_castle() {
            write!(f, " castle")?;
        }
        if self.is_en_passant() {
            write!(f, " ep")?;
        }
        if self.is_double_push() {
            write!(f, " dp")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "0000");
        }
        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(promo) = self.promotion_piece() {
            write!(f, "{}", promo.to_char())?;
        }
        Ok(())
    }
}

pub(crate) const MAX_MOVES: usize = 256;

/// Maximum search ply tracked by per-ply tables
pub const MAX_PLY: usize = 128;

/// List of moves with fixed-size backing array.
#[derive(Clone, Debug)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: usize,
}

impl MoveList {
    #[must_use]
    pub fn new() -> Self {
        MoveList {
            moves: [Move::NULL; MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, mv: Move) {
        self.moves[self.len] = mv;
        self.len += 1;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    #[must_use]
    pub fn contains(&self, mv: Move) -> bool {
        self.as_slice().contains(&mv)
    }

    /// Return the stored move equal to `mv`, carrying its derived flags
    #[must_use]
    pub fn find(&self, mv: Move) -> Option<Move> {
        self.iter().copied().find(|m| *m == mv)
    }

    /// Keep only the moves matching the predicate, preserving order
    pub fn retain(&mut self, mut keep: impl FnMut(Move) -> bool) {
        let mut write = 0;
        for read in 0..self.len {
            let mv = self.moves[read];
            if keep(mv) {
                self.moves[write] = mv;
                write += 1;
            }
        }
        self.len = write;
    }

    #[must_use]
    pub fn first(&self) -> Option<Move> {
        self.as_slice().first().copied()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl Default for MoveList {
    fn default() -> Self {
        MoveList::new()
    }
}

/// Owning iterator over moves in a `MoveList`
pub struct MoveListIntoIter {
    list: MoveList,
    idx: usize,
}

impl Iterator for MoveListIntoIter {
    type Item = Move;

    fn next(&mut self) -> Option<Self::Item> {
        if self.idx < self.list.len {
            let mv = self.list.moves[self.idx];
            self.idx += 1;
            Some(mv)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.list.len - self.idx;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for MoveListIntoIter {}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = MoveListIntoIter;

    fn into_iter(self) -> Self::IntoIter {
        MoveListIntoIter { list: self, idx: 0 }
    }
}

impl Index<usize> for MoveList {
    type Output = Move;

    fn index(&self, idx: usize) -> &Self::Output {
        assert!(
            idx < self.len,
            "MoveList index {} out of bounds (len {})",
            idx,
            self.len
        );
        &self.moves[idx]
    }
}

/// A move paired with its ordering score.
#[derive(Clone, Copy, Debug)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: i32,
}

/// Fixed-size list of scored moves to avoid heap allocation.
#[derive(Clone, Debug)]
pub struct ScoredMoveList {
    moves: [ScoredMove; MAX_MOVES],
    len: usize,
}

impl ScoredMoveList {
    #[must_use]
    pub fn new() -> Self {
        ScoredMoveList {
            moves: [ScoredMove {
                mv: Move::NULL,
                score: 0,
            }; MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, mv: Move, score: i32) {
        self.moves[self.len] = ScoredMove { mv, score };
        self.len += 1;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ScoredMove] {
        &self.moves[..self.len]
    }

    /// Sort moves by score in descending order.
    ///
    /// Ties keep generation order so repeated searches visit moves identically.
    pub fn sort_by_score_desc(&mut self) {
        self.moves[..self.len].sort_by(|a, b| b.score.cmp(&a.score));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredMove> {
        self.as_slice().iter()
    }
}

impl Default for ScoredMoveList {
    fn default() -> Self {
        ScoredMoveList::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn equality_ignores_derived_flags() {
        let plain = Move::new(sq("e2"), sq("e4"));
        let double = Move::double_push(sq("e2"), sq("e4"));
        assert_eq!(plain, double);
        assert_eq!(Move::new(sq("e1"), sq("g1")), Move::castle(sq("e1"), sq("g1")));
        assert_eq!(Move::new(sq("e5"), sq("d6")), Move::en_passant(sq("e5"), sq("d6")));
    }

    #[test]
    fn promotion_piece_is_part_of_identity() {
        let q = Move::promotion(sq("e7"), sq("e8"), Piece::Queen);
        let n = Move::promotion(sq("e7"), sq("e8"), Piece::Knight);
        assert_ne!(q, n);
        assert_ne!(q, Move::new(sq("e7"), sq("e8")));
        assert_eq!(q.promotion_piece(), Some(Piece::Queen));
    }

    #[test]
    fn text_round_trip() {
        for text in ["e2e4", "a7a8q", "h2h1n", "b7c8r", "g2f1b", "e1g1"] {
            let mv = Move::from_text(text).unwrap();
            assert_eq!(mv.to_string(), text);
        }
        assert_eq!(Move::NULL.to_string(), "0000");
    }

    #[test]
    fn text_errors() {
        assert!(matches!(
            Move::from_text("e2"),
            Err(MoveParseError::InvalidLength { len: 2 })
        ));
        assert!(matches!(
            Move::from_text("z2e4"),
            Err(MoveParseError::InvalidSquare { .. })
        ));
        assert!(matches!(
            Move::from_text("e7e8k"),
            Err(MoveParseError::InvalidPromotion { char: 'k' })
        ));
        assert!(matches!(
            Move::from_text("e7e8Q"),
            Err(MoveParseError::InvalidPromotion { char: 'Q' })
        ));
    }

    #[test]
    fn scored_list_sorts_descending_and_stably() {
        let mut list = ScoredMoveList::new();
        let a = Move::new(sq("a2"), sq("a3"));
        let b = Move::new(sq("b2"), sq("b3"));
        let c = Move::new(sq("c2"), sq("c3"));
        list.push(a, 5);
        list.push(b, 10);
        list.push(c, 5);
        list.sort_by_score_desc();
        let order: Vec<Move> = list.iter().map(|s| s.mv).collect();
        assert_eq!(order, vec![b, a, c]);
    }
}
