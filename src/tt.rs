//! Transposition table for caching search results.
//!
//! Uses Zobrist hashes to store and retrieve position evaluations,
//! enabling significant search tree pruning.
//!
//! The table is shared by every Lazy SMP worker without locks. Each slot is a
//! pair of atomic u64 words storing `key ^ data` and `data`; a torn write from
//! two racing threads fails the XOR check and reads back as a miss. Replacement
//! is always-replace: a store overwrites whatever occupies the slot.

use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::board::{Move, MATE_THRESHOLD};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundType {
    Exact,      // Score is the exact value
    LowerBound, // Score is at least this value (failed high - score >= beta)
    UpperBound, // Score is at most this value (failed low - score <= alpha)
}

impl BoundType {
    fn to_u8(self) -> u8 {
        match self {
            BoundType::Exact => 0,
            BoundType::LowerBound => 1,
            BoundType::UpperBound => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v & 0x3 {
            0 => BoundType::Exact,
            1 => BoundType::LowerBound,
            _ => BoundType::UpperBound,
        }
    }
}

/// Unpacked TT entry for reading
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TTEntry {
    pub depth: u8,
    pub score: i16,
    pub bound_type: BoundType,
    pub best_move: Option<Move>,
}

impl TTEntry {
    #[must_use]
    pub fn depth(&self) -> u32 {
        u32::from(self.depth)
    }

    #[must_use]
    pub fn score(&self) -> i32 {
        i32::from(self.score)
    }

    #[must_use]
    pub fn bound_type(&self) -> BoundType {
        self.bound_type
    }

    #[must_use]
    pub fn best_move(&self) -> Option<Move> {
        self.best_move
    }

    /// Whether the stored score decides the node for the given window.
    ///
    /// The stored depth must cover the remaining depth; an exact score always
    /// cuts, a lower bound only at or above `beta`, an upper bound only at or
    /// below `alpha`.
    #[must_use]
    pub fn usable(&self, depth: u32, alpha: i32, beta: i32, score: i32) -> bool {
        if self.depth() < depth {
            return false;
        }
        match self.bound_type {
            BoundType::Exact => true,
            BoundType::LowerBound => score >= beta,
            BoundType::UpperBound => score <= alpha,
        }
    }
}

/// Marks a written slot so an all-zero payload is never mistaken for empty
const VALID_BIT: u64 = 1 << 48;

/// Packed entry format (fits in 64 bits):
/// - bits 0-15:  move (u16, 0 = no move)
/// - bits 16-31: score (i16 as u16)
/// - bits 32-39: depth (u8)
/// - bits 40-41: bound
/// - bit 48:     valid flag
fn pack_entry(depth: u8, score: i16, bound_type: BoundType, best_move: Option<Move>) -> u64 {
    let mv: u16 = best_move.map_or(0, Move::as_u16);
    let sc: u16 = score as u16;

    u64::from(mv)
        | (u64::from(sc) << 16)
        | (u64::from(depth) << 32)
        | (u64::from(bound_type.to_u8()) << 40)
        | VALID_BIT
}

fn unpack_entry(data: u64) -> TTEntry {
    let mv_bits = (data & 0xFFFF) as u16;
    let score = ((data >> 16) & 0xFFFF) as i16;
    let depth = ((data >> 32) & 0xFF) as u8;
    let bound_type = BoundType::from_u8(((data >> 40) & 0x3) as u8);

    let best_move = if mv_bits == 0 {
        None
    } else {
        Some(Move::from_u16(mv_bits))
    };

    TTEntry {
        depth,
        score,
        bound_type,
        best_move,
    }
}

/// A single TT slot using lockless hashing.
///
/// Uses the XOR technique: stores (key ^ data) and data separately.
/// On read, we verify by checking if (stored_key ^ data) equals the probe key.
/// This detects torn reads from concurrent writes.
#[repr(C)]
struct TTSlot {
    /// Stores: hash_key ^ packed_data
    key_xor: AtomicU64,
    /// Stores: packed_data
    data: AtomicU64,
}

impl TTSlot {
    fn new() -> Self {
        TTSlot {
            key_xor: AtomicU64::new(0),
            data: AtomicU64::new(0),
        }
    }

    fn store(&self, hash: u64, packed: u64) {
        self.data.store(packed, Ordering::Relaxed);
        self.key_xor.store(hash ^ packed, Ordering::Relaxed);
    }

    fn probe(&self, hash: u64) -> Option<TTEntry> {
        let key_xor = self.key_xor.load(Ordering::Relaxed);
        let data = self.data.load(Ordering::Relaxed);

        if data & VALID_BIT != 0 && key_xor ^ data == hash {
            Some(unpack_entry(data))
        } else {
            None
        }
    }

    fn is_empty(&self) -> bool {
        self.data.load(Ordering::Relaxed) == 0
    }

    fn clear(&self) {
        self.key_xor.store(0, Ordering::Relaxed);
        self.data.store(0, Ordering::Relaxed);
    }
}

/// Thread-safe transposition table using lockless hashing.
///
/// Multiple threads can read and write concurrently without locks.
/// Torn reads are detected via XOR verification and discarded.
pub struct TranspositionTable {
    slots: Vec<TTSlot>,
    mask: usize,
}

impl TranspositionTable {
    /// Create a table of at most `size_mb` megabytes, rounded down to a power
    /// of two slot count (minimum 1024 slots).
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let slot_size = mem::size_of::<TTSlot>();
        let wanted = size_mb.saturating_mul(1024 * 1024) / slot_size;
        let num_slots = if wanted < 1024 {
            1024
        } else if wanted.is_power_of_two() {
            wanted
        } else {
            wanted.next_power_of_two() / 2
        };

        let mut slots = Vec::with_capacity(num_slots);
        slots.resize_with(num_slots, TTSlot::new);

        log::debug!(
            "transposition table: {} slots ({} KiB)",
            num_slots,
            num_slots * slot_size / 1024
        );

        TranspositionTable {
            slots,
            mask: num_slots - 1,
        }
    }

    /// Number of slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    /// Probe the table for an entry matching the given hash.
    /// Returns None if no valid entry is found.
    #[must_use]
    pub fn probe(&self, hash: u64) -> Option<TTEntry> {
        self.slots[self.index(hash)].probe(hash)
    }

    /// Store an entry, overwriting the slot for this key unconditionally.
    pub fn store(
        &self,
        hash: u64,
        depth: u32,
        score: i32,
        bound_type: BoundType,
        best_move: Option<Move>,
    ) {
        let depth_u8 = depth.min(255) as u8;
        let score_i16 = score.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
        let best_move = best_move.filter(|mv| !mv.is_null());
        let packed = pack_entry(depth_u8, score_i16, bound_type, best_move);
        self.slots[self.index(hash)].store(hash, packed);
    }

    /// Returns hash table fullness in per mille (0-1000).
    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        // Sample the first 1000 slots for efficiency
        let sample_size = self.slots.len().min(1000);
        let occupied = self
            .slots
            .iter()
            .take(sample_size)
            .filter(|slot| !slot.is_empty())
            .count();
        ((occupied * 1000) / sample_size) as u32
    }

    /// Clear all entries from the table.
    pub fn clear(&self) {
        for slot in &self.slots {
            slot.clear();
        }
    }
}

/// Convert a root-relative mate score into a node-relative one for storage.
#[inline]
#[must_use]
pub fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_THRESHOLD {
        score + ply as i32
    } else if score <= -MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

/// Inverse of [`score_to_tt`] for the probing node's ply.
#[inline]
#[must_use]
pub fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply as i32
    } else if score <= -MATE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Square, MATE_SCORE};

    #[test]
    fn test_pack_unpack_roundtrip() {
        let mv = Move::new(Square::E1, Square::G1);
        let packed = pack_entry(255, -32000, BoundType::LowerBound, Some(mv));
        let unpacked = unpack_entry(packed);
        assert_eq!(unpacked.depth, 255);
        assert_eq!(unpacked.score, -32000);
        assert_eq!(unpacked.bound_type, BoundType::LowerBound);
        assert_eq!(unpacked.best_move, Some(mv));
        assert_eq!(unpack_entry(pack_entry(0, 0, BoundType::Exact, None)).best_move, None);
    }

    #[test]
    fn test_store_and_probe() {
        let tt = TranspositionTable::new(1);
        let hash = 0x123456789ABCDEF0;

        tt.store(hash, 10, 500, BoundType::Exact, None);

        let entry = tt.probe(hash).expect("should find entry");
        assert_eq!(entry.depth, 10);
        assert_eq!(entry.score, 500);
        assert_eq!(entry.bound_type, BoundType::Exact);
    }

    #[test]
    fn zero_payload_is_still_a_hit() {
        let tt = TranspositionTable::new(1);
        tt.store(42, 0, 0, BoundType::Exact, None);
        assert!(tt.probe(42).is_some());
    }

    #[test]
    fn test_no_false_positives() {
        let tt = TranspositionTable::new(1);
        let hash1 = 0x123456789ABCDEF0;
        let hash2 = 0xFEDCBA9876543210;

        tt.store(hash1, 10, 500, BoundType::Exact, None);

        assert!(tt.probe(hash2).is_none());
    }

    #[test]
    fn colliding_key_is_a_miss_and_always_replaced() {
        let tt = TranspositionTable::new(1);
        let a = 0x0000_0001_0000_0005;
        let b = a + (tt.len() as u64) * 7; // same slot, different key
        assert_eq!(tt.index(a), tt.index(b));

        tt.store(a, 12, 100, BoundType::Exact, None);
        assert!(tt.probe(b).is_none());

        // A shallower entry for another key still replaces the deep one
        tt.store(b, 1, -50, BoundType::UpperBound, None);
        assert!(tt.probe(a).is_none());
        assert_eq!(tt.probe(b).map(|e| e.score()), Some(-50));
    }

    #[test]
    fn size_is_power_of_two() {
        for mb in [1, 3, 16, 17] {
            let tt = TranspositionTable::new(mb);
            assert!(tt.len().is_power_of_two());
            assert!(tt.len() * 16 <= mb * 1024 * 1024);
        }
    }

    #[test]
    fn hashfull_and_clear() {
        let tt = TranspositionTable::new(1);
        assert_eq!(tt.hashfull_per_mille(), 0);
        for i in 0..500u64 {
            tt.store(i, 1, 0, BoundType::Exact, None);
        }
        assert_eq!(tt.hashfull_per_mille(), 500);
        tt.clear();
        assert_eq!(tt.hashfull_per_mille(), 0);
    }

    #[test]
    fn bound_usability() {
        let exact = TTEntry {
            depth: 5,
            score: 10,
            bound_type: BoundType::Exact,
            best_move: None,
        };
        assert!(exact.usable(5, -100, 100, 10));
        assert!(!exact.usable(6, -100, 100, 10));
        let lower = TTEntry {
            bound_type: BoundType::LowerBound,
            ..exact
        };
        assert!(lower.usable(3, -100, 10, 10));
        assert!(!lower.usable(3, -100, 100, 10));
        let upper = TTEntry {
            bound_type: BoundType::UpperBound,
            ..exact
        };
        assert!(upper.usable(3, 10, 100, 10));
        assert!(!upper.usable(3, -100, 100, 10));
    }

    #[test]
    fn mate_scores_are_ply_adjusted() {
        // Mate found 3 plies below a node that is itself 4 plies from the root
        let root_score = MATE_SCORE - 7;
        let stored = score_to_tt(root_score, 4);
        assert_eq!(stored, MATE_SCORE - 3);
        // Probed again from a node at ply 2 the mate is 5 plies away
        assert_eq!(score_from_tt(stored, 2), MATE_SCORE - 5);
        assert_eq!(score_from_tt(score_to_tt(-root_score, 4), 4), -root_score);
        assert_eq!(score_to_tt(123, 9), 123);
    }
}
