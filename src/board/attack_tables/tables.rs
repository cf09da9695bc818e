//! Precomputed tables for leaper pieces and square-pair geometry.

use once_cell::sync::Lazy;

use super::magic::{slow_attacks, BISHOP_DIRS, ROOK_DIRS};

fn leaper_table(deltas: &[(i32, i32); 8]) -> [u64; 64] {
    let mut attacks = [0u64; 64];
    for (sq, slot) in attacks.iter_mut().enumerate() {
        let r = (sq / 8) as i32;
        let f = (sq % 8) as i32;
        let mut mask = 0u64;
        for &(dr, df) in deltas {
            let (nr, nf) = (r + dr, f + df);
            if (0..8).contains(&nr) && (0..8).contains(&nf) {
                mask |= 1u64 << (nr * 8 + nf);
            }
        }
        *slot = mask;
    }
    attacks
}

pub(crate) static KNIGHT_ATTACKS: Lazy<[u64; 64]> = Lazy::new(|| {
    leaper_table(&[
        (2, 1),
        (1, 2),
        (-1, 2),
        (-2, 1),
        (-2, -1),
        (-1, -2),
        (1, -2),
        (2, -1),
    ])
});

pub(crate) static KING_ATTACKS: Lazy<[u64; 64]> = Lazy::new(|| {
    leaper_table(&[
        (1, 0),
        (-1, 0),
        (0, 1),
        (0, -1),
        (1, 1),
        (1, -1),
        (-1, 1),
        (-1, -1),
    ])
});

/// Pawn capture targets indexed by `[color][square]`
pub(crate) static PAWN_ATTACKS: Lazy<[[u64; 64]; 2]> = Lazy::new(|| {
    let mut attacks = [[0u64; 64]; 2];
    for sq in 0..64 {
        let bit = 1u64 << sq;
        let not_a = !0x0101010101010101u64;
        let not_h = !0x8080808080808080u64;
        attacks[0][sq] = ((bit << 7) & not_h) | ((bit << 9) & not_a);
        attacks[1][sq] = ((bit >> 9) & not_h) | ((bit >> 7) & not_a);
    }
    attacks
});

/// Square-pair geometry: `between[a][b]` holds the squares strictly between two
/// aligned squares, `line[a][b]` the full edge-to-edge line through both.
/// Both are empty when the squares share no rank, file or diagonal.
pub(crate) struct Geometry {
    pub between: Box<[[u64; 64]; 64]>,
    pub line: Box<[[u64; 64]; 64]>,
}

pub(crate) static GEOMETRY: Lazy<Geometry> = Lazy::new(|| {
    let mut between = Box::new([[0u64; 64]; 64]);
    let mut line = Box::new([[0u64; 64]; 64]);
    for a in 0..64 {
        for dirs in [&BISHOP_DIRS, &ROOK_DIRS] {
            let empty_rays = slow_attacks(a, 0, dirs);
            for b in 0..64 {
                if a == b || empty_rays & (1u64 << b) == 0 {
                    continue;
                }
                let from_a = slow_attacks(a, 1u64 << b, dirs);
                let from_b = slow_attacks(b, 1u64 << a, dirs);
                between[a][b] = from_a & from_b;
                line[a][b] = (empty_rays & slow_attacks(b, 0, dirs)) | (1u64 << a) | (1u64 << b);
            }
        }
    }
    Geometry { between, line }
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knight_and_king_counts() {
        assert_eq!(KNIGHT_ATTACKS[0].count_ones(), 2);
        assert_eq!(KNIGHT_ATTACKS[27].count_ones(), 8);
        assert_eq!(KING_ATTACKS[0].count_ones(), 3);
        assert_eq!(KING_ATTACKS[27].count_ones(), 8);
    }

    #[test]
    fn pawn_attacks_respect_edges() {
        // White pawn a2 attacks b3 only; black pawn h7 attacks g6 only
        assert_eq!(PAWN_ATTACKS[0][8], 1u64 << 17);
        assert_eq!(PAWN_ATTACKS[1][55], 1u64 << 46);
    }

    #[test]
    fn between_and_line() {
        // a1..h8 diagonal
        let between = GEOMETRY.between[0][63];
        assert_eq!(between.count_ones(), 6);
        assert_eq!(GEOMETRY.line[0][63].count_ones(), 8);
        // e1 and e8 on the e-file
        assert_eq!(GEOMETRY.between[4][60].count_ones(), 6);
        assert_eq!(GEOMETRY.line[4][60], 0x1010101010101010);
        // adjacent squares have nothing between them
        assert_eq!(GEOMETRY.between[0][1], 0);
        // knight-distance squares are not aligned
        assert_eq!(GEOMETRY.between[0][17], 0);
        assert_eq!(GEOMETRY.line[0][17], 0);
    }
}
