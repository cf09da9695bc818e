//! Magic bitboard tables for sliding pieces.
//!
//! For every square the relevant blocker mask (the ray squares minus the
//! board edge) is multiplied by a fixed magic constant and shifted down to a
//! dense index into one shared attack array. The constants are fixed; the
//! tables are filled once at startup by enumerating every blocker subset of
//! each mask and ray-casting the true attack set.

use once_cell::sync::Lazy;

/// Per-square lookup record.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct MagicEntry {
    pub mask: u64,
    pub magic: u64,
    pub shift: u32,
    pub offset: usize,
}

impl MagicEntry {
    #[inline(always)]
    fn index(&self, occupied: u64) -> usize {
        self.offset + ((occupied & self.mask).wrapping_mul(self.magic) >> self.shift) as usize
    }
}

pub(crate) struct SliderTables {
    bishop: [MagicEntry; 64],
    rook: [MagicEntry; 64],
    attacks: Vec<u64>,
}

impl SliderTables {
    #[inline(always)]
    pub fn bishop(&self, sq: usize, occupied: u64) -> u64 {
        self.attacks[self.bishop[sq].index(occupied)]
    }

    #[inline(always)]
    pub fn rook(&self, sq: usize, occupied: u64) -> u64 {
        self.attacks[self.rook[sq].index(occupied)]
    }
}

pub(crate) const BISHOP_DIRS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub(crate) const ROOK_DIRS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

pub(crate) static SLIDERS: Lazy<SliderTables> = Lazy::new(build_slider_tables);

/// Relevant occupancy mask: every ray square except the last one before the edge.
pub(crate) fn relevant_mask(sq: usize, dirs: &[(i32, i32); 4]) -> u64 {
    let (rank, file) = ((sq / 8) as i32, (sq % 8) as i32);
    let mut mask = 0u64;
    for &(dr, df) in dirs {
        let (mut r, mut f) = (rank + dr, file + df);
        while (0..8).contains(&(r + dr)) && (0..8).contains(&(f + df)) {
            mask |= 1u64 << (r * 8 + f);
            r += dr;
            f += df;
        }
    }
    mask
}

/// Ray-cast attacks, stopping on (and including) the first blocker.
pub(crate) fn slow_attacks(sq: usize, occupied: u64, dirs: &[(i32, i32); 4]) -> u64 {
    let (rank, file) = ((sq / 8) as i32, (sq % 8) as i32);
    let mut attacks = 0u64;
    for &(dr, df) in dirs {
        let (mut r, mut f) = (rank + dr, file + df);
        while (0..8).contains(&r) && (0..8).contains(&f) {
            let bit = 1u64 << (r * 8 + f);
            attacks |= bit;
            if occupied & bit != 0 {
                break;
            }
            r += dr;
            f += df;
        }
    }
    attacks
}

fn fill_family(
    magics: &[u64; 64],
    dirs: &[(i32, i32); 4],
    attacks: &mut Vec<u64>,
    family: &str,
) -> [MagicEntry; 64] {
    let mut entries = [MagicEntry::default(); 64];
    for (sq, entry) in entries.iter_mut().enumerate() {
        let mask = relevant_mask(sq, dirs);
        let bits = mask.count_ones();
        *entry = MagicEntry {
            mask,
            magic: magics[sq],
            shift: 64 - bits,
            offset: attacks.len(),
        };
        attacks.resize(attacks.len() + (1usize << bits), 0);

        // Carry-rippler walk over every subset of the mask, starting at the empty set.
        let mut subset = 0u64;
        loop {
            let idx = entry.index(subset);
            let attack = slow_attacks(sq, subset, dirs);
            let slot = &mut attacks[idx];
            if *slot != 0 && *slot != attack {
                panic!("{family} magic collision on square {sq}: fixed constant is unusable");
            }
            *slot = attack;
            subset = subset.wrapping_sub(mask) & mask;
            if subset == 0 {
                break;
            }
        }
    }
    entries
}

fn build_slider_tables() -> SliderTables {
    let mut attacks = Vec::with_capacity(108_000);
    let bishop = fill_family(&BISHOP_MAGICS, &BISHOP_DIRS, &mut attacks, "bishop");
    let rook = fill_family(&ROOK_MAGICS, &ROOK_DIRS, &mut attacks, "rook");
    SliderTables {
        bishop,
        rook,
        attacks,
    }
}

const BISHOP_MAGICS: [u64; 64] = [
    0x1200440A0890200, 0x2040122021A0407, 0x4008880108210401, 0x211040080020000,
    0xA8A2121004000005, 0xA8A2121004000005, 0x4008880108210401, 0x8000804822012000,
    0x888008085094004C, 0x888008085094004C, 0x8000080214002010, 0x2204880A02200001,
    0xC1840420000200, 0x408220601223, 0x4424042C0CA0, 0x4424042C0CA0,
    0x2408410900200D8, 0x1004001010220048, 0x88088400240010, 0x2832400401020008,
    0x80A4000494201400, 0x2400808021080, 0x8000A00202112000, 0x2044300822100,
    0x2050A405845800, 0x200824C0083000A9, 0x500440208080014, 0x8144800008200C0,
    0x1421010001104001, 0x430008403004500, 0xA84042231010102, 0xA84042231010102,
    0x2202000501301, 0x4144200041000, 0x8002002E03100080, 0x340600800010810,
    0x6020020020040408, 0x65004A120020205, 0x8081040080043200, 0x8081040080043200,
    0x8001042120200420, 0x8001042120200420, 0x10C0402002C00, 0x4202024200801,
    0x4029101200921200, 0x4002224045004600, 0xC0900128010010A8, 0x4002224045004600,
    0x2082280104111100, 0x28440421080044, 0x280004404040101, 0x2100084110008,
    0x802001222020C80, 0x400204010A12, 0x8204102020000, 0x20040440404001,
    0x130A08404202A51, 0x428400888400, 0x4312022111000, 0x810008040A841100,
    0x4410010810020880, 0x862042002020208, 0x862042002020208, 0x82100116240041,
];

const ROOK_MAGICS: [u64; 64] = [
    0x80002018804000, 0xA040004010002000, 0x100200040081100, 0x4100100021000408,
    0x1100100800040300, 0x1100082100440082, 0x6580230000800200, 0x100010008812052,
    0x18800428400088, 0x42004102002088, 0xA208801000200084, 0x425000A21001000,
    0x402000408102200, 0x2000402001008, 0x4E46000102002804, 0x62000208941049,
    0x2000848008400020, 0x3100404000201000, 0x440808020001000, 0x14120008402200,
    0x2002020004100820, 0x216808002008400, 0x4484040001080290, 0x8400020000804401,
    0x4920208180014002, 0xA00500040002000, 0xC800110100200840, 0x2000084200120020,
    0x8000404002040, 0x4914020080040080, 0x400010400081002, 0x9100010025C982,
    0x5709604005800081, 0x410002000400048, 0x200080801000, 0x2200801000800802,
    0x1001005000800, 0x44008004800200, 0x1840512804004210, 0x4C0220449200010C,
    0x1000824015608000, 0x500804001130020, 0x20080010004040, 0x224100009010020,
    0x82000804220011, 0x406000804010100, 0x2200018802040030, 0x80C100008861000A,
    0x1008040220200, 0x1008040220200, 0x8040200010008080, 0x4000800800100080,
    0xA000080080040080, 0x80040002008080, 0xC1080110020400, 0x200010844028600,
    0x281002080004019, 0x100104004248101, 0x500204200081082, 0x802080520100101,
    0x104300440A980011, 0x84B000400080201, 0x7000C88102A0904, 0x800004408802102,
];
