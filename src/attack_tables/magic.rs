//! Magic numbers and the flattened sliding-attack tables they index.
//!
//! For each square we precompute the "relevant occupancy" mask (every square
//! a rook/bishop could possibly need to see past, excluding board edges since
//! a piece sitting on the edge doesn't change whether the ray is blocked) and
//! then search for a 64-bit magic constant such that
//! `(occupancy_subset * magic) >> (64 - bits)` is injective over the subsets
//! of that mask. Once such a magic exists, every occupancy maps to a unique
//! table slot in O(1) with no branching.

use std::sync::LazyLock;

use rand::prelude::*;

use crate::types::{Bitboard, Square};

const ROOK_DELTAS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DELTAS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Per-square parameters for one magic-indexed table.
#[derive(Clone, Copy)]
pub struct Magic {
    pub mask: Bitboard,
    pub magic: u64,
    pub shift: u32,
}

impl Magic {
    #[inline]
    #[must_use]
    pub fn index(&self, occupied: Bitboard) -> usize {
        let blockers = (occupied & self.mask).0;
        ((blockers.wrapping_mul(self.magic)) >> self.shift) as usize
    }
}

/// A full sliding-piece attack set: one `Magic` and one flattened attack
/// table per square, all squares' tables concatenated with per-square
/// offsets so there is a single allocation backing the whole piece type.
pub struct SlidingTable {
    pub magics: [Magic; 64],
    offsets: [usize; 64],
    attacks: Vec<Bitboard>,
}

impl SlidingTable {
    #[inline]
    #[must_use]
    pub fn attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let m = &self.magics[sq.as_index()];
        self.attacks[self.offsets[sq.as_index()] + m.index(occupied)]
    }
}

/// Ray-traces sliding attacks by walking each direction until it runs off
/// the board or hits an occupied square (the occupied square itself is
/// included, since it's either a capture or the blocker that stops the ray).
fn ray_attacks(sq: Square, occupied: Bitboard, deltas: &[(i32, i32); 4]) -> Bitboard {
    let mut attacks = Bitboard::default();
    let (rank, file) = (sq.rank() as i32, sq.file() as i32);
    for &(dr, df) in deltas {
        let (mut r, mut f) = (rank + dr, file + df);
        while (0..8).contains(&r) && (0..8).contains(&f) {
            let to = Square::new(r as u8, f as u8);
            attacks.set(to);
            if occupied.contains(to) {
                break;
            }
            r += dr;
            f += df;
        }
    }
    attacks
}

/// The relevant-occupancy mask: every square a ray could be blocked at,
/// excluding the board edge in that direction (a blocker on the edge square
/// itself never changes reachability, since the ray would stop there anyway).
fn relevance_mask(sq: Square, deltas: &[(i32, i32); 4]) -> Bitboard {
    let mut mask = Bitboard::default();
    let (rank, file) = (sq.rank() as i32, sq.file() as i32);
    for &(dr, df) in deltas {
        let (mut r, mut f) = (rank + dr, file + df);
        while (0..8).contains(&r) && (0..8).contains(&f) {
            let (next_r, next_f) = (r + dr, f + df);
            if !(0..8).contains(&next_r) || !(0..8).contains(&next_f) {
                break;
            }
            mask.set(Square::new(r as u8, f as u8));
            r = next_r;
            f = next_f;
        }
    }
    mask
}

/// Deterministic seeded search for a magic number that makes `index()`
/// injective over every subset of `mask`. The fixed seed means the table is
/// reproducible across runs; in practice a handful of candidates suffice.
fn find_magic(sq: Square, mask: Bitboard, deltas: &[(i32, i32); 4], rng: &mut StdRng) -> (u64, u32) {
    let bits = mask.popcount();
    let shift = 64 - bits;
    let occupied_attacks: Vec<(Bitboard, Bitboard)> = mask
        .subsets()
        .map(|occ| (occ, ray_attacks(sq, occ, deltas)))
        .collect();
    let table_size = 1usize << bits;

    loop {
        // Sparse 64-bit candidates (ANDing a few random draws) tend to index
        // well; this is the standard trick for finding magics quickly.
        let candidate: u64 = rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>();
        if (candidate.wrapping_mul(mask.0)) >> 56 < 6 {
            continue;
        }
        let mut table = vec![None; table_size];
        let mut ok = true;
        for &(occ, attacks) in &occupied_attacks {
            let idx = ((occ.0.wrapping_mul(candidate)) >> shift) as usize;
            match table[idx] {
                None => table[idx] = Some(attacks),
                Some(existing) if existing == attacks => {}
                Some(_) => {
                    ok = false;
                    break;
                }
            }
        }
        if ok {
            return (candidate, shift);
        }
    }
}

fn build_table(deltas: &[(i32, i32); 4], seed: u64) -> SlidingTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut magics = [Magic { mask: Bitboard::default(), magic: 0, shift: 0 }; 64];
    let mut offsets = [0usize; 64];
    let mut attacks = Vec::new();

    for i in 0..64u8 {
        let sq = Square::from_index(i);
        let mask = relevance_mask(sq, deltas);
        let (magic, shift) = find_magic(sq, mask, deltas, &mut rng);
        let table_size = 1usize << mask.popcount();
        offsets[sq.as_index()] = attacks.len();
        let mut slot = vec![Bitboard::default(); table_size];
        for occ in mask.subsets() {
            let idx = ((occ.0.wrapping_mul(magic)) >> shift) as usize;
            slot[idx] = ray_attacks(sq, occ, deltas);
        }
        attacks.extend_from_slice(&slot);
        magics[sq.as_index()] = Magic { mask, magic, shift };
    }

    SlidingTable { magics, offsets, attacks }
}

/// Fixed seeds distinct from the Zobrist seed so the two searches never
/// correlate; the exact values carry no meaning beyond determinism.
pub static ROOK_TABLE: LazyLock<SlidingTable> = LazyLock::new(|| build_table(&ROOK_DELTAS, 0xA00C_u64));
pub static BISHOP_TABLE: LazyLock<SlidingTable> =
    LazyLock::new(|| build_table(&BISHOP_DELTAS, 0xB015_u64));
