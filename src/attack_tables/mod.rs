//! Precomputed attack tables: leaper pieces (king, knight, pawn) by direct
//! lookup, sliders (bishop, rook, queen) by magic bitboard, plus the
//! `between`/`beyond` ray tables pin detection and castling-through-check
//! checks need.

mod magic;

use std::sync::LazyLock;

use crate::types::{Bitboard, Color, Square};

fn knight_attacks_from(sq: Square) -> Bitboard {
    const DELTAS: [(i32, i32); 8] =
        [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];
    leaper(sq, &DELTAS)
}

fn king_attacks_from(sq: Square) -> Bitboard {
    const DELTAS: [(i32, i32); 8] =
        [(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)];
    leaper(sq, &DELTAS)
}

fn pawn_attacks_from(sq: Square, white: bool) -> Bitboard {
    let deltas: [(i32, i32); 2] = if white { [(1, -1), (1, 1)] } else { [(-1, -1), (-1, 1)] };
    leaper(sq, &deltas)
}

fn leaper(sq: Square, deltas: &[(i32, i32)]) -> Bitboard {
    let mut bb = Bitboard::default();
    let (rank, file) = (sq.rank() as i32, sq.file() as i32);
    for &(dr, df) in deltas {
        let (r, f) = (rank + dr, file + df);
        if (0..8).contains(&r) && (0..8).contains(&f) {
            bb.set(Square::new(r as u8, f as u8));
        }
    }
    bb
}

static KNIGHT_ATTACKS: LazyLock<[Bitboard; 64]> =
    LazyLock::new(|| std::array::from_fn(|i| knight_attacks_from(Square::from_index(i as u8))));

static KING_ATTACKS: LazyLock<[Bitboard; 64]> =
    LazyLock::new(|| std::array::from_fn(|i| king_attacks_from(Square::from_index(i as u8))));

/// `PAWN_ATTACKS[color.index()][square]`
static PAWN_ATTACKS: LazyLock<[[Bitboard; 64]; 2]> = LazyLock::new(|| {
    [
        std::array::from_fn(|i| pawn_attacks_from(Square::from_index(i as u8), true)),
        std::array::from_fn(|i| pawn_attacks_from(Square::from_index(i as u8), false)),
    ]
});

/// `BETWEEN[a][b]`: squares strictly between `a` and `b` if they share a
/// rank, file or diagonal, empty otherwise. Used to find the blocking
/// squares between a king and a would-be pinning/checking slider.
static BETWEEN: LazyLock<Vec<Vec<Bitboard>>> = LazyLock::new(|| {
    let mut table = vec![vec![Bitboard::default(); 64]; 64];
    for a in 0..64u8 {
        for b in 0..64u8 {
            table[a as usize][b as usize] = compute_between(Square::from_index(a), Square::from_index(b));
        }
    }
    table
});

/// `BEYOND[a][b]`: the ray extending from `a` through `b` and off the far
/// edge of the board, exclusive of `a` and `b`. Used to find where a slider
/// would need to stand to pin a piece at `b` against a king at `a`.
static BEYOND: LazyLock<Vec<Vec<Bitboard>>> = LazyLock::new(|| {
    let mut table = vec![vec![Bitboard::default(); 64]; 64];
    for a in 0..64u8 {
        for b in 0..64u8 {
            table[a as usize][b as usize] = compute_beyond(Square::from_index(a), Square::from_index(b));
        }
    }
    table
});

fn direction(a: Square, b: Square) -> Option<(i32, i32)> {
    let (dr, df) = (b.rank() as i32 - a.rank() as i32, b.file() as i32 - a.file() as i32);
    if dr == 0 && df == 0 {
        return None;
    }
    if dr == 0 || df == 0 || dr.abs() == df.abs() {
        Some((dr.signum(), df.signum()))
    } else {
        None
    }
}

fn compute_between(a: Square, b: Square) -> Bitboard {
    let mut bb = Bitboard::default();
    let Some((dr, df)) = direction(a, b) else { return bb };
    let (mut r, mut f) = (a.rank() as i32 + dr, a.file() as i32 + df);
    while (r, f) != (b.rank() as i32, b.file() as i32) {
        bb.set(Square::new(r as u8, f as u8));
        r += dr;
        f += df;
    }
    bb
}

fn compute_beyond(a: Square, b: Square) -> Bitboard {
    let mut bb = Bitboard::default();
    let Some((dr, df)) = direction(a, b) else { return bb };
    let (mut r, mut f) = (b.rank() as i32 + dr, b.file() as i32 + df);
    while (0..8).contains(&r) && (0..8).contains(&f) {
        bb.set(Square::new(r as u8, f as u8));
        r += dr;
        f += df;
    }
    bb
}

#[inline]
#[must_use]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.as_index()]
}

#[inline]
#[must_use]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.as_index()]
}

#[inline]
#[must_use]
pub fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.as_index()]
}

#[inline]
#[must_use]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    magic::BISHOP_TABLE.attacks(sq, occupied)
}

#[inline]
#[must_use]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    magic::ROOK_TABLE.attacks(sq, occupied)
}

#[inline]
#[must_use]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

/// Squares strictly between `a` and `b` on a shared rank/file/diagonal.
/// Empty if they don't share one.
#[inline]
#[must_use]
pub fn between(a: Square, b: Square) -> Bitboard {
    BETWEEN[a.as_index()][b.as_index()]
}

/// The ray from `a` through `b` continuing to the board edge, exclusive of
/// both endpoints. Empty if `a` and `b` don't share a rank/file/diagonal.
#[inline]
#[must_use]
pub fn beyond(a: Square, b: Square) -> Bitboard {
    BEYOND[a.as_index()][b.as_index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knight_in_corner_has_two_targets() {
        assert_eq!(knight_attacks(Square::new(0, 0)).popcount(), 2);
    }

    #[test]
    fn king_in_center_has_eight_targets() {
        assert_eq!(king_attacks(Square::new(3, 3)).popcount(), 8);
    }

    #[test]
    fn white_pawn_attacks_diagonally_forward() {
        let attacks = pawn_attacks(Color::White, Square::new(3, 3));
        assert!(attacks.contains(Square::new(4, 2)));
        assert!(attacks.contains(Square::new(4, 4)));
        assert_eq!(attacks.popcount(), 2);
    }

    #[test]
    fn between_is_empty_for_unaligned_squares() {
        assert_eq!(between(Square::new(0, 0), Square::new(3, 5)), Bitboard::default());
    }

    #[test]
    fn between_matches_expected_rank_gap() {
        let bb = between(Square::new(0, 0), Square::new(0, 4));
        assert_eq!(bb.popcount(), 3);
        assert!(bb.contains(Square::new(0, 2)));
    }

    #[test]
    fn beyond_continues_past_the_far_square_to_the_edge() {
        let bb = beyond(Square::new(0, 0), Square::new(0, 3));
        assert!(bb.contains(Square::new(0, 4)));
        assert!(bb.contains(Square::new(0, 7)));
        assert!(!bb.contains(Square::new(0, 3)));
    }

    #[test]
    fn rook_attacks_blocked_by_occupancy() {
        let mut occ = Bitboard::default();
        occ.set(Square::new(0, 3));
        let attacks = rook_attacks(Square::new(0, 0), occ);
        assert!(attacks.contains(Square::new(0, 3)));
        assert!(!attacks.contains(Square::new(0, 4)));
    }
}
