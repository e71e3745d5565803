//! Zobrist hashing for chess positions.
//!
//! Provides incrementally-updatable 64-bit position hashes for transposition
//! tables and the repetition tracker. All keys come from one fixed seed so
//! the hash is stable across processes and test runs.

use rand::prelude::*;
use std::sync::LazyLock;

use crate::types::{CastlingRights, Color, Piece, Side, Square};

pub struct ZobristKeys {
    /// `piece_keys[piece.index()][color.index()][square.index()]`
    piece_keys: [[[u64; 64]; 2]; 6],
    black_to_move_key: u64,
    /// One independent key per castling right (White/Black x King/Queen side).
    castling_keys: [u64; 4],
    /// Indexed by file; only the file of an en-passant target square matters.
    en_passant_keys: [u64; 8],
}

impl ZobristKeys {
    fn new() -> Self {
        // Fixed seed: the hash must be stable across processes and test runs.
        let mut rng = StdRng::seed_from_u64(1_234_567_890_u64);
        let mut piece_keys = [[[0u64; 64]; 2]; 6];
        for piece in &mut piece_keys {
            for color in piece.iter_mut() {
                for key in color.iter_mut() {
                    *key = rng.gen();
                }
            }
        }
        let black_to_move_key = rng.gen();
        let mut castling_keys = [0u64; 4];
        for key in &mut castling_keys {
            *key = rng.gen();
        }
        let mut en_passant_keys = [0u64; 8];
        for key in &mut en_passant_keys {
            *key = rng.gen();
        }

        ZobristKeys { piece_keys, black_to_move_key, castling_keys, en_passant_keys }
    }

    #[inline]
    #[must_use]
    pub fn piece_key(&self, piece: Piece, color: Color, square: Square) -> u64 {
        self.piece_keys[piece.index()][color.index()][square.as_index()]
    }

    #[inline]
    #[must_use]
    pub fn black_to_move_key(&self) -> u64 {
        self.black_to_move_key
    }

    #[inline]
    #[must_use]
    pub fn castling_key(&self, color: Color, side: Side) -> u64 {
        let bit = CastlingRights::bit_for(color, side);
        self.castling_keys[bit.trailing_zeros() as usize]
    }

    #[inline]
    #[must_use]
    pub fn en_passant_key(&self, file: u8) -> u64 {
        self.en_passant_keys[file as usize]
    }
}

pub static ZOBRIST: LazyLock<ZobristKeys> = LazyLock::new(ZobristKeys::new);

/// Computes a position's hash from scratch. Used by FEN parsing; everywhere
/// else the hash is updated incrementally inside `Position::apply_move`.
#[must_use]
pub fn compute_hash(
    piece_at: impl Fn(Square) -> Option<(Color, Piece)>,
    white_to_move: bool,
    castling_rights: CastlingRights,
    en_passant_pawn: Option<Square>,
) -> u64 {
    let mut hash = 0u64;
    for i in 0..64u8 {
        let sq = Square::from_index(i);
        if let Some((color, piece)) = piece_at(sq) {
            hash ^= ZOBRIST.piece_key(piece, color, sq);
        }
    }
    if !white_to_move {
        hash ^= ZOBRIST.black_to_move_key();
    }
    for (color, side) in castling_rights.iter_granted() {
        hash ^= ZOBRIST.castling_key(color, side);
    }
    if let Some(ep) = en_passant_pawn {
        hash ^= ZOBRIST.en_passant_key(ep.file());
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_deterministic_across_lookups() {
        let a = ZOBRIST.piece_key(Piece::Queen, Color::White, Square::new(3, 3));
        let b = ZOBRIST.piece_key(Piece::Queen, Color::White, Square::new(3, 3));
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_features_get_distinct_keys() {
        let white_queen_e4 = ZOBRIST.piece_key(Piece::Queen, Color::White, Square::new(3, 4));
        let black_queen_e4 = ZOBRIST.piece_key(Piece::Queen, Color::Black, Square::new(3, 4));
        let white_rook_e4 = ZOBRIST.piece_key(Piece::Rook, Color::White, Square::new(3, 4));
        assert_ne!(white_queen_e4, black_queen_e4);
        assert_ne!(white_queen_e4, white_rook_e4);
    }

    #[test]
    fn empty_board_hash_flips_with_side_to_move() {
        let white = compute_hash(|_| None, true, CastlingRights::none(), None);
        let black = compute_hash(|_| None, false, CastlingRights::none(), None);
        assert_ne!(white, black);
    }
}
