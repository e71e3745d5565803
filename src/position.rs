//! Immutable chess positions: one side's piece bitboards plus the shared
//! side-to-move/en-passant/half-move-clock state that lives on top of them.

use crate::attack_tables;
use crate::types::{Bitboard, CastlingRights, Color, Move, Piece, Side, Square, ALL_PIECES};
use crate::zobrist::ZOBRIST;

/// One side's pieces. Invariants (maintained by construction and by
/// `Position::apply_move`, not re-checked on every access): the six
/// bitboards are pairwise disjoint, and `king` has exactly one bit set.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Player {
    pub pawns: Bitboard,
    pub knights: Bitboard,
    pub bishops: Bitboard,
    pub rooks: Bitboard,
    pub queens: Bitboard,
    pub king: Bitboard,
    pub castling: CastlingRights,
}

impl Player {
    #[must_use]
    pub fn empty() -> Self {
        Player {
            pawns: Bitboard::default(),
            knights: Bitboard::default(),
            bishops: Bitboard::default(),
            rooks: Bitboard::default(),
            queens: Bitboard::default(),
            king: Bitboard::default(),
            castling: CastlingRights::none(),
        }
    }

    #[inline]
    #[must_use]
    pub fn occupied(&self) -> Bitboard {
        self.pawns | self.knights | self.bishops | self.rooks | self.queens | self.king
    }

    #[inline]
    #[must_use]
    pub fn bitboard_of(&self, piece: Piece) -> Bitboard {
        match piece {
            Piece::Pawn => self.pawns,
            Piece::Knight => self.knights,
            Piece::Bishop => self.bishops,
            Piece::Rook => self.rooks,
            Piece::Queen => self.queens,
            Piece::King => self.king,
        }
    }

    #[inline]
    fn bitboard_of_mut(&mut self, piece: Piece) -> &mut Bitboard {
        match piece {
            Piece::Pawn => &mut self.pawns,
            Piece::Knight => &mut self.knights,
            Piece::Bishop => &mut self.bishops,
            Piece::Rook => &mut self.rooks,
            Piece::Queen => &mut self.queens,
            Piece::King => &mut self.king,
        }
    }

    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        ALL_PIECES.into_iter().find(|&p| self.bitboard_of(p).contains(sq))
    }

    #[must_use]
    pub fn king_square(&self) -> Square {
        debug_assert!(self.king.is_single(), "a player always has exactly one king");
        Square::from_index(self.king.0.trailing_zeros() as u8)
    }
}

/// A complete board state. Immutable: `apply_move`/`skip_turn` consume `&self`
/// and produce a new `Position`, never mutating in place. Cheap because the
/// whole struct is a handful of `u64`s plus a few scalars.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    pub white: Player,
    pub black: Player,
    pub side_to_move: Color,
    /// The square of the pawn that just double-pushed, if any (not the
    /// passed-over target square — see `Move` en-passant handling).
    pub en_passant_pawn: Option<Square>,
    pub halfmove_clock: u16,
    pub hash: u64,
}

impl Position {
    #[must_use]
    pub fn player(&self, color: Color) -> &Player {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    fn player_mut(&mut self, color: Color) -> &mut Player {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    #[must_use]
    pub fn occupied(&self) -> Bitboard {
        self.white.occupied() | self.black.occupied()
    }

    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        if let Some(p) = self.white.piece_at(sq) {
            Some((Color::White, p))
        } else {
            self.black.piece_at(sq).map(|p| (Color::Black, p))
        }
    }

    /// Whether `side`'s king is attacked by the opposing side.
    #[must_use]
    pub fn is_in_check(&self, side: Color) -> bool {
        let king_sq = self.player(side).king_square();
        self.is_attacked(king_sq, side.opponent(), self.occupied())
    }

    /// Whether `sq` is attacked by `attacker`'s pieces, given occupancy `occ`
    /// (passed explicitly so callers can probe with the king removed).
    #[must_use]
    pub fn is_attacked(&self, sq: Square, attacker: Color, occ: Bitboard) -> bool {
        let p = self.player(attacker);
        if attack_tables::pawn_attacks(attacker.opponent(), sq).intersects(p.pawns) {
            return true;
        }
        if attack_tables::knight_attacks(sq).intersects(p.knights) {
            return true;
        }
        if attack_tables::king_attacks(sq).intersects(p.king) {
            return true;
        }
        let diag_attackers = p.bishops | p.queens;
        if attack_tables::bishop_attacks(sq, occ).intersects(diag_attackers) {
            return true;
        }
        let line_attackers = p.rooks | p.queens;
        if attack_tables::rook_attacks(sq, occ).intersects(line_attackers) {
            return true;
        }
        false
    }

    /// The set of `attacker`'s pieces currently attacking `sq`.
    #[must_use]
    pub fn attackers_to(&self, sq: Square, attacker: Color, occ: Bitboard) -> Bitboard {
        let p = self.player(attacker);
        let mut attackers = Bitboard::default();
        attackers |= attack_tables::pawn_attacks(attacker.opponent(), sq) & p.pawns;
        attackers |= attack_tables::knight_attacks(sq) & p.knights;
        attackers |= attack_tables::king_attacks(sq) & p.king;
        attackers |= attack_tables::bishop_attacks(sq, occ) & (p.bishops | p.queens);
        attackers |= attack_tables::rook_attacks(sq, occ) & (p.rooks | p.queens);
        attackers
    }

    #[must_use]
    pub fn starting_position() -> Self {
        crate::fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .expect("starting FEN is well-formed")
    }

    /// Produces the position after flipping side to move with no piece
    /// movement — used only by null-move pruning, and only when not in check.
    #[must_use]
    pub fn skip_turn(&self) -> Position {
        let mut next = *self;
        next.side_to_move = self.side_to_move.opponent();
        next.hash ^= ZOBRIST.black_to_move_key();
        if let Some(ep) = self.en_passant_pawn {
            next.hash ^= ZOBRIST.en_passant_key(ep.file());
        }
        next.en_passant_pawn = None;
        next.halfmove_clock += 1;
        next
    }

    /// Applies a legal move, returning the resulting position. The move is
    /// assumed legal; this never re-validates legality.
    #[must_use]
    pub fn apply_move(&self, mv: Move) -> Position {
        let mut next = *self;
        let us = self.side_to_move;
        let them = us.opponent();

        let mover = next.player_mut(us);
        *mover.bitboard_of_mut(mv.piece) ^= Bitboard::from_square(mv.from);
        next.hash ^= ZOBRIST.piece_key(mv.piece, us, mv.from);

        if let Some(promoted) = mv.promotion {
            *next.player_mut(us).bitboard_of_mut(promoted) |= Bitboard::from_square(mv.to);
            next.hash ^= ZOBRIST.piece_key(promoted, us, mv.to);
        } else {
            *next.player_mut(us).bitboard_of_mut(mv.piece) |= Bitboard::from_square(mv.to);
            next.hash ^= ZOBRIST.piece_key(mv.piece, us, mv.to);
        }

        if let Some(captured) = mv.captured {
            let capture_sq = if mv.is_en_passant {
                Square::new(mv.from.rank(), mv.to.file())
            } else {
                mv.to
            };
            *next.player_mut(them).bitboard_of_mut(captured) ^= Bitboard::from_square(capture_sq);
            next.hash ^= ZOBRIST.piece_key(captured, them, capture_sq);
        }

        if mv.is_castle {
            let rank = mv.from.rank();
            let (rook_from, rook_to) = if mv.to.file() > mv.from.file() {
                (Square::new(rank, 7), Square::new(rank, 5))
            } else {
                (Square::new(rank, 0), Square::new(rank, 3))
            };
            let mover = next.player_mut(us);
            mover.rooks ^= Bitboard::from_square(rook_from) | Bitboard::from_square(rook_to);
            next.hash ^= ZOBRIST.piece_key(Piece::Rook, us, rook_from);
            next.hash ^= ZOBRIST.piece_key(Piece::Rook, us, rook_to);
        }

        next.update_castling_rights(us, them, mv);

        if let Some(old_ep) = self.en_passant_pawn {
            next.hash ^= ZOBRIST.en_passant_key(old_ep.file());
        }
        next.en_passant_pawn = if mv.is_double_push { Some(mv.to) } else { None };
        if let Some(new_ep) = next.en_passant_pawn {
            next.hash ^= ZOBRIST.en_passant_key(new_ep.file());
        }

        next.halfmove_clock =
            if mv.is_capture() || mv.piece == Piece::Pawn { 0 } else { self.halfmove_clock + 1 };

        next.side_to_move = them;
        next.hash ^= ZOBRIST.black_to_move_key();

        next
    }

    fn update_castling_rights(&mut self, us: Color, them: Color, mv: Move) {
        let home_rank = if us == Color::White { 0 } else { 7 };
        if mv.piece == Piece::King {
            self.clear_castling(us, Side::Kingside);
            self.clear_castling(us, Side::Queenside);
        }
        if mv.from == Square::new(home_rank, 0) || mv.to == Square::new(home_rank, 0) {
            self.clear_castling(us, Side::Queenside);
        }
        if mv.from == Square::new(home_rank, 7) || mv.to == Square::new(home_rank, 7) {
            self.clear_castling(us, Side::Kingside);
        }
        let their_home_rank = if them == Color::White { 0 } else { 7 };
        if mv.to == Square::new(their_home_rank, 0) {
            self.clear_castling(them, Side::Queenside);
        }
        if mv.to == Square::new(their_home_rank, 7) {
            self.clear_castling(them, Side::Kingside);
        }
    }

    fn clear_castling(&mut self, color: Color, side: Side) {
        let player = self.player_mut(color);
        if player.castling.has(color, side) {
            player.castling.clear(color, side);
            self.hash ^= ZOBRIST.castling_key(color, side);
        }
    }
}
