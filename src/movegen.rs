//! Legal move generation: king-attacker detection, pin rays, and per-piece
//! move emission, all pin-and-check aware so every move produced is legal
//! without a later "apply then see if still in check" pass.

use crate::attack_tables;
use crate::position::Position;
use crate::types::{Bitboard, Color, Move, MoveList, Piece, Side, Square, ALL, EMPTY, PROMOTION_PIECES};

/// Which subset of legal moves to produce. All three variants share the
/// same pin/check machinery and differ only in a target-square filter.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Variant {
    All,
    CapturesAndPromotions,
    CapturesPromotionsAndChecks,
}

struct GenCtx {
    us: Color,
    them: Color,
    occ: Bitboard,
    own_occ: Bitboard,
    their_occ: Bitboard,
    king_sq: Square,
    check_mask: Bitboard,
    num_checkers: u32,
    pinned: Bitboard,
    /// Valid indices are exactly the squares in `pinned`.
    pin_ray: [Bitboard; 64],
    enemy_king_sq: Square,
}

#[must_use]
pub fn generate_moves(pos: &Position, variant: Variant) -> MoveList {
    let mut list = MoveList::new();
    let ctx = build_ctx(pos);

    if ctx.num_checkers >= 2 {
        generate_king_moves(pos, &ctx, variant, &mut list);
        return list;
    }

    generate_pawn_moves(pos, &ctx, variant, &mut list);
    generate_piece_moves(pos, &ctx, Piece::Knight, variant, &mut list);
    generate_piece_moves(pos, &ctx, Piece::Bishop, variant, &mut list);
    generate_piece_moves(pos, &ctx, Piece::Rook, variant, &mut list);
    generate_piece_moves(pos, &ctx, Piece::Queen, variant, &mut list);
    generate_king_moves(pos, &ctx, variant, &mut list);
    if ctx.num_checkers == 0 {
        generate_castling(pos, &ctx, variant, &mut list);
    }

    list
}

/// Mirrors `generate_moves` but returns as soon as one legal move is found.
#[must_use]
pub fn has_any_legal_move(pos: &Position) -> bool {
    !generate_moves(pos, Variant::All).is_empty()
}

#[must_use]
pub fn perft(pos: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = generate_moves(pos, Variant::All);
    if depth == 1 {
        return moves.len() as u64;
    }
    moves.iter().map(|&mv| perft(&pos.apply_move(mv), depth - 1)).sum()
}

fn build_ctx(pos: &Position) -> GenCtx {
    let us = pos.side_to_move;
    let them = us.opponent();
    let occ = pos.occupied();
    let own_occ = pos.player(us).occupied();
    let their_occ = pos.player(them).occupied();
    let king_sq = pos.player(us).king_square();
    let enemy_king_sq = pos.player(them).king_square();

    let checkers = pos.attackers_to(king_sq, them, occ);
    let num_checkers = checkers.popcount();

    let check_mask = match num_checkers {
        0 => ALL,
        1 => {
            let checker_sq = Square::from_index(checkers.0.trailing_zeros() as u8);
            let checker_piece = pos.player(them).piece_at(checker_sq).expect("checker occupies a piece");
            if checker_piece.is_slider() {
                attack_tables::between(king_sq, checker_sq) | checkers
            } else {
                checkers
            }
        }
        _ => EMPTY,
    };

    let (pinned, pin_ray) = compute_pins(pos, us, them, king_sq, occ);

    GenCtx { us, them, occ, own_occ, their_occ, king_sq, check_mask, num_checkers, pinned, pin_ray, enemy_king_sq }
}

fn compute_pins(pos: &Position, us: Color, them: Color, king_sq: Square, occ: Bitboard) -> (Bitboard, [Bitboard; 64]) {
    let mut pinned = EMPTY;
    let mut pin_ray = [EMPTY; 64];
    let their = pos.player(them);
    let own_occ = pos.player(us).occupied();

    let mut consider = |slider_sq: Square| {
        let between = attack_tables::between(king_sq, slider_sq);
        let blockers = between & occ;
        if blockers.popcount() == 1 && (blockers & own_occ) == blockers {
            let pinned_sq = Square::from_index(blockers.0.trailing_zeros() as u8);
            pinned.set(pinned_sq);
            pin_ray[pinned_sq.as_index()] = between | Bitboard::from_square(slider_sq);
        }
    };

    for sq in (their.bishops | their.queens).iter() {
        if is_diagonal(king_sq, sq) {
            consider(sq);
        }
    }
    for sq in (their.rooks | their.queens).iter() {
        if is_orthogonal(king_sq, sq) {
            consider(sq);
        }
    }

    (pinned, pin_ray)
}

fn is_diagonal(a: Square, b: Square) -> bool {
    (a.rank() as i32 - b.rank() as i32).abs() == (a.file() as i32 - b.file() as i32).abs()
}

fn is_orthogonal(a: Square, b: Square) -> bool {
    a.rank() == b.rank() || a.file() == b.file()
}

/// Non-capture, non-promotion destinations count as "checks" in the third
/// variant only if they attack the enemy king.
fn quiet_gives_check(ctx: &GenCtx, piece: Piece, to: Square, occ_after: Bitboard) -> bool {
    match piece {
        Piece::Knight => attack_tables::knight_attacks(to).contains(ctx.enemy_king_sq),
        Piece::Bishop => attack_tables::bishop_attacks(to, occ_after).contains(ctx.enemy_king_sq),
        Piece::Rook => attack_tables::rook_attacks(to, occ_after).contains(ctx.enemy_king_sq),
        Piece::Queen => attack_tables::queen_attacks(to, occ_after).contains(ctx.enemy_king_sq),
        Piece::Pawn => attack_tables::pawn_attacks(ctx.us, to).contains(ctx.enemy_king_sq),
        Piece::King => false,
    }
}

fn generate_piece_moves(pos: &Position, ctx: &GenCtx, piece: Piece, variant: Variant, list: &mut MoveList) {
    let own = pos.player(ctx.us);

    for from in own.bitboard_of(piece).iter() {
        let mut attacks = match piece {
            Piece::Knight => attack_tables::knight_attacks(from),
            Piece::Bishop => attack_tables::bishop_attacks(from, ctx.occ),
            Piece::Rook => attack_tables::rook_attacks(from, ctx.occ),
            Piece::Queen => attack_tables::queen_attacks(from, ctx.occ),
            Piece::Pawn | Piece::King => unreachable!("handled by dedicated generators"),
        };
        attacks &= !ctx.own_occ;
        attacks &= ctx.check_mask;
        if ctx.pinned.contains(from) {
            attacks &= ctx.pin_ray[from.as_index()];
        }

        for to in attacks.iter() {
            let is_capture = ctx.their_occ.contains(to);
            if variant == Variant::CapturesPromotionsAndChecks && !is_capture {
                let occ_after = (ctx.occ ^ Bitboard::from_square(from)) | Bitboard::from_square(to);
                if !quiet_gives_check(ctx, piece, to, occ_after) {
                    continue;
                }
            } else if variant == Variant::CapturesAndPromotions && !is_capture {
                continue;
            }
            let captured = if is_capture { pos.player(ctx.them).piece_at(to) } else { None };
            list.push(Move {
                from,
                to,
                piece,
                captured,
                promotion: None,
                is_en_passant: false,
                is_castle: false,
                is_double_push: false,
            });
        }
    }
}

fn generate_king_moves(pos: &Position, ctx: &GenCtx, variant: Variant, list: &mut MoveList) {
    let from = ctx.king_sq;
    let occ_without_king = ctx.occ ^ Bitboard::from_square(from);
    let attacks = attack_tables::king_attacks(from) & !ctx.own_occ;

    for to in attacks.iter() {
        let is_capture = ctx.their_occ.contains(to);
        if variant != Variant::All && !is_capture {
            continue;
        }
        if pos.is_attacked(to, ctx.them, occ_without_king) {
            continue;
        }
        let captured = if is_capture { pos.player(ctx.them).piece_at(to) } else { None };
        list.push(Move {
            from,
            to,
            piece: Piece::King,
            captured,
            promotion: None,
            is_en_passant: false,
            is_castle: false,
            is_double_push: false,
        });
    }
}

fn generate_castling(pos: &Position, ctx: &GenCtx, variant: Variant, list: &mut MoveList) {
    if variant != Variant::All {
        return;
    }
    let us = ctx.us;
    let rank = if us == Color::White { 0 } else { 7 };
    let king_from = Square::new(rank, 4);
    if ctx.king_sq != king_from {
        return;
    }
    let player = pos.player(us);

    if player.castling.has(us, Side::Kingside) {
        let transit = [Square::new(rank, 5), Square::new(rank, 6)];
        if transit.iter().all(|&sq| !ctx.occ.contains(sq))
            && transit.iter().all(|&sq| !pos.is_attacked(sq, ctx.them, ctx.occ))
        {
            list.push(Move {
                from: king_from,
                to: Square::new(rank, 6),
                piece: Piece::King,
                captured: None,
                promotion: None,
                is_en_passant: false,
                is_castle: true,
                is_double_push: false,
            });
        }
    }
    if player.castling.has(us, Side::Queenside) {
        let empty = [Square::new(rank, 1), Square::new(rank, 2), Square::new(rank, 3)];
        let transit = [Square::new(rank, 2), Square::new(rank, 3)];
        if empty.iter().all(|&sq| !ctx.occ.contains(sq))
            && transit.iter().all(|&sq| !pos.is_attacked(sq, ctx.them, ctx.occ))
        {
            list.push(Move {
                from: king_from,
                to: Square::new(rank, 2),
                piece: Piece::King,
                captured: None,
                promotion: None,
                is_en_passant: false,
                is_castle: true,
                is_double_push: false,
            });
        }
    }
}

fn generate_pawn_moves(pos: &Position, ctx: &GenCtx, variant: Variant, list: &mut MoveList) {
    let us = ctx.us;
    let white = us == Color::White;
    let own = pos.player(us);
    let start_rank = if white { 1 } else { 6 };
    let promo_rank = if white { 7 } else { 0 };
    let ep_target = pos.en_passant_pawn.and_then(|p| p.forward(white));

    for from in own.pawns.iter() {
        let pin_restriction = if ctx.pinned.contains(from) { ctx.pin_ray[from.as_index()] } else { ALL };

        if variant == Variant::All {
            if let Some(one) = from.forward(white) {
                if !ctx.occ.contains(one) {
                    emit_pawn_quiet_or_promo(ctx, variant, one, promo_rank, from, pin_restriction, list);

                    if from.rank() == start_rank {
                        if let Some(two) = one.forward(white) {
                            if !ctx.occ.contains(two)
                                && ctx.check_mask.contains(two)
                                && pin_restriction.contains(two)
                            {
                                list.push(Move {
                                    from,
                                    to: two,
                                    piece: Piece::Pawn,
                                    captured: None,
                                    promotion: None,
                                    is_en_passant: false,
                                    is_castle: false,
                                    is_double_push: true,
                                });
                            }
                        }
                    }
                }
            }
        } else if let Some(one) = from.forward(white) {
            if !ctx.occ.contains(one) {
                emit_pawn_quiet_or_promo(ctx, variant, one, promo_rank, from, pin_restriction, list);
            }
        }

        // Diagonal captures, including en passant.
        for to in attack_tables::pawn_attacks(us, from).iter() {
            if ctx.their_occ.contains(to) {
                if !ctx.check_mask.contains(to) || !pin_restriction.contains(to) {
                    continue;
                }
                let captured = pos.player(ctx.them).piece_at(to);
                emit_pawn_capture_or_promo(from, to, promo_rank, captured, false, list);
            } else if Some(to) == ep_target {
                let ep_pawn_sq = pos.en_passant_pawn.expect("ep_target derived from en_passant_pawn");
                let resolves_check = ctx.check_mask.contains(to) || ctx.check_mask.contains(ep_pawn_sq);
                if !resolves_check || !pin_restriction.contains(to) {
                    continue;
                }
                if en_passant_exposes_king(pos, ctx, from, ep_pawn_sq) {
                    continue;
                }
                list.push(Move {
                    from,
                    to,
                    piece: Piece::Pawn,
                    captured: Some(Piece::Pawn),
                    promotion: None,
                    is_en_passant: true,
                    is_castle: false,
                    is_double_push: false,
                });
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn emit_pawn_quiet_or_promo(
    ctx: &GenCtx,
    variant: Variant,
    to: Square,
    promo_rank: u8,
    from: Square,
    pin_restriction: Bitboard,
    list: &mut MoveList,
) {
    if !ctx.check_mask.contains(to) || !pin_restriction.contains(to) {
        return;
    }
    if to.rank() == promo_rank {
        for &promo in &PROMOTION_PIECES {
            if variant == Variant::CapturesAndPromotions || variant == Variant::All {
                list.push(Move {
                    from,
                    to,
                    piece: Piece::Pawn,
                    captured: None,
                    promotion: Some(promo),
                    is_en_passant: false,
                    is_castle: false,
                    is_double_push: false,
                });
            } else if variant == Variant::CapturesPromotionsAndChecks {
                let occ_after = (ctx.occ ^ Bitboard::from_square(from)) | Bitboard::from_square(to);
                if attack_tables::queen_attacks(to, occ_after).contains(ctx.enemy_king_sq)
                    || attack_tables::knight_attacks(to).contains(ctx.enemy_king_sq)
                {
                    list.push(Move {
                        from,
                        to,
                        piece: Piece::Pawn,
                        captured: None,
                        promotion: Some(promo),
                        is_en_passant: false,
                        is_castle: false,
                        is_double_push: false,
                    });
                }
            }
        }
    } else if variant == Variant::All {
        list.push(Move {
            from,
            to,
            piece: Piece::Pawn,
            captured: None,
            promotion: None,
            is_en_passant: false,
            is_castle: false,
            is_double_push: false,
        });
    } else if variant == Variant::CapturesPromotionsAndChecks {
        let occ_after = (ctx.occ ^ Bitboard::from_square(from)) | Bitboard::from_square(to);
        if attack_tables::pawn_attacks(ctx.us, to).contains(ctx.enemy_king_sq) {
            let _ = occ_after;
            list.push(Move {
                from,
                to,
                piece: Piece::Pawn,
                captured: None,
                promotion: None,
                is_en_passant: false,
                is_castle: false,
                is_double_push: false,
            });
        }
    }
}

fn emit_pawn_capture_or_promo(
    from: Square,
    to: Square,
    promo_rank: u8,
    captured: Option<Piece>,
    is_en_passant: bool,
    list: &mut MoveList,
) {
    if to.rank() == promo_rank {
        for &promo in &PROMOTION_PIECES {
            list.push(Move {
                from,
                to,
                piece: Piece::Pawn,
                captured,
                promotion: Some(promo),
                is_en_passant,
                is_castle: false,
                is_double_push: false,
            });
        }
    } else {
        list.push(Move {
            from,
            to,
            piece: Piece::Pawn,
            captured,
            promotion: None,
            is_en_passant,
            is_castle: false,
            is_double_push: false,
        });
    }
}

/// The notorious "en passant pin along the rank" case: both the capturing
/// pawn and the captured pawn vacate the rank simultaneously, which can
/// expose the king to a rook/queen even when neither pawn was individually
/// pinned. Checked by simulating the occupancy change directly.
fn en_passant_exposes_king(pos: &Position, ctx: &GenCtx, from: Square, captured_pawn_sq: Square) -> bool {
    if ctx.king_sq.rank() != from.rank() {
        return false;
    }
    let occ_after = ctx.occ ^ Bitboard::from_square(from) ^ Bitboard::from_square(captured_pawn_sq);
    let their = pos.player(ctx.them);
    attack_tables::rook_attacks(ctx.king_sq, occ_after).intersects(their.rooks | their.queens)
}
