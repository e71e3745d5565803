//! FEN/EPD parsing and formatting.

use crate::error::FenError;
use crate::position::{Player, Position};
use crate::types::{CastlingRights, Color, Piece, Side, Square};
use crate::zobrist::compute_hash;

/// Parses a FEN (or EPD, which omits the trailing halfmove/fullmove fields).
pub fn parse(fen: &str) -> Result<Position, FenError> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(FenError::TooFewParts { found: fields.len() });
    }

    let mut white = Player::empty();
    let mut black = Player::empty();
    parse_placement(fields[0], &mut white, &mut black)?;

    let side_to_move = match fields[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(FenError::InvalidSideToMove { found: other.to_string() }),
    };

    parse_castling(fields[2], &mut white, &mut black)?;

    let en_passant_pawn = parse_en_passant(fields[3], side_to_move)?;

    let halfmove_clock = fields.get(4).and_then(|s| s.parse().ok()).unwrap_or(0);

    let combined_castling = {
        let mut c = CastlingRights::none();
        for (color, side) in white.castling.iter_granted() {
            c.set(color, side);
        }
        for (color, side) in black.castling.iter_granted() {
            c.set(color, side);
        }
        c
    };

    let hash = compute_hash(
        |sq| {
            if let Some(p) = white.piece_at(sq) {
                Some((Color::White, p))
            } else {
                black.piece_at(sq).map(|p| (Color::Black, p))
            }
        },
        side_to_move == Color::White,
        combined_castling,
        en_passant_pawn,
    );

    Ok(Position { white, black, side_to_move, en_passant_pawn, halfmove_clock, hash })
}

fn parse_placement(field: &str, white: &mut Player, black: &mut Player) -> Result<(), FenError> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::InvalidRank { rank: field.to_string() });
    }
    // FEN lists ranks from 8 down to 1; our rank index 0 is rank 1.
    for (i, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - i as u8;
        let mut file = 0u8;
        for c in rank_str.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as u8;
                if file > 8 {
                    return Err(FenError::TooManyFiles { rank: 8 - i, files: file as usize });
                }
                continue;
            }
            if file >= 8 {
                return Err(FenError::TooManyFiles { rank: 8 - i, files: file as usize + 1 });
            }
            let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
            let sq = Square::new(rank, file);
            let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
            let player = match color {
                Color::White => &mut *white,
                Color::Black => &mut *black,
            };
            set_piece(player, piece, sq);
            file += 1;
        }
        if file != 8 {
            return Err(FenError::TooFewFiles { rank: 8 - i, files: file as usize });
        }
    }
    Ok(())
}

fn set_piece(player: &mut Player, piece: Piece, sq: Square) {
    let bb = match piece {
        Piece::Pawn => &mut player.pawns,
        Piece::Knight => &mut player.knights,
        Piece::Bishop => &mut player.bishops,
        Piece::Rook => &mut player.rooks,
        Piece::Queen => &mut player.queens,
        Piece::King => &mut player.king,
    };
    bb.set(sq);
}

fn parse_castling(field: &str, white: &mut Player, black: &mut Player) -> Result<(), FenError> {
    if field == "-" {
        return Ok(());
    }
    for c in field.chars() {
        match c {
            'K' => white.castling.set(Color::White, Side::Kingside),
            'Q' => white.castling.set(Color::White, Side::Queenside),
            'k' => black.castling.set(Color::Black, Side::Kingside),
            'q' => black.castling.set(Color::Black, Side::Queenside),
            other => return Err(FenError::InvalidCastling { char: other }),
        }
    }
    Ok(())
}

/// FEN's en-passant field names the *target* square a pawn could capture
/// onto; `Position` stores the square of the pawn that double-pushed, one
/// rank behind that target from the mover's perspective.
fn parse_en_passant(field: &str, side_to_move: Color) -> Result<Option<Square>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    let target: Square =
        field.parse().map_err(|_| FenError::InvalidEnPassant { found: field.to_string() })?;
    let pawn_rank = if side_to_move == Color::White { target.rank() - 1 } else { target.rank() + 1 };
    Ok(Some(Square::new(pawn_rank, target.file())))
}

/// Formats a position back to FEN (fullmove number is not tracked by
/// `Position`, so `1` is always emitted — matching EPD-style round trips).
#[must_use]
pub fn to_fen(pos: &Position) -> String {
    let mut placement = String::new();
    for i in 0..8 {
        let rank = 7 - i;
        let mut empty_run = 0u8;
        for file in 0..8 {
            let sq = Square::new(rank, file);
            match pos.piece_at(sq) {
                None => empty_run += 1,
                Some((color, piece)) => {
                    if empty_run > 0 {
                        placement.push((b'0' + empty_run) as char);
                        empty_run = 0;
                    }
                    placement.push(piece.to_fen_char(color));
                }
            }
        }
        if empty_run > 0 {
            placement.push((b'0' + empty_run) as char);
        }
        if i != 7 {
            placement.push('/');
        }
    }

    let side = if pos.side_to_move == Color::White { "w" } else { "b" };

    let mut castling = String::new();
    if pos.white.castling.has(Color::White, Side::Kingside) {
        castling.push('K');
    }
    if pos.white.castling.has(Color::White, Side::Queenside) {
        castling.push('Q');
    }
    if pos.black.castling.has(Color::Black, Side::Kingside) {
        castling.push('k');
    }
    if pos.black.castling.has(Color::Black, Side::Queenside) {
        castling.push('q');
    }
    if castling.is_empty() {
        castling.push('-');
    }

    let ep = match pos.en_passant_pawn {
        Some(pawn_sq) => {
            let target_rank =
                if pos.side_to_move == Color::White { pawn_sq.rank() + 1 } else { pawn_sq.rank() - 1 };
            Square::new(target_rank, pawn_sq.file()).to_string()
        }
        None => "-".to_string(),
    };

    format!("{placement} {side} {castling} {ep} {} 1", pos.halfmove_clock)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_round_trips() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        let pos = parse(fen).unwrap();
        assert_eq!(to_fen(&pos), fen);
    }

    #[test]
    fn en_passant_target_translates_to_pawn_square() {
        let pos = parse("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3").unwrap();
        assert_eq!(pos.en_passant_pawn, Some("d5".parse().unwrap()));
    }

    #[test]
    fn rejects_too_few_fields() {
        assert!(matches!(parse("8/8/8/8/8/8/8/8"), Err(FenError::TooFewParts { .. })));
    }

    #[test]
    fn rejects_short_rank() {
        let err = parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap_err();
        assert!(matches!(err, FenError::TooFewFiles { .. }));
    }

    #[test]
    fn rejects_unknown_side_to_move() {
        let err =
            parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1").unwrap_err();
        assert!(matches!(err, FenError::InvalidSideToMove { .. }));
    }

    #[test]
    fn kiwipete_parses_with_full_castling_rights() {
        let pos =
            parse("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -").unwrap();
        assert!(pos.white.castling.has(Color::White, Side::Kingside));
        assert!(pos.black.castling.has(Color::Black, Side::Queenside));
    }
}
