//! Tapered piece-square-table evaluation.
//!
//! Material and positional value are baked into one pair of tables per
//! piece (middlegame, endgame); the two are blended by a 0-256 game-phase
//! scalar and the result is returned from the side-to-move's perspective.

use crate::position::Position;
use crate::types::{Color, Piece, Square, ALL_PIECES};

/// Sum of phase weights at the starting position (4 knights + 4 bishops +
/// 4 rooks + 2 queens, weighted 1/1/2/4).
const PHASE_TOTAL: i32 = 24;

/// A score is winning/losing once its magnitude reaches this threshold;
/// shorter mates get higher magnitudes via the `+ depth` term.
pub const MATE_THRESHOLD: i32 = 10_000;

/// Search window bounds, comfortably outside any mate sentinel.
pub const MIN_SCORE: i32 = -30_000;
pub const MAX_SCORE: i32 = 30_000;

#[inline]
#[must_use]
pub const fn winning(depth: i32) -> i32 {
    20_000 + depth
}

#[inline]
#[must_use]
pub const fn losing(depth: i32) -> i32 {
    -(20_000 + depth)
}

#[inline]
#[must_use]
pub const fn is_winning(score: i32) -> bool {
    score >= MATE_THRESHOLD
}

#[inline]
#[must_use]
pub const fn is_losing(score: i32) -> bool {
    score <= -MATE_THRESHOLD
}

/// Evaluates `pos` and returns a centipawn score from the perspective of the
/// side to move.
#[must_use]
pub fn evaluate(pos: &Position) -> i32 {
    let mut mg = 0i32;
    let mut eg = 0i32;
    let mut phase = 0i32;

    for piece in ALL_PIECES {
        for sq in pos.white.bitboard_of(piece).iter() {
            let pst_sq = pst_index(Color::White, sq);
            mg += PST_MG[piece.index()][pst_sq];
            eg += PST_EG[piece.index()][pst_sq];
            phase += piece.phase_weight();
        }
        for sq in pos.black.bitboard_of(piece).iter() {
            let pst_sq = pst_index(Color::Black, sq);
            mg -= PST_MG[piece.index()][pst_sq];
            eg -= PST_EG[piece.index()][pst_sq];
            phase += piece.phase_weight();
        }
    }

    let normalized_phase = ((phase * 256) / PHASE_TOTAL).min(256);
    let score = (mg * normalized_phase + eg * (256 - normalized_phase)) / 256;

    if pos.side_to_move == Color::White {
        score
    } else {
        -score
    }
}

/// PST square index: tables are authored from White's own perspective
/// (index 0 = a1, White's back rank), so White reads them directly and
/// Black reads the rank-mirrored square.
#[inline]
#[must_use]
fn pst_index(color: Color, sq: Square) -> usize {
    match color {
        Color::White => sq.as_index(),
        Color::Black => (sq.as_index() ^ 56),
    }
}

#[rustfmt::skip]
const PAWN_MG: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
    105, 110, 110,  80,  80, 110, 110, 105,
    105,  95,  90, 100, 100,  90,  95, 105,
    100, 100, 100, 118, 118, 100, 100, 100,
    105, 105, 110, 125, 125, 110, 105, 105,
    110, 115, 125, 135, 135, 125, 115, 110,
    150, 150, 150, 150, 150, 150, 150, 150,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const PAWN_EG: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
    100, 100, 100,  95,  95, 100, 100, 100,
    105, 100,  95,  95,  95,  95, 100, 105,
    110, 105, 100, 100, 100, 100, 105, 110,
    125, 120, 115, 110, 110, 115, 120, 125,
    160, 150, 140, 130, 130, 140, 150, 160,
    200, 190, 180, 170, 170, 180, 190, 200,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT_MG: [i32; 64] = [
    250, 270, 280, 280, 280, 280, 270, 250,
    270, 292, 320, 325, 325, 320, 292, 270,
    280, 322, 335, 340, 340, 335, 322, 280,
    282, 328, 345, 350, 350, 345, 328, 282,
    282, 328, 345, 350, 350, 345, 328, 282,
    280, 325, 335, 345, 345, 335, 325, 280,
    270, 290, 320, 328, 328, 320, 290, 270,
    245, 268, 280, 285, 285, 280, 268, 245,
];

#[rustfmt::skip]
const KNIGHT_EG: [i32; 64] = [
    245, 262, 275, 280, 280, 275, 262, 245,
    262, 285, 300, 310, 310, 300, 285, 262,
    275, 300, 318, 325, 325, 318, 300, 275,
    280, 310, 325, 335, 335, 325, 310, 280,
    280, 310, 325, 335, 335, 325, 310, 280,
    275, 300, 318, 325, 325, 318, 300, 275,
    262, 285, 300, 310, 310, 300, 285, 262,
    240, 260, 275, 280, 280, 275, 260, 240,
];

#[rustfmt::skip]
const BISHOP_MG: [i32; 64] = [
    310, 320, 318, 315, 315, 318, 320, 310,
    320, 335, 330, 330, 330, 330, 335, 320,
    320, 335, 340, 338, 338, 340, 335, 320,
    320, 328, 338, 345, 345, 338, 328, 320,
    320, 328, 338, 345, 345, 338, 328, 320,
    320, 338, 338, 338, 338, 338, 338, 320,
    320, 335, 330, 330, 330, 330, 335, 320,
    305, 318, 312, 312, 312, 312, 318, 305,
];

#[rustfmt::skip]
const BISHOP_EG: [i32; 64] = [
    310, 318, 315, 315, 315, 315, 318, 310,
    318, 325, 325, 325, 325, 325, 325, 318,
    315, 325, 335, 335, 335, 335, 325, 315,
    315, 325, 335, 342, 342, 335, 325, 315,
    315, 325, 335, 342, 342, 335, 325, 315,
    315, 325, 335, 335, 335, 335, 325, 315,
    318, 325, 325, 325, 325, 325, 325, 318,
    310, 318, 315, 315, 315, 315, 318, 310,
];

#[rustfmt::skip]
const ROOK_MG: [i32; 64] = [
    495, 500, 500, 505, 505, 500, 500, 495,
    490, 495, 500, 500, 500, 500, 495, 490,
    490, 495, 500, 500, 500, 500, 495, 490,
    490, 495, 500, 500, 500, 500, 495, 490,
    490, 495, 500, 500, 500, 500, 495, 490,
    490, 495, 500, 500, 500, 500, 495, 490,
    515, 520, 520, 520, 520, 520, 520, 515,
    500, 500, 505, 510, 510, 505, 500, 500,
];

#[rustfmt::skip]
const ROOK_EG: [i32; 64] = [
    500, 502, 505, 505, 505, 505, 502, 500,
    498, 500, 500, 500, 500, 500, 500, 498,
    498, 500, 500, 500, 500, 500, 500, 498,
    498, 500, 500, 500, 500, 500, 500, 498,
    500, 502, 505, 505, 505, 505, 502, 500,
    505, 508, 510, 510, 510, 510, 508, 505,
    510, 512, 515, 515, 515, 515, 512, 510,
    505, 508, 510, 512, 512, 510, 508, 505,
];

#[rustfmt::skip]
const QUEEN_MG: [i32; 64] = [
    880, 885, 885, 888, 888, 885, 885, 880,
    885, 895, 898, 898, 898, 898, 895, 885,
    885, 898, 905, 905, 905, 905, 898, 885,
    888, 898, 905, 910, 910, 905, 898, 888,
    890, 898, 905, 910, 910, 905, 898, 890,
    885, 900, 905, 905, 905, 905, 900, 885,
    885, 895, 900, 900, 900, 900, 895, 885,
    880, 885, 885, 890, 890, 885, 885, 880,
];

#[rustfmt::skip]
const QUEEN_EG: [i32; 64] = [
    870, 880, 885, 888, 888, 885, 880, 870,
    880, 895, 900, 905, 905, 900, 895, 880,
    885, 900, 912, 918, 918, 912, 900, 885,
    888, 905, 918, 925, 925, 918, 905, 888,
    888, 905, 918, 925, 925, 918, 905, 888,
    885, 900, 912, 918, 918, 912, 900, 885,
    880, 895, 900, 905, 905, 900, 895, 880,
    870, 880, 885, 888, 888, 885, 880, 870,
];

#[rustfmt::skip]
const KING_MG: [i32; 64] = [
    20_004, 20_030, 20_010, 19_955, 19_985, 19_975, 20_035, 20_015,
    19_998, 19_995, 19_975, 19_965, 19_965, 19_975, 19_995, 19_998,
    19_965, 19_950, 19_930, 19_920, 19_920, 19_930, 19_950, 19_965,
    19_945, 19_930, 19_910, 19_895, 19_895, 19_910, 19_930, 19_945,
    19_930, 19_915, 19_895, 19_880, 19_880, 19_895, 19_915, 19_930,
    19_915, 19_900, 19_880, 19_865, 19_865, 19_880, 19_900, 19_915,
    19_900, 19_885, 19_865, 19_850, 19_850, 19_865, 19_885, 19_900,
    19_885, 19_870, 19_850, 19_835, 19_835, 19_850, 19_870, 19_885,
];

#[rustfmt::skip]
const KING_EG: [i32; 64] = [
    19_870, 19_900, 19_920, 19_930, 19_930, 19_920, 19_900, 19_870,
    19_900, 19_935, 19_955, 19_965, 19_965, 19_955, 19_935, 19_900,
    19_920, 19_955, 19_980, 19_990, 19_990, 19_980, 19_955, 19_920,
    19_930, 19_965, 19_990, 20_000, 20_000, 19_990, 19_965, 19_930,
    19_930, 19_965, 19_990, 20_000, 20_000, 19_990, 19_965, 19_930,
    19_920, 19_955, 19_980, 19_990, 19_990, 19_980, 19_955, 19_920,
    19_900, 19_935, 19_955, 19_965, 19_965, 19_955, 19_935, 19_900,
    19_870, 19_900, 19_920, 19_930, 19_930, 19_920, 19_900, 19_870,
];

const PST_MG: [[i32; 64]; 6] = [PAWN_MG, KNIGHT_MG, BISHOP_MG, ROOK_MG, QUEEN_MG, KING_MG];
const PST_EG: [[i32; 64]; 6] = [PAWN_EG, KNIGHT_EG, BISHOP_EG, ROOK_EG, QUEEN_EG, KING_EG];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen;

    #[test]
    fn starting_position_is_balanced() {
        let pos = Position::starting_position();
        assert_eq!(evaluate(&pos), 0);
    }

    #[test]
    fn extra_queen_is_a_large_advantage() {
        let pos = fen::parse("4k3/8/8/8/8/8/8/Q3K3 w - - 0 1").unwrap();
        assert!(evaluate(&pos) > 800);
    }

    #[test]
    fn score_flips_sign_with_side_to_move() {
        let white_up_a_queen = fen::parse("4k3/8/8/8/8/8/8/Q3K3 w - - 0 1").unwrap();
        let black_up_a_queen = fen::parse("q3k3/8/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert_eq!(evaluate(&white_up_a_queen), evaluate(&black_up_a_queen));
    }

    #[test]
    fn knight_in_the_corner_is_worse_than_knight_in_the_center() {
        let corner = fen::parse("4k3/8/8/8/8/8/8/N3K3 w - - 0 1").unwrap();
        let center = fen::parse("4k3/8/8/3N4/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(evaluate(&center) > evaluate(&corner));
    }

    #[test]
    fn mate_sentinels_prefer_shorter_mates() {
        assert!(winning(1) > winning(3));
        assert!(losing(1) < losing(3));
    }

    #[test]
    fn mate_threshold_classification() {
        assert!(is_winning(winning(0)));
        assert!(is_losing(losing(0)));
        assert!(!is_winning(0));
        assert!(!is_losing(0));
    }

    #[test]
    fn normalized_phase_caps_at_full_middlegame() {
        // Promoting extra queens must not push the phase scalar past 256.
        let pos =
            fen::parse("qqqqkqqq/qqqqqqqq/8/8/8/8/QQQQQQQQ/QQQQKQQQ w - - 0 1").unwrap();
        // No panics / overflow is the property under test; the score itself
        // is not asserted beyond being finite i32 arithmetic.
        let _ = evaluate(&pos);
    }
}
