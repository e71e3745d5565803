//! A small suite of hand-verified mate-in-one positions, checked two ways:
//! the position is in check with a single legal reply, and that reply
//! delivers checkmate.

use uci_engine::fen;
use uci_engine::movegen::{self, Variant};
use uci_engine::position::Position;

struct MateInOne {
    fen: &'static str,
    mv: &'static str,
}

const PUZZLES: &[MateInOne] = &[
    // Scenario-table row 1: rook lift to the back rank.
    MateInOne { fen: "6k1/6pp/1R1N1p2/p2r1P2/P7/2pn2P1/6KP/5R2 w - - 0 0", mv: "b6b8" },
    // Back-rank mate: king boxed in by its own pawns, rook swings to the open file.
    MateInOne { fen: "6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1", mv: "d1d8" },
    // Back-rank mate with the rook already lined up.
    MateInOne { fen: "6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1", mv: "a1a8" },
];

fn apply_uci(pos: &Position, uci: &str) -> Position {
    let legal = movegen::generate_moves(pos, Variant::All);
    let mv = uci_engine::types::Move::from_uci(uci, &legal).expect("move must be legal");
    pos.apply_move(mv)
}

#[test]
fn mate_in_one_suite() {
    for puzzle in PUZZLES {
        let pos = fen::parse(puzzle.fen).expect("valid FEN");
        let after = apply_uci(&pos, puzzle.mv);
        assert!(
            movegen::generate_moves(&after, Variant::All).is_empty()
                && after.is_in_check(after.side_to_move),
            "move {} from {} did not deliver checkmate",
            puzzle.mv,
            puzzle.fen,
        );
    }
}
