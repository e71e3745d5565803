//! Move generation regressions: the standard perft node counts at depth,
//! transposition-table replacement behavior, and fifty-move draw detection.

use uci_engine::fen;
use uci_engine::movegen;
use uci_engine::position::Position;
use uci_engine::tt::{Bound, TranspositionTable};

struct TestPosition {
    name: &'static str,
    fen: &'static str,
    depths: &'static [(u32, u64)],
}

const TEST_POSITIONS: &[TestPosition] = &[
    TestPosition {
        name: "Initial Position",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        depths: &[(1, 20), (2, 400), (3, 8902), (4, 197281), (5, 4865609)],
    },
    TestPosition {
        name: "Kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        depths: &[(1, 48), (2, 2039), (3, 97862), (4, 4085603)],
    },
];

#[test]
fn perft_positions() {
    for position in TEST_POSITIONS {
        let pos = fen::parse(position.fen).expect("valid FEN");
        for &(depth, expected) in position.depths {
            let nodes = movegen::perft(&pos, depth);
            assert_eq!(nodes, expected, "perft failed for {} at depth {depth}", position.name);
        }
    }
}

#[test]
fn perft_kiwipete_to_depth_five_matches_scenario_six() {
    let pos = fen::parse("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -")
        .expect("valid FEN");
    assert_eq!(movegen::perft(&pos, 5), 4_085_603);
}

#[test]
fn fifty_move_rule_halfmove_clock_reaches_the_limit() {
    let pos = fen::parse("8/8/8/8/8/8/8/K1k5 w - - 100 1").expect("valid FEN");
    assert!(pos.halfmove_clock >= 100);
}

#[test]
fn transposition_table_prefers_deeper_entries_and_keeps_shallower() {
    let mut tt = TranspositionTable::new(1);
    let hash = 0xdead_beefu64;
    tt.store(hash, 1, 100, Bound::Exact, None, 0);
    let entry = tt.probe(hash, 0).expect("entry missing");
    assert_eq!(entry.depth, 1);

    tt.store(hash, 0, 50, Bound::Exact, None, 0);
    let entry = tt.probe(hash, 0).expect("entry missing after a shallower store");
    assert_eq!(entry.depth, 1, "a shallower store must not evict a deeper one");

    tt.store(hash, 5, 200, Bound::Exact, None, 0);
    let entry = tt.probe(hash, 0).expect("entry missing after a deeper store");
    assert_eq!(entry.depth, 5);
}

#[test]
fn starting_position_has_twenty_legal_moves() {
    let pos = Position::starting_position();
    assert_eq!(movegen::generate_moves(&pos, movegen::Variant::All).len(), 20);
}
