//! End-to-end searches through the `Engine` facade: the literal scenario
//! table's mate-finding and material-preserving positions, time-limited
//! `go`, and mid-search `stop`.

use std::time::Duration;

use uci_engine::engine::{Engine, GoLimits};
use uci_engine::fen;
use uci_engine::position::Position;

fn search_to_depth(fen_str: &str, depth: u32) -> Option<String> {
    let pos = fen::parse(fen_str).expect("valid FEN");
    let mut engine = Engine::new();
    engine.go(pos, GoLimits { depth: Some(depth), ..Default::default() }, None, None);
    engine.wait_for_done();
    engine.best_move().map(|mv| mv.to_uci())
}

#[test]
fn scenario_one_mate_in_one() {
    let mv = search_to_depth("6k1/6pp/1R1N1p2/p2r1P2/P7/2pn2P1/6KP/5R2 w - - 0 0", 2);
    assert_eq!(mv.as_deref(), Some("b6b8"));
}

#[test]
fn scenario_two_mate_in_two() {
    let mv = search_to_depth("7Q/1r2k1pp/2b1p3/2q5/4pN2/P2n3P/1P1K2P1/R4B1R b - - 0 0", 4);
    assert_eq!(mv.as_deref(), Some("b7b2"));
}

#[test]
fn scenario_four_does_not_hang_a_pawn() {
    let mv = search_to_depth("rnbqkbnr/pppp1ppp/8/4p3/3P4/8/PPP1PPPP/RNBQKBNR w KQkq - 0 0", 6);
    assert_eq!(mv.as_deref(), Some("d4e5"));
}

#[test]
fn engine_depth_one_search_always_returns_a_move() {
    let pos = Position::starting_position();
    let mut engine = Engine::new();
    engine.go(pos, GoLimits { depth: Some(1), ..Default::default() }, None, None);
    engine.wait_for_done();
    assert!(engine.best_move().is_some());
}

#[test]
fn engine_time_limited_search_returns_within_budget() {
    let pos = Position::starting_position();
    let mut engine = Engine::new();
    let start = std::time::Instant::now();
    engine.go(
        pos,
        GoLimits { movetime: Some(Duration::from_millis(50)), ..Default::default() },
        None,
        None,
    );
    engine.wait_for_done();
    assert!(engine.best_move().is_some());
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn engine_stop_mid_search_still_yields_a_legal_move() {
    let pos = Position::starting_position();
    let mut engine = Engine::new();
    engine.go(pos, GoLimits { depth: Some(30), ..Default::default() }, None, None);
    std::thread::sleep(Duration::from_millis(20));
    engine.stop();
    assert!(engine.best_move().is_some());
}

#[test]
fn new_game_stops_the_running_search_and_leaves_the_engine_usable() {
    let pos = Position::starting_position();
    let mut engine = Engine::new();
    engine.go(pos, GoLimits { depth: Some(20), ..Default::default() }, None, None);
    engine.new_game();
    engine.go(pos, GoLimits { depth: Some(1), ..Default::default() }, None, None);
    engine.wait_for_done();
    assert!(engine.best_move().is_some());
}
