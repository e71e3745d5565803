//! Benchmarks for move generation, evaluation, and search.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use uci_engine::movegen::{self, Variant};
use uci_engine::ordering::Heuristics;
use uci_engine::repetition::RepetitionTracker;
use uci_engine::search::{self, TimeManager};
use uci_engine::sync::StopFlag;
use uci_engine::tt::TranspositionTable;
use uci_engine::{eval, fen, position::Position};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const MIDDLEGAME: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";

fn bench_perft(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");

    let startpos = Position::starting_position();
    for depth in 1..=4 {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| movegen::perft(&startpos, black_box(depth)))
        });
    }

    let kiwipete = fen::parse(KIWIPETE).unwrap();
    for depth in 1..=3 {
        group.bench_with_input(BenchmarkId::new("kiwipete", depth), &depth, |b, &depth| {
            b.iter(|| movegen::perft(&kiwipete, black_box(depth)))
        });
    }

    group.finish();
}

fn bench_movegen(c: &mut Criterion) {
    let mut group = c.benchmark_group("movegen");

    let startpos = Position::starting_position();
    group.bench_function("startpos", |b| {
        b.iter(|| black_box(movegen::generate_moves(&startpos, Variant::All)))
    });

    let middlegame = fen::parse(MIDDLEGAME).unwrap();
    group.bench_function("middlegame", |b| {
        b.iter(|| black_box(movegen::generate_moves(&middlegame, Variant::All)))
    });

    let kiwipete = fen::parse(KIWIPETE).unwrap();
    group.bench_function("kiwipete", |b| {
        b.iter(|| black_box(movegen::generate_moves(&kiwipete, Variant::All)))
    });

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);

    for depth in [3, 4, 5] {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| {
                let pos = Position::starting_position();
                let mut tt = TranspositionTable::new(16);
                let mut heuristics = Heuristics::new(64);
                let mut repetition = RepetitionTracker::new();
                search::iterative_deepening(
                    &pos,
                    &mut tt,
                    &mut heuristics,
                    &mut repetition,
                    StopFlag::new(),
                    TimeManager::unbounded(),
                    depth,
                    |_| {},
                )
            })
        });
    }

    let tactical = "r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4";
    for depth in [3, 4] {
        group.bench_with_input(BenchmarkId::new("tactical", depth), &depth, |b, &depth| {
            b.iter(|| {
                let pos = fen::parse(tactical).unwrap();
                let mut tt = TranspositionTable::new(16);
                let mut heuristics = Heuristics::new(64);
                let mut repetition = RepetitionTracker::new();
                search::iterative_deepening(
                    &pos,
                    &mut tt,
                    &mut heuristics,
                    &mut repetition,
                    StopFlag::new(),
                    TimeManager::unbounded(),
                    depth,
                    |_| {},
                )
            })
        });
    }

    group.finish();
}

fn bench_eval(c: &mut Criterion) {
    let mut group = c.benchmark_group("eval");

    let positions = [
        ("startpos", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
        ("middlegame", MIDDLEGAME),
        ("endgame", "8/5k2/8/8/8/8/5K2/4R3 w - - 0 1"),
    ];

    for (name, fen_str) in positions {
        let pos = fen::parse(fen_str).unwrap();
        group.bench_with_input(BenchmarkId::new("position", name), &pos, |b, pos| {
            b.iter(|| black_box(eval::evaluate(pos)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_perft, bench_movegen, bench_search, bench_eval);
criterion_main!(benches);
