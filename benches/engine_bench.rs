//! Engine benchmarks: move generation, perft and search.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mate_puzzles::movegen::perft;
use mate_puzzles::{Engine, Position};

const MIDDLEGAME: &str = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w - - 0 1";

fn bench_legal_moves_start(c: &mut Criterion) {
    let mut pos = Position::start();
    c.bench_function("legal_moves_start", |b| {
        b.iter(|| black_box(pos.get_possible_moves().len()))
    });
}

fn bench_legal_moves_middlegame(c: &mut Criterion) {
    let mut pos = Position::from_fen(MIDDLEGAME).unwrap();
    c.bench_function("legal_moves_middlegame", |b| {
        b.iter(|| black_box(pos.get_possible_moves().len()))
    });
}

fn bench_perft_3(c: &mut Criterion) {
    let mut pos = Position::start();
    c.bench_function("perft_3_start", |b| b.iter(|| black_box(perft(&mut pos, 3))));
}

fn bench_evaluate_cold(c: &mut Criterion) {
    let mut pos = Position::from_fen(MIDDLEGAME).unwrap();
    c.bench_function("iter_evaluate_2_cold_cache", |b| {
        b.iter(|| {
            let mut engine = Engine::with_seed(1);
            black_box(engine.iter_evaluate(&mut pos, 2))
        })
    });
}

fn bench_mate_search(c: &mut Criterion) {
    let mut pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
    c.bench_function("find_fastest_mate_back_rank", |b| {
        b.iter(|| {
            let mut engine = Engine::with_seed(1);
            black_box(engine.find_fastest_mate(&mut pos, 2))
        })
    });
}

criterion_group!(
    benches,
    bench_legal_moves_start,
    bench_legal_moves_middlegame,
    bench_perft_3,
    bench_evaluate_cold,
    bench_mate_search,
);
criterion_main!(benches);
