//! Benchmark for leaderboard update and query throughput.
//!
//! Run with: cargo bench --package podium_ranking --bench ranking_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use podium_ranking::{PlayerId, RankingEngine};
use std::sync::Arc;
use std::thread;

fn seeded_board(players: usize) -> (RankingEngine, Vec<PlayerId>) {
    let board = RankingEngine::new();
    let ids: Vec<PlayerId> = (0..players).map(|i| PlayerId::from(format!("User_{i}"))).collect();
    for (i, id) in ids.iter().enumerate() {
        board.update_score(id, (i % 1_000) as i64);
    }
    (board, ids)
}

fn benchmark_single_update(c: &mut Criterion) {
    let (board, ids) = seeded_board(10_000);

    c.bench_function("single_update", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i = i.wrapping_add(1);
            let id = &ids[i % ids.len()];
            board.update_score(black_box(id), black_box((i % 5_000) as i64));
        });
    });
}

fn benchmark_top_n(c: &mut Criterion) {
    let (board, _) = seeded_board(100_000);

    let mut group = c.benchmark_group("top_n");
    for n in [10usize, 100, 1_000] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(board.top_n(black_box(n))));
        });
    }
    group.finish();
}

fn benchmark_contended_updates(c: &mut Criterion) {
    let threads = 8;
    let ops_per_thread = 10_000;

    let mut group = c.benchmark_group("contended_updates");
    group.throughput(Throughput::Elements((threads * ops_per_thread) as u64));
    group.sample_size(10);

    for hot_players in [4usize, 10_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(hot_players),
            &hot_players,
            |b, &hot_players| {
                b.iter(|| {
                    let board = Arc::new(RankingEngine::new());
                    let handles: Vec<_> = (0..threads)
                        .map(|t| {
                            let board = Arc::clone(&board);
                            thread::spawn(move || {
                                for i in 0..ops_per_thread {
                                    let id = format!("User_{}", (t * 7_919 + i) % hot_players);
                                    board.update_score(id, (i % 500) as i64);
                                }
                            })
                        })
                        .collect();
                    for h in handles {
                        h.join().unwrap();
                    }
                    black_box(board.total_players())
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_single_update,
    benchmark_top_n,
    benchmark_contended_updates
);
criterion_main!(benches);
