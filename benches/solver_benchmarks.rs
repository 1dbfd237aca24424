use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, SeedableRng};

use vincula::problems::n_queens::n_queens;
use vincula::solver::{
    backtracking,
    heuristic::HeuristicBacktracking,
    heuristics::{FirstCandidate, MinimumRemainingValues},
    inference::{ForwardChecking, MaintainArcConsistency},
    local::min_conflicts,
};

fn bench_plain_backtracking(c: &mut Criterion) {
    let mut group = c.benchmark_group("plain_backtracking");
    for n in [6, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut problem = n_queens(n).unwrap();
                let (status, _) = backtracking::solve(&mut problem, None).unwrap();
                black_box(status)
            });
        });
    }
    group.finish();
}

fn bench_heuristic_backtracking(c: &mut Criterion) {
    let mut group = c.benchmark_group("heuristic_backtracking");
    for n in [6, 8, 10] {
        group.bench_with_input(BenchmarkId::new("mrv_fc", n), &n, |b, &n| {
            b.iter(|| {
                let mut problem = n_queens(n).unwrap();
                let solver = HeuristicBacktracking::new(
                    Box::new(MinimumRemainingValues),
                    Box::new(FirstCandidate),
                )
                .with_inference(Box::new(ForwardChecking));
                let (status, _) = solver.solve(&mut problem, None).unwrap();
                black_box(status)
            });
        });
        group.bench_with_input(BenchmarkId::new("mrv_mac", n), &n, |b, &n| {
            b.iter(|| {
                let mut problem = n_queens(n).unwrap();
                let solver = HeuristicBacktracking::new(
                    Box::new(MinimumRemainingValues),
                    Box::new(FirstCandidate),
                )
                .with_inference(Box::new(MaintainArcConsistency));
                let (status, _) = solver.solve(&mut problem, None).unwrap();
                black_box(status)
            });
        });
    }
    group.finish();
}

fn bench_min_conflicts(c: &mut Criterion) {
    let mut group = c.benchmark_group("min_conflicts");
    for n in [8, 12] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut problem = n_queens(n).unwrap();
                let mut rng = StdRng::seed_from_u64(0);
                let status =
                    min_conflicts(&mut problem, 10_000, None, 0, &mut rng, None).unwrap();
                black_box(status)
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_plain_backtracking,
    bench_heuristic_backtracking,
    bench_min_conflicts
);
criterion_main!(benches);
