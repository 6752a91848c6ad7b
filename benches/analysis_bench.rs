// Analysis benchmarks

use criterion::async_executor::AsyncExecutor;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use repostats::analysis::{analyze, AnalysisOptions, RepoAnalysis};
use repostats::repository::GixStore;
use std::hint::black_box;
use std::sync::Arc;
use tokio::runtime::Runtime;

mod common;

struct TokioExecutor(Runtime);

impl AsyncExecutor for TokioExecutor {
    fn block_on<T>(&self, future: impl std::future::Future<Output = T>) -> T {
        self.0.block_on(future)
    }
}

fn bench_small_repo(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis_small_repo");
    group.sample_size(10);

    let (_dir, repo_path) = common::build_history_repo(200, 50, 10);

    group.bench_function("50_commits_200_files", |b| {
        b.to_async(TokioExecutor(Runtime::new().unwrap())).iter(|| async {
            let store = Arc::new(GixStore::open(&repo_path).unwrap());
            black_box(analyze(store, AnalysisOptions::quiet()).await.unwrap())
        });
    });

    group.finish();
}

fn bench_thread_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis_threads");
    group.sample_size(10);

    let (_dir, repo_path) = common::build_history_repo(500, 200, 10);

    for threads in [1, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            b.iter(|| {
                let store = Arc::new(GixStore::open(&repo_path).unwrap());
                let options = AnalysisOptions::quiet().with_threads(threads);
                black_box(RepoAnalysis::new(store, options).run().unwrap())
            });
        });
    }

    group.finish();
}

fn bench_memory_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis_memory_store");

    for commits in [1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(commits), &commits, |b, &commits| {
            b.iter_batched(
                || Arc::new(common::memory_history(commits, 64)),
                |store| black_box(RepoAnalysis::new(store, AnalysisOptions::quiet()).run().unwrap()),
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_small_repo, bench_thread_scaling, bench_memory_store);
criterion_main!(benches);
