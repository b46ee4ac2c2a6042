//! Random-walk benchmarks: raw stepping per policy and the sampling pipeline.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{SeedableRng, rngs::SmallRng};

use graphlets_benches::{
    error::BenchSetupError,
    params::{GraphletBenchParams, HostParams},
    synthetic_host,
};
use graphlets_core::{
    AdjacencyGraph, CowardWalk, FullWalk, GraphletWalk, Result, SmartWalk, WalkSamplerOptions,
};

const SEED: u64 = 42;

const STEPS: u64 = 1_000;

fn walk<W: GraphletWalk>(mut walk: W) -> Result<u64> {
    walk.walk(STEPS)?;
    Ok(walk.real_steps())
}

fn random_walk_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let params = GraphletBenchParams {
        host: HostParams::new(2_000, 8_000, SEED),
        size: 5,
    };
    let host = synthetic_host(&params.host)?;
    let size = params.size;

    let mut group = c.benchmark_group("walk_steps");
    group.sample_size(20);
    group.bench_with_input(BenchmarkId::new("full", params), &host, |b, host: &AdjacencyGraph| {
        b.iter(|| {
            FullWalk::new(host.clone(), size, None, SmallRng::seed_from_u64(SEED)).and_then(walk)
        });
    });
    group.bench_with_input(BenchmarkId::new("smart", params), &host, |b, host: &AdjacencyGraph| {
        b.iter(|| {
            SmartWalk::new(host.clone(), size, None, SmallRng::seed_from_u64(SEED)).and_then(walk)
        });
    });
    group.bench_with_input(BenchmarkId::new("coward", params), &host, |b, host: &AdjacencyGraph| {
        b.iter(|| {
            CowardWalk::new(host.clone(), size, None, SmallRng::seed_from_u64(SEED)).and_then(walk)
        });
    });
    group.finish();

    let mut group = c.benchmark_group("walk_sampling");
    group.sample_size(10);
    let pipeline = WalkSamplerOptions::new(size, 64, 200).with_seed(SEED).build()?;
    group.bench_with_input(BenchmarkId::from_parameter(params), &host, |b, host| {
        b.iter(|| pipeline.run(host.clone()).map(|report| report.samples));
    });
    group.finish();
    Ok(())
}

fn random_walk(c: &mut Criterion) {
    if let Err(err) = random_walk_impl(c) {
        panic!("random-walk benchmark setup failed: {err}");
    }
}

criterion_group!(benches, random_walk);
criterion_main!(benches);
