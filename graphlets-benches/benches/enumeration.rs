//! Exhaustive census benchmarks.
//!
//! Measures enumeration plus parallel canonicalization of every connected
//! induced subgraph on sparse Erdős–Rényi hosts.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use graphlets_benches::{
    error::BenchSetupError,
    params::{GraphletBenchParams, HostParams},
    synthetic_host,
};
use graphlets_core::{CanonicalizerKind, ExhaustiveOptions, SubgraphEnumerator};

const SEED: u64 = 42;

const CASES: &[(usize, usize, usize)] = &[(200, 400, 3), (200, 400, 4), (500, 1_000, 4)];

fn enumeration_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("enumerate");
    group.sample_size(20);
    for &(vertices, edges, size) in CASES {
        let params = GraphletBenchParams {
            host: HostParams::new(vertices, edges, SEED),
            size,
        };
        let host = synthetic_host(&params.host)?;
        group.bench_with_input(BenchmarkId::from_parameter(params), &host, |b, host| {
            b.iter(|| {
                SubgraphEnumerator::global(host.clone(), size)
                    .map(Iterator::count)
                    .unwrap_or_default()
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("exhaustive_census");
    group.sample_size(10);
    for kind in [CanonicalizerKind::Lazy, CanonicalizerKind::Eager] {
        let params = GraphletBenchParams {
            host: HostParams::new(200, 400, SEED),
            size: 4,
        };
        let host = synthetic_host(&params.host)?;
        let pipeline = ExhaustiveOptions::new(params.size)
            .with_canonicalizer(kind)
            .build()?;
        group.bench_with_input(
            BenchmarkId::new(format!("{kind:?}"), params),
            &host,
            |b, host| {
                b.iter(|| pipeline.run(host.clone()).map(|report| report.motifs));
            },
        );
    }
    group.finish();
    Ok(())
}

fn enumeration(c: &mut Criterion) {
    if let Err(err) = enumeration_impl(c) {
        panic!("enumeration benchmark setup failed: {err}");
    }
}

criterion_group!(benches, enumeration);
criterion_main!(benches);
