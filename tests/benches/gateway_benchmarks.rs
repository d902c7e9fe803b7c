//! # Ledger Gateway Benchmarks
//!
//! | Area | Path measured |
//! |------|---------------|
//! | lg-02 coverage | window classification against the known range |
//! | lg-02 range tracker | snapshot under no contention |
//! | lg-03 tx | JSON-RPC `tx` through executor and in-memory cluster |

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lg_02_ledger_backend::{coverage, make_backend, BackendConfig, LedgerBackendApi, RangeTracker};
use lg_03_api_gateway::{RpcHandlers, TxParams};
use lg_tests::fixtures::{transaction, write_ledgers};
use shared_types::LedgerRange;

fn bench_coverage(c: &mut Criterion) {
    let mut group = c.benchmark_group("lg-02-coverage");
    let known = LedgerRange::new(1_000, 2_000);

    for (name, min, max) in [
        ("full", 1_200, 1_800),
        ("partial", 500, 1_500),
        ("none", 3_000, 3_900),
    ] {
        group.bench_with_input(BenchmarkId::new("classify", name), &(min, max), |b, &(min, max)| {
            b.iter(|| black_box(coverage(min, max, known)))
        });
    }
    group.finish();
}

fn bench_range_snapshot(c: &mut Criterion) {
    let tracker = RangeTracker::new(LedgerRange::new(1, 10));
    c.bench_function("lg-02-range-snapshot", |b| b.iter(|| black_box(tracker.snapshot())));
}

fn bench_tx_lookup(c: &mut Criterion) {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => panic!("tokio runtime: {e}"),
    };
    let handlers = runtime.block_on(async {
        let backend = make_backend(&BackendConfig::default()).await.unwrap();
        write_ledgers(&backend, 1, 100).await.unwrap();
        let backend: Arc<dyn LedgerBackendApi> = Arc::new(backend);
        RpcHandlers::new(backend, Default::default())
    });

    let hash = transaction(42).hash();
    c.bench_function("lg-03-tx-found", |b| {
        b.to_async(&runtime).iter(|| async {
            black_box(
                handlers
                    .tx(TxParams {
                        transaction: hash,
                        min_ledger: None,
                        max_ledger: None,
                        binary: true,
                    })
                    .await
                    .is_ok(),
            )
        })
    });
}

criterion_group!(benches, bench_coverage, bench_range_snapshot, bench_tx_lookup);
criterion_main!(benches);
