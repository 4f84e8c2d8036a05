//! Benchmarks for registration and shutdown.

use closer::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

fn registration_benchmark(c: &mut Criterion) {
    c.bench_function("add_1000", |b| {
        b.iter(|| {
            let closer = Closer::new();
            for _ in 0..1000 {
                closer.add(|| Ok(()));
            }
            black_box(closer.len())
        })
    });
}

fn close_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();

    for order in [ExecutionOrder::Parallel, ExecutionOrder::Fifo] {
        c.bench_function(&format!("close_100_async_{order}"), |b| {
            b.to_async(&runtime).iter(|| async move {
                let closer = Closer::builder()
                    .with_order(order)
                    .with_reporter(Arc::new(NoOpReporter))
                    .build();
                for _ in 0..100 {
                    closer.register(Releaser::from_async("noop", || async {
                        Ok::<_, anyhow::Error>(())
                    }));
                }
                black_box(closer.close().await)
            })
        });
    }
}

criterion_group!(benches, registration_benchmark, close_benchmark);
criterion_main!(benches);
