//! Benchmarks for the fulfill/retrieve round trip and continuation dispatch.

#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint;

use criterion::{criterion_group, criterion_main, Criterion};
use promises::{when_all, Promise};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_trip");

    group.bench_function("set_then_get", |b| {
        b.iter(|| {
            let (mut promise, future) = Promise::pair();
            promise.set_value(hint::black_box(42)).unwrap();
            let value = future.get().unwrap();
            hint::black_box(value);
        });
    });

    group.bench_function("then_chain_x2", |b| {
        b.iter(|| {
            let (mut promise, future) = Promise::pair();
            let chained = future.then(|x: i32| x + 1).then(|x| x * 10);
            promise.set_value(hint::black_box(4)).unwrap();
            let value = chained.get().unwrap();
            hint::black_box(value);
        });
    });

    group.bench_function("and_then_ready", |b| {
        b.iter(|| {
            let (mut promise, future) = Promise::pair();
            let flattened = future.and_then(|x: i32| promises::Future::ready(x * 2));
            promise.set_value(hint::black_box(21)).unwrap();
            let value = flattened.get().unwrap();
            hint::black_box(value);
        });
    });

    group.bench_function("when_all_8", |b| {
        b.iter(|| {
            let mut promises = Vec::with_capacity(8);
            let mut futures = Vec::with_capacity(8);
            for _ in 0..8 {
                let (promise, future) = Promise::pair();
                promises.push(promise);
                futures.push(future);
            }

            let all = when_all(futures);
            for (index, promise) in promises.iter_mut().enumerate() {
                promise.set_value(hint::black_box(index as u32)).unwrap();
            }

            let values = all.get().unwrap();
            hint::black_box(values);
        });
    });

    group.finish();
}
