//! Stack operation benchmarks
//!
//! Measures push throughput under each growth policy, steady-state
//! push/pop cycling, duplication, and drain performance, with `Vec` as
//! the baseline where a comparison is meaningful.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use pushdown::{GrowthPolicy, Stack};
use std::hint::black_box;

/// Benchmark pushing into an empty stack, growth included
fn bench_push_from_empty(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_from_empty");
    group.throughput(Throughput::Elements(1024));

    group.bench_function("doubling_1024", |b| {
        b.iter(|| {
            let mut stack = Stack::new();
            for value in 0..1024_u64 {
                stack.push(value).unwrap();
            }
            black_box(stack);
        });
    });

    group.bench_function("fixed_32_1024", |b| {
        b.iter(|| {
            let mut stack = Stack::with_policy(GrowthPolicy::fixed(32));
            for value in 0..1024_u64 {
                stack.push(value).unwrap();
            }
            black_box(stack);
        });
    });

    group.bench_function("preallocated_1024", |b| {
        b.iter(|| {
            let mut stack = Stack::with_capacity(1024).unwrap();
            for value in 0..1024_u64 {
                stack.push(value).unwrap();
            }
            black_box(stack);
        });
    });

    // Vec as the reference point
    group.bench_function("vec_baseline_1024", |b| {
        b.iter(|| {
            let mut vec = Vec::new();
            for value in 0..1024_u64 {
                vec.push(value);
            }
            black_box(vec);
        });
    });

    group.finish();
}

/// Benchmark steady-state cycling with no growth
fn bench_push_pop_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_pop_cycle");
    group.throughput(Throughput::Elements(100));

    group.bench_function("stack_100", |b| {
        let mut stack = Stack::with_capacity(128).unwrap();

        b.iter(|| {
            for value in 0..100_u64 {
                stack.push(value).unwrap();
            }
            for _ in 0..100 {
                black_box(stack.pop().unwrap());
            }
        });
    });

    group.bench_function("vec_100", |b| {
        let mut vec: Vec<u64> = Vec::with_capacity(128);

        b.iter(|| {
            for value in 0..100_u64 {
                vec.push(value);
            }
            for _ in 0..100 {
                black_box(vec.pop().unwrap());
            }
        });
    });

    group.finish();
}

/// Benchmark deep copies at different sizes
fn bench_clone(c: &mut Criterion) {
    let mut group = c.benchmark_group("clone");

    for size in [64_usize, 1024, 16384] {
        group.bench_with_input(BenchmarkId::new("stack", size), &size, |b, &size| {
            let mut stack = Stack::new();
            for value in 0..size as u64 {
                stack.push(value).unwrap();
            }

            b.iter(|| black_box(stack.try_clone().unwrap()));
        });
    }

    group.finish();
}

/// Benchmark reading the whole stack
fn bench_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("iteration");
    group.throughput(Throughput::Elements(4096));

    group.bench_function("borrow_sum_4096", |b| {
        let mut stack = Stack::new();
        for value in 0..4096_u64 {
            stack.push(value).unwrap();
        }

        b.iter(|| black_box(stack.iter().sum::<u64>()));
    });

    group.bench_function("drain_sum_4096", |b| {
        b.iter(|| {
            let mut stack = Stack::new();
            for value in 0..4096_u64 {
                stack.push(value).unwrap();
            }
            black_box(stack.into_iter().sum::<u64>())
        });
    });

    group.finish();
}

/// Benchmark growth cost as capacity scales
fn bench_growth_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("growth_scaling");
    group.sample_size(50);

    for size in [256_usize, 4096, 65536] {
        group.bench_with_input(
            BenchmarkId::new("doubling", size),
            &size,
            |b, &size| {
                b.iter(|| {
                    let mut stack = Stack::new();
                    for value in 0..size as u64 {
                        stack.push(value).unwrap();
                    }
                    black_box(stack.capacity())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_push_from_empty,
    bench_push_pop_cycle,
    bench_clone,
    bench_iteration,
    bench_growth_scaling
);

criterion_main!(benches);
