use cachekit::{CacheEngine, CommonCacheParams, LeverEngine, Request, ShiftEngine, ShiftSieveEngine};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CAPACITY_BYTES: u64 = 8192;
const OBJECT_SIZE: u64 = 1;
const KEY_SPACE: u64 = 4096;

fn zipf_like_trace(n: usize, seed: u64) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            // Heavily weight the bottom of the key space to produce a
            // working-set skew representative of a real access trace.
            let u: f64 = rng.gen();
            (u * u * KEY_SPACE as f64) as u64
        })
        .collect()
}

fn bench_get_sequence(c: &mut Criterion) {
    let trace = zipf_like_trace(20_000, 42);
    let mut group = c.benchmark_group("get_sequence");

    group.bench_function(BenchmarkId::new("engine", "Lever"), |b| {
        b.iter(|| {
            let mut engine = LeverEngine::new(&CommonCacheParams::new(CAPACITY_BYTES));
            for &obj_id in &trace {
                engine.get(&Request::new(obj_id, OBJECT_SIZE));
            }
        })
    });

    group.bench_function(BenchmarkId::new("engine", "Shift"), |b| {
        b.iter(|| {
            let mut engine = ShiftEngine::new(&CommonCacheParams::new(CAPACITY_BYTES));
            for &obj_id in &trace {
                engine.get(&Request::new(obj_id, OBJECT_SIZE));
            }
        })
    });

    group.bench_function(BenchmarkId::new("engine", "ShiftSieve"), |b| {
        b.iter(|| {
            let mut engine = ShiftSieveEngine::new(&CommonCacheParams::new(CAPACITY_BYTES));
            for &obj_id in &trace {
                engine.get(&Request::new(obj_id, OBJECT_SIZE));
            }
        })
    });

    group.finish();
}

fn bench_fill_then_evict(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_then_evict");

    group.bench_function(BenchmarkId::new("engine", "Lever"), |b| {
        b.iter(|| {
            let mut engine = LeverEngine::new(&CommonCacheParams::new(CAPACITY_BYTES));
            for obj_id in 0..CAPACITY_BYTES * 2 {
                engine.get(&Request::new(obj_id, OBJECT_SIZE));
            }
        })
    });

    group.bench_function(BenchmarkId::new("engine", "ShiftSieve"), |b| {
        b.iter(|| {
            let mut engine = ShiftSieveEngine::new(&CommonCacheParams::new(CAPACITY_BYTES));
            for obj_id in 0..CAPACITY_BYTES * 2 {
                engine.get(&Request::new(obj_id, OBJECT_SIZE));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_get_sequence, bench_fill_then_evict);
criterion_main!(benches);
