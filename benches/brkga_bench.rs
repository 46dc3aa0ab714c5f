//! Criterion benchmarks for the BRKGA engine.
//!
//! Uses synthetic decoders (OneMax, weighted sum) to measure pure engine
//! overhead independent of any domain.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_brkga::brkga::{Brkga, BrkgaConfig, BrkgaRunner, DecodeError, Decoder};

// ===========================================================================
// OneMax: maximize number of keys above 0.5 (minimize -count)
// ===========================================================================

struct OneMaxDecoder;

impl Decoder for OneMaxDecoder {
    fn decode(&self, keys: &[f64]) -> Result<f64, DecodeError> {
        let ones = keys.iter().filter(|&&k| k > 0.5).count();
        Ok(-(ones as f64))
    }
}

// ===========================================================================
// Weighted sum with artificial per-call work, to make parallel decoding pay off
// ===========================================================================

struct HeavyDecoder {
    rounds: usize,
}

impl Decoder for HeavyDecoder {
    fn decode(&self, keys: &[f64]) -> Result<f64, DecodeError> {
        let mut acc = 0.0;
        for r in 0..self.rounds {
            for (i, k) in keys.iter().enumerate() {
                acc += ((i + r) as f64 * k).sin().abs();
            }
        }
        Ok(acc)
    }
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_brkga_onemax(c: &mut Criterion) {
    let mut group = c.benchmark_group("brkga_onemax");
    group.sample_size(10);

    for &n in &[20, 50, 100] {
        let config = BrkgaConfig::new(n)
            .with_population_size(100)
            .with_max_generations(50)
            .with_stagnation_limit(0)
            .with_seed(42);
        group.bench_with_input(BenchmarkId::from_parameter(n), &config, |b, c| {
            b.iter(|| {
                let result = BrkgaRunner::run(black_box(&OneMaxDecoder), black_box(c));
                black_box(result)
            })
        });
    }
    group.finish();
}

fn bench_parallel_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("brkga_parallel_decode");
    group.sample_size(10);

    for &workers in &[1, 2, 4] {
        let config = BrkgaConfig::new(50)
            .with_population_size(200)
            .with_max_workers(workers);
        let mut engine = Brkga::with_seed(&config, HeavyDecoder { rounds: 20 }, 42)
            .expect("valid benchmark config");
        group.bench_function(BenchmarkId::from_parameter(workers), |b| {
            b.iter(|| engine.evolve(black_box(1)))
        });
    }
    group.finish();
}

fn bench_exchange_elite(c: &mut Criterion) {
    let mut group = c.benchmark_group("brkga_exchange_elite");

    for &k in &[2, 4, 8] {
        let config = BrkgaConfig::new(50)
            .with_population_size(100)
            .with_num_populations(k);
        let mut engine =
            Brkga::with_seed(&config, OneMaxDecoder, 42).expect("valid benchmark config");
        group.bench_function(BenchmarkId::from_parameter(k), |b| {
            b.iter(|| engine.exchange_elite(black_box(2)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_brkga_onemax,
    bench_parallel_decode,
    bench_exchange_elite
);
criterion_main!(benches);
