//! Benchmarks of normalize across every available backend

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use xp_harness::{available_backends, normalize, Registry};

/// Generate test data with specific patterns
fn generate_test_data(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| (i as f64 * 0.1).sin() * 100.0)
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    let registry = match Registry::detect() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("no backends: {e}");
            return;
        }
    };

    for size in [64, 4096, 262_144] {
        let data = generate_test_data(size);

        for param in available_backends(&registry) {
            let Ok(param) = param else { continue };
            let xp = &param.namespace;
            let Ok(x) = xp.asarray(&data, param.device, xp.default_dtype()) else {
                continue;
            };

            group.bench_with_input(BenchmarkId::new(param.name.clone(), size), &x, |b, x| {
                b.iter(|| black_box(normalize(x)))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
