use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use nalgebra::DMatrix;
use ns_prob::{
    DistributionExt, Gamma, Kumaraswamy, LejaConfig, Normal, SampleConfig, SamplingRule, Uniform,
    leja_quadrature,
};
use std::hint::black_box;

fn grid(n: usize) -> DMatrix<f64> {
    DMatrix::from_fn(1, n, |_, j| (j as f64 + 0.5) / n as f64)
}

fn bench_inverse(c: &mut Criterion) {
    let q = grid(10_000);
    let normal = Normal::new(0.0, 1.3).unwrap();
    let gamma = Gamma::new(2.5, 1.0).unwrap();
    let kumaraswamy = Kumaraswamy::new(2.0, 3.0).unwrap();

    c.bench_function("normal_inv_analytical_10k", |b| b.iter(|| black_box(normal.inv(&q).unwrap())));
    c.bench_function("gamma_inv_newton_10k", |b| b.iter(|| black_box(gamma.inv(&q).unwrap())));
    c.bench_function("kumaraswamy_inv_fallback_10k", |b| {
        b.iter(|| black_box(kumaraswamy.inv(&q).unwrap()))
    });
}

fn bench_leja(c: &mut Criterion) {
    let mut group = c.benchmark_group("leja_quadrature");
    let uniform = Uniform::standard();
    let normal = Normal::standard();
    let cfg = LejaConfig::default();

    for order in [4usize, 8, 16] {
        group.bench_with_input(BenchmarkId::new("uniform", order), &order, |b, &o| {
            b.iter(|| black_box(leja_quadrature(&[o], &uniform, &cfg).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("normal", order), &order, |b, &o| {
            b.iter(|| black_box(leja_quadrature(&[o], &normal, &cfg).unwrap()))
        });
    }

    group.finish();
}

fn bench_sampling(c: &mut Criterion) {
    let normal = Normal::standard();
    for rule in [SamplingRule::Random, SamplingRule::Halton, SamplingRule::LatinHypercube] {
        let cfg = SampleConfig { rule, seed: Some(7), ..SampleConfig::default() };
        c.bench_function(&format!("normal_sample_{}_10k", rule), |b| {
            b.iter(|| black_box(normal.sample_with(10_000, &cfg).unwrap()))
        });
    }
}

criterion_group!(benches, bench_inverse, bench_leja, bench_sampling);
criterion_main!(benches);
