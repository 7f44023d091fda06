//! Criterion benchmarks for the unfolding engine on rings and products of cycles.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use pn_unfold::config::UnfoldConfig;
use pn_unfold::net::Net;
use pn_unfold::unfold::Unfolder;

/// One token circulating through `n` places.
fn ring(n: usize) -> Net {
    let mut matrix = vec![vec![0; n]; n];
    for t in 0..n {
        matrix[t][t] = -1;
        matrix[(t + 1) % n][t] = 1;
    }
    let mut marking = vec![0; n];
    marking[0] = 1;
    Net::new(matrix, marking).unwrap()
}

/// `k` independent two-place cycles, 2^k reachable markings.
fn product_of_cycles(k: usize) -> Net {
    let mut matrix = vec![vec![0; 2 * k]; 2 * k];
    let mut marking = vec![0; 2 * k];
    for i in 0..k {
        let (a, b) = (2 * i, 2 * i + 1);
        matrix[a][a] = -1;
        matrix[b][a] = 1;
        matrix[b][b] = -1;
        matrix[a][b] = 1;
        marking[a] = 1;
    }
    Net::new(matrix, marking).unwrap()
}

fn bench_ring(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring");
    for n in [8, 64, 256] {
        let net = ring(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &net, |b, net| {
            b.iter(|| Unfolder::new(black_box(net), UnfoldConfig::default()).run())
        });
    }
    group.finish();
}

fn bench_product(c: &mut Criterion) {
    let mut group = c.benchmark_group("product_of_cycles");
    for k in [2, 4, 6] {
        let net = product_of_cycles(k);
        group.bench_with_input(BenchmarkId::from_parameter(k), &net, |b, net| {
            b.iter(|| Unfolder::new(black_box(net), UnfoldConfig::default()).run())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ring, bench_product);
criterion_main!(benches);
