//! Run with:
//! ```bash
//! cargo bench --bench sparse_matrix_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use seq_align_core::cluster::sparse_matrix::{SparseEdge, SparseMatrixStream};
use rand::{rngs::StdRng, Rng, SeedableRng};

const SEED: u64 = 0xDEAD_BEEF_CAFE_BABE;

fn random_edges(rng: &mut StdRng, n: usize, count: usize) -> Vec<SparseEdge> {
    (0..count)
        .map(|_| SparseEdge { row: rng.gen_range(0..n as u32), col: rng.gen_range(0..n as u32), value: rng.gen::<f64>() })
        .collect()
}

/// Measures in-memory edge insertion (max-merge + disjoint-set bookkeeping)
/// without ever crossing the spill threshold.
fn bench_insert(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(SEED);
    let n = 20_000;

    let mut group = c.benchmark_group("sparse_matrix_insert");
    for edge_count in [1_000usize, 10_000, 50_000] {
        let edges = random_edges(&mut rng, n, edge_count);
        group.throughput(Throughput::Elements(edge_count as u64));
        group.bench_with_input(BenchmarkId::new("edges", edge_count), &edges, |b, edges| {
            b.iter(|| {
                let mut sms = SparseMatrixStream::new(n, None).unwrap();
                for &e in edges {
                    sms.insert(black_box(e)).unwrap();
                }
                black_box(sms.num_edges())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert);
criterion_main!(benches);
