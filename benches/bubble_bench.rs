// Bubble detection benchmarks
// Criterion suite covering graph construction and the parallel sweep

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use snp_forge::detect::DetectionOptions;
use snp_forge::utils::sequence_io::MemorySink;
use snp_forge::{Detector, KmerGraph};

const K: usize = 21;
const LOCUS_LEN: usize = 60;
const SNP_POS: usize = 30;

/// Deterministic synthetic SNP loci: one reference and one alternative
/// read per locus.
fn snp_loci(n: usize, seed: u64) -> Vec<Vec<u8>> {
    const NT: [u8; 4] = [b'A', b'C', b'G', b'T'];
    let mut state = seed;
    let mut next_base = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 33) & 3) as u8
    };
    let mut reads = Vec::with_capacity(2 * n);
    for _ in 0..n {
        let bases: Vec<u8> = (0..LOCUS_LEN).map(|_| next_base()).collect();
        let reference: Vec<u8> = bases.iter().map(|&b| NT[b as usize]).collect();
        let mut alternative = reference.clone();
        alternative[SNP_POS] = NT[((bases[SNP_POS] + 1) % 4) as usize];
        reads.push(reference);
        reads.push(alternative);
    }
    reads
}

fn bench_graph_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_construction");

    for locus_count in [100usize, 1_000].iter() {
        let reads = snp_loci(*locus_count, 42);
        group.throughput(Throughput::Elements(reads.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(locus_count),
            locus_count,
            |b, _| {
                b.iter(|| {
                    let graph = KmerGraph::from_reads(black_box(&reads), K, 1).unwrap();
                    black_box(graph.node_count());
                });
            },
        );
    }
    group.finish();
}

fn bench_bubble_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("bubble_sweep");
    group.sample_size(20);

    let reads = snp_loci(1_000, 42);
    let graph = KmerGraph::from_reads(&reads, K, 1).unwrap();

    for threads in [1usize, 4].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(threads), threads, |b, &threads| {
            b.iter(|| {
                let detector = Detector::new(&graph, DetectionOptions::default(), threads);
                let summary = detector.run(Box::new(MemorySink::new())).unwrap();
                black_box(summary.nb_bubbles);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_graph_construction, bench_bubble_sweep);
criterion_main!(benches);
