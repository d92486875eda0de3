use criterion::{criterion_group, criterion_main, Criterion};

use vbpp::algo::Algorithm;
use vbpp::descriptor;
use vbpp::instance::Instance;

fn synthetic_instance(n: usize) -> Instance {
    let sizes: Vec<Vec<u64>> = (0..n).map(|i| vec![1 + (i as u64 * 37) % 9, 1 + (i as u64 * 53) % 7]).collect();
    Instance::new("bench", vec![10, 10], sizes)
}

fn bench_ff(c: &mut Criterion) {
    let inst = synthetic_instance(500);
    c.bench_function("FF/500", |b| {
        b.iter(|| {
            let mut algo = descriptor::parse_and_build("FF", &inst).unwrap();
            algo.solve_single(0).unwrap()
        })
    });
}

fn bench_bfd_t1(c: &mut Criterion) {
    let inst = synthetic_instance(500);
    c.bench_function("BFD-T1-L1-Average/500", |b| {
        b.iter(|| {
            let mut algo = descriptor::parse_and_build("BFD-T1-L1-Average", &inst).unwrap();
            algo.solve_single(0).unwrap()
        })
    });
}

fn bench_pairing_bs(c: &mut Criterion) {
    let inst = synthetic_instance(60);
    c.bench_function("Pairing-BS-DP1-Unit/60", |b| {
        b.iter(|| {
            let mut algo = descriptor::parse_and_build("Pairing-BS-DP1-Unit", &inst).unwrap();
            algo.solve_multi(1, 40).unwrap()
        })
    });
}

criterion_group!(benches, bench_ff, bench_bfd_t1, bench_pairing_bs);
criterion_main!(benches);
