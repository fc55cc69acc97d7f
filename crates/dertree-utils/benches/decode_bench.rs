//! DER decoding benchmarks.
//!
//! Run with: cargo bench -p dertree-utils

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use dertree_utils::asn1::decode;

/// SEQUENCE of `count` SEQUENCE { OID 2.5.4.3, UTF8String "example.com" }.
fn flat_sequence(count: usize) -> Vec<u8> {
    let item: &[u8] = &[
        0x30, 0x12, 0x06, 0x03, 0x55, 0x04, 0x03, 0x0C, 0x0B, b'e', b'x', b'a', b'm', b'p',
        b'l', b'e', b'.', b'c', b'o', b'm',
    ];
    let body: Vec<u8> = item.repeat(count);
    let len = body.len() as u32;
    let mut der = vec![0x30, 0x84];
    der.extend_from_slice(&len.to_be_bytes());
    der.extend_from_slice(&body);
    der
}

/// `depth` nested SEQUENCEs around an INTEGER.
fn deep_nesting(depth: usize) -> Vec<u8> {
    let mut der = vec![0x02, 0x01, 0x2A];
    for _ in 0..depth {
        let len = der.len() as u32;
        let mut outer = vec![0x30, 0x84];
        outer.extend_from_slice(&len.to_be_bytes());
        outer.extend_from_slice(&der);
        der = outer;
    }
    der
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("asn1_decode");

    for count in [16, 256, 4096] {
        let der = flat_sequence(count);
        group.bench_with_input(BenchmarkId::new("flat", count), &der, |bench, der| {
            bench.iter(|| decode(std::hint::black_box(der)));
        });
    }

    for depth in [8, 32, 63] {
        let der = deep_nesting(depth);
        group.bench_with_input(BenchmarkId::new("nested", depth), &der, |bench, der| {
            bench.iter(|| decode(std::hint::black_box(der)));
        });
    }

    group.finish();
}

fn bench_find_oid(c: &mut Criterion) {
    let tree = match decode(&flat_sequence(4096)) {
        Ok(tree) => tree,
        Err(e) => panic!("bench input must decode: {e}"),
    };
    c.bench_function("find_oid_miss", |bench| {
        bench.iter(|| tree.find_oid(std::hint::black_box("2.5.4.6")));
    });
}

criterion_group!(benches, bench_decode, bench_find_oid);
criterion_main!(benches);
