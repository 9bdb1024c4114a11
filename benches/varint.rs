use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use prowire::varint::Varint;

fn encode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("varint/encode");

    for (name, value) in [
        ("1-byte", 42u64),
        ("5-byte", u64::from(u32::MAX)),
        ("10-byte", u64::MAX),
    ] {
        group.bench_function(name, |b| {
            b.iter_batched_ref(
                || Vec::with_capacity(16),
                |buf| value.encode_varint(buf),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn decode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("varint/decode");

    for (name, value) in [
        ("1-byte", 42u64),
        ("5-byte", u64::from(u32::MAX)),
        ("10-byte", u64::MAX),
    ] {
        let mut encoded = Vec::new();
        value.encode_varint(&mut encoded);

        group.bench_function(name, |b| {
            b.iter(|| {
                let mut slice = std::hint::black_box(&encoded[..]);
                u64::decode_varint(&mut slice).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, encode_benchmark, decode_benchmark);
criterion_main!(benches);
