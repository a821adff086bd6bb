use cobs_encoder::{Encoder, encode};
use cobs_wire::{CobsConfig, max_encoded_len};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

/// Payload with a sentinel roughly every `spacing` bytes.
fn payload(len: usize, spacing: usize) -> Vec<u8> {
    (0..len)
        .map(|i| if i % spacing == 0 { 0x00 } else { (i % 251) as u8 | 1 })
        .collect()
}

fn bench_encode_small(c: &mut Criterion) {
    let config = CobsConfig::new();

    c.bench_function("encode_small", |b| {
        b.iter(|| encode(b"12345\x006789", &config).unwrap());
    });
}

fn bench_encode_variants(c: &mut Criterion) {
    let data = payload(4096, 100);
    let mut group = c.benchmark_group("encode_variants");

    for (name, config) in [
        ("plain", CobsConfig::new()),
        ("reduced", CobsConfig::new().with_reduced(true)),
        ("sentinel_0a", CobsConfig::new().with_sentinel(0x0A)),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| encode(&data, &config).unwrap());
        });
    }

    group.finish();
}

fn bench_encode_streaming(c: &mut Criterion) {
    let data = payload(64 * 1024, 300);
    let mut wire = Vec::with_capacity(max_encoded_len(data.len()));
    let mut group = c.benchmark_group("encode_streaming");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for chunk in [1, 64, 4096] {
        group.bench_with_input(BenchmarkId::new("chunk", chunk), &chunk, |b, &chunk| {
            b.iter(|| {
                wire.clear();
                let mut encoder = Encoder::new(&mut wire);
                for part in data.chunks(chunk) {
                    encoder.write(part).unwrap();
                }
                encoder.close().unwrap();
            });
        });
    }

    group.finish();
}

fn bench_encode_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_throughput");
    let config = CobsConfig::new();

    for size_kb in [1, 10, 100] {
        // "dense" flushes a group every other byte.
        for (shape, spacing) in [("sparse", 1000), ("dense", 2)] {
            let data = payload(size_kb * 1024, spacing);
            group.throughput(Throughput::Bytes(data.len() as u64));
            group.bench_with_input(
                BenchmarkId::new(shape, format!("{size_kb}kb")),
                &data,
                |b, d| b.iter(|| encode(d, &config).unwrap()),
            );
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_encode_small,
    bench_encode_variants,
    bench_encode_streaming,
    bench_encode_throughput
);
criterion_main!(benches);
