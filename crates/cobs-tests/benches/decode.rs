use cobs_decoder::{Decoder, decode, decode_frames};
use cobs_encoder::encode;
use cobs_wire::CobsConfig;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

fn payload(len: usize, spacing: usize) -> Vec<u8> {
    (0..len)
        .map(|i| if i % spacing == 0 { 0x00 } else { (i % 251) as u8 | 1 })
        .collect()
}

fn bench_decode_small(c: &mut Criterion) {
    let config = CobsConfig::new();
    let wire = encode(b"12345\x006789", &config).unwrap();

    c.bench_function("decode_small", |b| {
        b.iter(|| decode(&wire, &config).unwrap());
    });
}

fn bench_decode_variants(c: &mut Criterion) {
    let data = payload(4096, 100);
    let mut group = c.benchmark_group("decode_variants");

    for (name, config) in [
        ("plain", CobsConfig::new()),
        ("reduced", CobsConfig::new().with_reduced(true)),
        ("sentinel_0a", CobsConfig::new().with_sentinel(0x0A)),
    ] {
        let wire = encode(&data, &config).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| decode(&wire, &config).unwrap());
        });
    }

    group.finish();
}

fn bench_decode_streaming(c: &mut Criterion) {
    let config = CobsConfig::new();
    let wire = encode(&payload(64 * 1024, 300), &config).unwrap();
    let mut out = Vec::with_capacity(wire.len());
    let mut group = c.benchmark_group("decode_streaming");
    group.throughput(Throughput::Bytes(wire.len() as u64));

    for chunk in [1, 64, 4096] {
        group.bench_with_input(BenchmarkId::new("chunk", chunk), &chunk, |b, &chunk| {
            b.iter(|| {
                out.clear();
                let mut decoder = Decoder::new(&mut out);
                for part in wire.chunks(chunk) {
                    decoder.write(part).unwrap();
                }
                decoder.close().unwrap();
            });
        });
    }

    group.finish();
}

fn bench_decode_frames(c: &mut Criterion) {
    let config = CobsConfig::new().with_sentinel_on_close(true);
    let mut stream = Vec::new();
    for i in 0..256 {
        stream.extend(encode(&payload(64 + i, 17), &config).unwrap());
    }

    let mut group = c.benchmark_group("decode_frames");
    group.throughput(Throughput::Bytes(stream.len() as u64));
    group.bench_function("256_frames", |b| {
        b.iter(|| decode_frames(&stream, &config).unwrap());
    });
    group.finish();
}

fn bench_decode_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_throughput");
    let config = CobsConfig::new();

    for size_kb in [1, 10, 100] {
        let wire = encode(&payload(size_kb * 1024, 1000), &config).unwrap();
        group.throughput(Throughput::Bytes(wire.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("decode", format!("{size_kb}kb")),
            &wire,
            |b, w| b.iter(|| decode(w, &config).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_decode_small,
    bench_decode_variants,
    bench_decode_streaming,
    bench_decode_frames,
    bench_decode_throughput
);
criterion_main!(benches);
