//! Criterion benchmarks for the five-stage decompressor pipeline.
//!
//! Run with:
//!   cargo bench --bench pipeline
//!
//! Compression is a non-goal of this crate, so the benchmark never depends
//! on an external encoder or corpus: each chunk is a hand-built raw-Snappy
//! stream (a literal seed followed by chained offset-1 medium-copy elements)
//! sized to exactly the requested chunk length, the same "always works
//! without external corpus" approach the LZ4 benchmarks use for synthetic
//! data.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use snzpipe::decompress_chunk;

fn encode_varint(mut value: u64) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            out.push(byte | 0x80);
        } else {
            out.push(byte);
            break;
        }
    }
    out
}

/// Builds a raw-Snappy chunk that decompresses to exactly `total` bytes: a
/// literal seed (up to 32 bytes) followed by a chain of maximal offset-1
/// medium-copy elements (the RLE acceleration path) filling the remainder.
fn synthetic_chunk(total: usize) -> Vec<u8> {
    assert!(total >= 1);
    let seed_len = total.min(32);

    let mut body = Vec::new();
    body.push(((seed_len - 1) as u8) << 2); // direct literal header, t = seed_len - 1
    for i in 0..seed_len {
        body.push(b'A' + (i % 26) as u8);
    }

    let mut produced = seed_len;
    while produced < total {
        let take = (total - produced).min(64);
        let diminished = (take - 1) as u8;
        body.push((diminished << 2) | 0b10); // medium copy
        body.push(1); // offset low byte: offset = 1 (RLE)
        body.push(0); // offset high byte
        produced += take;
    }

    let mut compressed = encode_varint(total as u64);
    compressed.extend_from_slice(&body);
    compressed
}

fn bench_pipeline_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_decompress");

    for &size in &[4_096usize, 65_536, 262_144] {
        let chunk = synthetic_chunk(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("decompress_chunk", size), &chunk, |b, chunk| {
            b.iter(|| decompress_chunk(chunk).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline_decompress);
criterion_main!(benches);
