//! Criterion benchmarks for the compression and decompression core.
//!
//! Run with:
//!   cargo bench --bench throughput

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use trajc::codec::CodecKind;
use trajc::core::{ChunkHeader, Compressor, CoreConfig, Decompressor};

fn synthetic_frames(num_traj: usize, num_frames: u64) -> Vec<Vec<f64>> {
    (0..num_frames)
        .map(|i| {
            (0..num_traj)
                .map(|j| (((i * num_traj as u64 + j as u64) as f64) / 3724.0).cos())
                .collect()
        })
        .collect()
}

fn compress_to_chunks(config: &CoreConfig, frames: &[Vec<f64>]) -> Vec<(ChunkHeader, Vec<u8>)> {
    let mut chunks = Vec::new();
    let sink = |header: ChunkHeader, payload: &[u8]| -> trajc::error::Result<()> {
        chunks.push((header, payload.to_vec()));
        Ok(())
    };
    let mut compressor = Compressor::new(config, sink).unwrap();
    for frame in frames {
        compressor.add_frame(frame).unwrap();
    }
    compressor.finish().unwrap();
    chunks
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress");

    for &num_traj in &[8usize, 64] {
        let frames = synthetic_frames(num_traj, 4096);
        let config =
            CoreConfig { num_traj: num_traj as u16, bound: 2.0, error: 1e-3, qp_ratio: 0.5, chunk_size: 1024, codec: CodecKind::Varint };

        group.throughput(Throughput::Elements((frames.len() * num_traj) as u64));
        group.bench_with_input(BenchmarkId::new("varint", num_traj), &frames, |b, frames| {
            b.iter(|| compress_to_chunks(&config, frames));
        });
    }

    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompress");

    for &num_traj in &[8usize, 64] {
        let frames = synthetic_frames(num_traj, 4096);
        let config =
            CoreConfig { num_traj: num_traj as u16, bound: 2.0, error: 1e-3, qp_ratio: 0.5, chunk_size: 1024, codec: CodecKind::Varint };
        let chunks = compress_to_chunks(&config, &frames);

        group.throughput(Throughput::Elements((frames.len() * num_traj) as u64));
        group.bench_with_input(BenchmarkId::new("varint", num_traj), &chunks, |b, chunks| {
            b.iter(|| {
                let mut idx = 0usize;
                let source = |buf: &mut Vec<u8>| -> trajc::error::Result<ChunkHeader> {
                    let (header, payload) = &chunks[idx];
                    buf.clear();
                    buf.extend_from_slice(payload);
                    idx += 1;
                    Ok(*header)
                };
                let mut decompressor = Decompressor::new(&config, source).unwrap();
                let mut out = vec![0.0; num_traj];
                while decompressor.read_frame(&mut out).unwrap() {}
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress);
criterion_main!(benches);
