use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spirv_embed::{decode_words, generate, render_header, ShaderBinary};
use std::hint::black_box;

use benchmark_utils::*;

/// Benchmark: byte -> word decoding
fn bench_decode_words(c: &mut Criterion) {
    let mut group = c.benchmark_group("Word Decoding");

    // Typical shaders run from a few KiB to a few hundred KiB
    for size in [1_024, 16_384, 262_144].iter() {
        let bytes = generate_shader_bytes(*size);

        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{size}_bytes")),
            size,
            |b, _| b.iter(|| decode_words(black_box(bytes.as_slice()))),
        );
    }

    group.finish();
}

/// Benchmark: rendering a header in memory
fn bench_render_header(c: &mut Criterion) {
    let mut group = c.benchmark_group("Header Rendering");

    for size in [1_024, 16_384, 262_144].iter() {
        let shader = ShaderBinary::new("shader.comp.spv", generate_shader_bytes(*size)).unwrap();
        let shaders = vec![shader];

        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{size}_bytes")),
            size,
            |b, _| b.iter(|| render_header(black_box(shaders.as_slice())).unwrap()),
        );
    }

    group.finish();
}

/// Benchmark: full file-to-file generation
fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("End-to-End Generation");
    group.sample_size(20);

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("shader_spirv.h");

    for count in [1, 8, 32].iter() {
        let shader_dir = dir.path().join(format!("shaders_{count}"));
        std::fs::create_dir(&shader_dir).unwrap();
        let inputs = save_shaders_to_dir(&shader_dir, *count, 16_384).unwrap();

        group.throughput(Throughput::Bytes((*count * 16_384) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{count}_shaders")),
            count,
            |b, _| {
                b.iter(|| generate(black_box(output.as_path()), black_box(inputs.as_slice())).unwrap())
            },
        );
    }

    group.finish();
}

// Configure benchmark groups
criterion_group!(
    benches,
    bench_decode_words,
    bench_render_header,
    bench_generate,
);

criterion_main!(benches);
