/// Throughput benchmarks for the overwrite engine
///
/// Measures end-to-end shred throughput per method and chunk size on
/// temporary files.
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use sayonara_shred::{IOMode, Method, OverwriteEngine, Pass, ShredConfig};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const FILE_SIZE: usize = 4 * 1024 * 1024;

// Helper to create a fresh target file inside `dir`
fn create_target(dir: &TempDir, size: usize) -> PathBuf {
    let path = dir.path().join(format!("target-{}", next_suffix()));
    fs::write(&path, vec![0xAB; size]).expect("create target");
    path
}

fn next_suffix() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static NEXT: AtomicU64 = AtomicU64::new(0);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

// Benchmark each method end to end
fn bench_methods(c: &mut Criterion) {
    let mut group = c.benchmark_group("shred_methods");
    group.sample_size(10);
    let dir = TempDir::new().unwrap();

    for method in Method::ALL {
        let config = ShredConfig {
            io_mode: IOMode::FlushPerPass,
            ..ShredConfig::for_method(method)
        };
        let engine = OverwriteEngine::new(&config).unwrap();
        let passes = engine.plan().total_passes() as u64;

        group.throughput(Throughput::Bytes(FILE_SIZE as u64 * passes));
        group.bench_with_input(BenchmarkId::from_parameter(method), &engine, |b, engine| {
            b.iter_batched(
                || create_target(&dir, FILE_SIZE),
                |path| black_box(engine.securely_delete(&path)),
                BatchSize::PerIteration,
            );
        });
    }

    group.finish();
}

// Benchmark chunk sizes for a single zero pass
fn bench_chunk_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("zero_fill_chunk_sizes");
    group.sample_size(10);
    let dir = TempDir::new().unwrap();

    let chunk_sizes = vec![
        ("64KB", 64 * 1024),
        ("1MB", 1024 * 1024),
        ("4MB", 4 * 1024 * 1024),
    ];

    for (name, chunk_size) in chunk_sizes {
        let config = ShredConfig {
            chunk_size,
            io_mode: IOMode::FlushPerPass,
            ..ShredConfig::for_method(Method::ZeroFill)
        };
        let engine = OverwriteEngine::new(&config).unwrap();

        group.throughput(Throughput::Bytes(FILE_SIZE as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &engine, |b, engine| {
            b.iter_batched(
                || create_target(&dir, FILE_SIZE),
                |path| black_box(engine.securely_delete(&path)),
                BatchSize::PerIteration,
            );
        });
    }

    group.finish();
}

// Pattern generation alone, without I/O
fn bench_pattern_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_generation");
    group.throughput(Throughput::Bytes(FILE_SIZE as u64));

    for pass in [Pass::Constant(0xFF), Pass::Random] {
        group.bench_with_input(BenchmarkId::from_parameter(pass), &pass, |b, pass| {
            let mut buffer = vec![0u8; FILE_SIZE];
            b.iter(|| {
                pass.source().fill(&mut buffer);
                black_box(&buffer);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_methods,
    bench_chunk_sizes,
    bench_pattern_generation
);
criterion_main!(benches);
