use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::num::NonZeroUsize;
use streamscan::config::CHUNK_SIZE;
use streamscan::keyword::Keyword;
use streamscan::search::{search_reader, LaneConfig, ScanDispatcher};
use streamscan::{search, ScanConfig};
use tempfile::tempdir;

fn create_haystack(len: usize) -> Vec<u8> {
    let mut data: Vec<u8> = b"Line TODO: fix bug FIXME: optimize NOTE: important task\n"
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect();
    // A handful of real hits
    for at in (0..len.saturating_sub(16)).step_by(len / 8 + 1) {
        data[at..at + 8].copy_from_slice(b"KEYWORD!");
    }
    data
}

fn bench_dispatcher_lanes(c: &mut Criterion) {
    let window = create_haystack(CHUNK_SIZE);
    let keyword = Keyword::new(*b"KEYWORD!", 255).unwrap();

    let mut group = c.benchmark_group("Dispatcher Lanes");
    group.throughput(Throughput::Bytes(window.len() as u64));
    for lanes in [1, 2, 4, 8] {
        let dispatcher = ScanDispatcher::new(LaneConfig {
            lanes: NonZeroUsize::new(lanes).unwrap(),
            batch_size: NonZeroUsize::new(256).unwrap(),
        })
        .unwrap();
        let mut results = Vec::new();

        group.bench_function(format!("lanes_{}", lanes), |b| {
            b.iter(|| {
                dispatcher
                    .scan_into(black_box(&window), &keyword, &mut results)
                    .unwrap();
            });
        });
    }
    group.finish();
}

fn bench_batch_size(c: &mut Criterion) {
    let window = create_haystack(CHUNK_SIZE);
    let keyword = Keyword::new(*b"KEYWORD!", 255).unwrap();

    let mut group = c.benchmark_group("Batch Size");
    for batch in [32, 256, 4096] {
        let dispatcher = ScanDispatcher::new(LaneConfig {
            lanes: NonZeroUsize::new(num_cpus::get()).unwrap(),
            batch_size: NonZeroUsize::new(batch).unwrap(),
        })
        .unwrap();

        group.bench_function(format!("dense_{}", batch), |b| {
            b.iter(|| black_box(dispatcher.scan(&window, &keyword).unwrap()));
        });
        group.bench_function(format!("sparse_{}", batch), |b| {
            b.iter(|| black_box(dispatcher.find_offsets(&window, &keyword).unwrap()));
        });
    }
    group.finish();
}

fn bench_chunk_size(c: &mut Criterion) {
    let data = create_haystack(CHUNK_SIZE * 4);

    let mut group = c.benchmark_group("Chunk Size");
    group.throughput(Throughput::Bytes(data.len() as u64));
    for chunk in [64 * 1024, 256 * 1024, CHUNK_SIZE] {
        let mut config = ScanConfig::new("KEYWORD!", "");
        config.chunk_size = NonZeroUsize::new(chunk).unwrap();

        group.bench_function(format!("chunk_{}", chunk), |b| {
            b.iter(|| {
                let mut offsets: Vec<u64> = Vec::new();
                black_box(search_reader(&data[..], &config, &mut offsets).unwrap());
            });
        });
    }
    group.finish();
}

fn bench_file_search(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("haystack.txt");
    std::fs::write(&path, create_haystack(CHUNK_SIZE * 8)).unwrap();
    let config = ScanConfig::new("KEYWORD!", &path);

    c.bench_function("file_search_8mib", |b| {
        b.iter(|| {
            let mut offsets: Vec<u64> = Vec::new();
            black_box(search(&config, &mut offsets).unwrap());
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = bench_dispatcher_lanes, bench_batch_size, bench_chunk_size, bench_file_search
}

criterion_main!(benches);
