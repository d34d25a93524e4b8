use criterion::{Criterion, criterion_group, criterion_main};
use incident_intel::embeddings::chunking::{Chunker, ChunkingConfig, chunk_content};
use std::hint::black_box;

fn sample_report() -> String {
    let paragraph = "At 02:14 UTC the primary database lost quorum. Failover \
                     stalled while replicas replayed WAL, and checkout errors \
                     climbed to 38% before traffic was drained. Ünïcödé names \
                     in customer records slowed the replay further. ";
    paragraph.repeat(2_000)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let report = sample_report();
    let config = ChunkingConfig::default();
    let chunker = Chunker::from_config(&config);

    c.bench_function("chunk_iterator", |b| {
        b.iter(|| chunker.chunks(black_box(&report)).count())
    });
    c.bench_function("chunk_content", |b| {
        b.iter(|| chunk_content(black_box(&report), black_box(&config)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
