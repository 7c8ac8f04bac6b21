use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ntriplink_proto::constants::RING_BUFFER_BYTES;
use ntriplink_proto::RingBuffer;

fn bench_write_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring");

    for chunk_len in [64usize, 512, 1024] {
        let data = vec![0xD3u8; chunk_len];
        group.bench_with_input(
            BenchmarkId::new("write_drain_cycle", chunk_len),
            &data,
            |b, data| {
                let mut ring = RingBuffer::new(RING_BUFFER_BYTES);
                b.iter(|| {
                    ring.write(data);
                    while let Some(chunk) = ring.peek_chunk(256) {
                        let taken = chunk.len();
                        ring.consume(taken);
                    }
                });
            },
        );
    }

    group.bench_function("write_full_buffer", |b| {
        let data = vec![0xD3u8; RING_BUFFER_BYTES];
        b.iter(|| {
            let mut ring = RingBuffer::new(RING_BUFFER_BYTES);
            ring.write(&data)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_write_drain);
criterion_main!(benches);
