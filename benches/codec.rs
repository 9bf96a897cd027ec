//! 코덱 벤치마크

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use swlink::{crc16, stuff, BitBuffer, FrameTable};

fn bench_codec(c: &mut Criterion) {
    let payload: Vec<bool> = (0..100).map(|i| i % 3 != 0).collect();
    c.bench_function("crc16_100_bits", |b| b.iter(|| crc16(black_box(&payload))));

    let mut frame = vec![false, true, true, true, true, true, true, false];
    frame.extend((0..148).map(|i| i % 7 != 0));
    frame.extend([false, true, true, true, true, true, true, false]);
    c.bench_function("stuff_data_frame", |b| b.iter(|| stuff(black_box(&frame))));

    let source = BitBuffer::from_bytes(&vec![0x5Au8; 64 * 1024]);
    c.bench_function("frame_table_64k", |b| {
        b.iter(|| FrameTable::build(black_box(&source)))
    });
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
