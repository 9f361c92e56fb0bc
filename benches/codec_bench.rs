//! Benchmarks for txlink frame encode/decode

use bytes::BytesMut;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use txlink::protocol::{FrameDecoder, Message, RequestHeader, TransactionType};

fn sample_frame(payload_len: usize) -> Vec<u8> {
    let header = RequestHeader::new(
        "CLI001",
        "SERVER",
        TransactionType::Business,
        "QUERY",
        "00000000000000000001",
    );
    Message::request(header, vec![0x55u8; payload_len]).to_bytes()
}

fn codec_benchmarks(c: &mut Criterion) {
    let small = sample_frame(64);
    let large = sample_frame(64 * 1024);
    let decoder = FrameDecoder::default();

    c.bench_function("encode_request_64b", |b| {
        let header = RequestHeader::new(
            "CLI001",
            "SERVER",
            TransactionType::Business,
            "QUERY",
            "00000000000000000001",
        );
        let message = Message::request(header, vec![0x55u8; 64]);
        b.iter(|| black_box(message.to_bytes()));
    });

    c.bench_function("decode_request_64b", |b| {
        b.iter(|| {
            let mut buf = BytesMut::from(&small[..]);
            black_box(decoder.decode(&mut buf).unwrap())
        });
    });

    c.bench_function("decode_request_64k", |b| {
        b.iter(|| {
            let mut buf = BytesMut::from(&large[..]);
            black_box(decoder.decode(&mut buf).unwrap())
        });
    });
}

criterion_group!(benches, codec_benchmarks);
criterion_main!(benches);
