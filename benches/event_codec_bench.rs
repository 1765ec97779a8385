//! Benchmarks for the JSON-lines event and command codecs.
//!
//! The controller writes a `status` line every few seconds and one line per
//! detection, so these numbers mostly guard against regressions in the
//! serializer path.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench event_codec_bench
//! ```

use bytes::BytesMut;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use rollcall_core::{Location, Person, ReaderId, SystemMode};
use rollcall_protocol::{CommandCodec, Event, EventCodec};
use std::hint::black_box;
use tokio_util::codec::{Decoder, Encoder};

fn sample_events() -> Vec<Event> {
    let person = Person::new(42, "Ada Lovelace")
        .with_class("5B")
        .with_dorm("H-12")
        .with_contact("555-0101");
    vec![
        Event::Status {
            classroom: 120,
            hostel: 30,
            left: 4,
            sneaked: 1,
            mode: SystemMode::Class,
        },
        Event::student_info(&person, Location::Hostel),
        Event::ZoneChange {
            student: person.name.clone(),
            zone: ReaderId::Hostel,
        },
    ]
}

fn bench_encode_events(c: &mut Criterion) {
    let events = sample_events();
    let mut group = c.benchmark_group("encode_events");
    group.throughput(Throughput::Elements(events.len() as u64));

    group.bench_function("status_info_zone_change", |b| {
        let mut codec = EventCodec::new();
        let mut buffer = BytesMut::with_capacity(1024);
        b.iter(|| {
            buffer.clear();
            for event in &events {
                codec.encode(black_box(event.clone()), &mut buffer).unwrap();
            }
            black_box(&buffer);
        });
    });

    group.finish();
}

fn bench_decode_events(c: &mut Criterion) {
    let mut encoded = BytesMut::new();
    let mut codec = EventCodec::new();
    for event in sample_events() {
        codec.encode(event, &mut encoded).unwrap();
    }

    let mut group = c.benchmark_group("decode_events");
    group.throughput(Throughput::Bytes(encoded.len() as u64));

    group.bench_function("status_info_zone_change", |b| {
        b.iter(|| {
            let mut codec = EventCodec::new();
            let mut buffer = encoded.clone();
            while let Some(event) = codec.decode(&mut buffer).unwrap() {
                black_box(event);
            }
        });
    });

    group.finish();
}

fn bench_decode_commands(c: &mut Criterion) {
    let input = b"MODE:CLASS\nnoise\nSYNC\nMODE:FREE\n".repeat(16);

    let mut group = c.benchmark_group("decode_commands");
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("mixed_lines", |b| {
        b.iter(|| {
            let mut codec = CommandCodec::new();
            let mut buffer = BytesMut::from(&input[..]);
            while let Some(command) = codec.decode(&mut buffer).unwrap() {
                black_box(command);
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_encode_events,
    bench_decode_events,
    bench_decode_commands
);
criterion_main!(benches);
