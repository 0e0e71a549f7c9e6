//! Transition engine benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tablefsm_core::{JsonCodec, TableCodec, TableDescription, TransitionEngine};

/// A linear chain `state_0 -NEXT-> state_1 -NEXT-> ...` with a `FAIL` exit
/// from every state.
fn chain_description(len: usize) -> TableDescription {
    let mut desc = TableDescription::new();
    for i in 0..len {
        desc.push(format!("state_{}-NEXT", i), format!("state_{}", i + 1));
        desc.push(format!("state_{}-FAIL", i), "failed");
    }
    desc
}

fn bench_new(c: &mut Criterion) {
    c.bench_function("engine_new_default_lifecycle", |b| {
        b.iter(|| black_box(TransitionEngine::new()))
    });
}

fn bench_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_advance");
    group.throughput(Throughput::Elements(3));

    group.bench_function("default_lifecycle", |b| {
        b.iter(|| {
            let engine = TransitionEngine::new();
            engine.next().unwrap();
            engine.next().unwrap();
            black_box(engine.next().unwrap())
        });
    });

    let engine = TransitionEngine::new();
    group.bench_function("next_state_lookup", |b| {
        b.iter(|| black_box(engine.next_state("continue").unwrap()))
    });

    let engine = TransitionEngine::new();
    engine.next().unwrap();
    engine.next().unwrap();
    engine.next().unwrap();
    group.bench_function("dead_end", |b| {
        b.iter(|| black_box(engine.next().is_err()))
    });

    group.finish();
}

fn bench_setup(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_setup");

    for len in [4usize, 64, 512] {
        let desc = chain_description(len);
        group.throughput(Throughput::Elements(desc.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &desc, |b, desc| {
            let engine = TransitionEngine::new();
            b.iter(|| black_box(engine.setup(desc, Some("state_0"), None).unwrap()))
        });
    }

    let text = JsonCodec::default().encode(&chain_description(64)).unwrap();
    group.bench_function("from_json_64", |b| {
        let engine = TransitionEngine::new();
        let codec = JsonCodec::default();
        b.iter(|| black_box(engine.setup_from_str(&text, &codec, None, None).unwrap()))
    });

    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_serialize");

    let engine = TransitionEngine::new();
    group.bench_function("default_lifecycle", |b| {
        b.iter(|| black_box(engine.serialize().unwrap()))
    });

    let engine = TransitionEngine::from_description(&chain_description(512)).unwrap();
    group.bench_function("chain_512", |b| {
        b.iter(|| black_box(engine.serialize().unwrap()))
    });
    group.bench_function("checksum_chain_512", |b| {
        b.iter(|| black_box(engine.checksum().unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_new, bench_advance, bench_setup, bench_serialize);
criterion_main!(benches);
