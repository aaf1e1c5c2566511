use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tracecache::config::HierarchyConfig;
use tracecache::replacement_policies::Lfsr;
use tracecache::simulator::Simulator;
use tracecache::trace::{format_record, AccessKind, TraceOp, RECORD_SIZE};

const RECORDS: usize = 200_000;

/// A loop over a few kilobytes of code touching a megabyte of data, with some maintenance
/// sprinkled in
fn synthetic_trace() -> Vec<u8> {
    let mut lfsr = Lfsr::new(0xace1);
    let mut bytes = Vec::with_capacity(RECORDS * RECORD_SIZE);
    for i in 0..RECORDS {
        let pc = 0x8000_0000 + (i as u64 % 2048) * 4;
        let random = lfsr.next() as u64;
        let op = match i % 8 {
            0 | 2 | 4 | 6 => TraceOp::Access { addr: pc, size: 4, kind: AccessKind::Fetch },
            1 | 3 => TraceOp::Access {
                addr: 0x1000_0000 + (random & 0xf_fff8),
                size: 8,
                kind: AccessKind::Load,
            },
            5 => TraceOp::Access {
                addr: 0x1000_0000 + (random & 0xf_fff8),
                size: 8,
                kind: AccessKind::Store,
            },
            _ if i % 4096 == 7 => TraceOp::CleanInvalidate {
                addr: 0x1000_0000,
                size: 512,
                clean: true,
                inval: false,
            },
            _ => TraceOp::Access {
                addr: 0x7fff_0000 + (i as u64 % 64) * 8,
                size: 8,
                kind: AccessKind::Store,
            },
        };
        bytes.extend_from_slice(&format_record(pc, &op));
    }
    bytes
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let trace = synthetic_trace();
    let configs = [
        ("split_lru", r#"{ "icache": { "geometry": "64:4:64", "replacement_policy": "lru" },
                          "dcache": { "geometry": "64:4:64", "replacement_policy": "lru" },
                          "l2": { "geometry": "1024:8:64", "replacement_policy": "lru" } }"#),
        ("split_random", r#"{ "icache": { "geometry": "64:4:64" },
                             "dcache": { "geometry": "64:4:64" },
                             "l2": { "geometry": "1024:8:64" } }"#),
        ("full_rr", r#"{ "dcache": { "geometry": "1:512:64", "replacement_policy": "rr" } }"#),
    ];

    let mut group = c.benchmark_group("Synthetic");
    group.throughput(Throughput::Elements(RECORDS as u64));
    for (name, json) in configs {
        let config = HierarchyConfig::from_reader(json.as_bytes()).unwrap();
        group.bench_with_input(BenchmarkId::new("hierarchy", name), &config, |bench, conf| {
            bench.iter(|| {
                Simulator::new(conf).unwrap().simulate(&trace).unwrap();
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default().significance_level(0.1).sample_size(10);
    targets = criterion_benchmark
);
criterion_main!(benches);
