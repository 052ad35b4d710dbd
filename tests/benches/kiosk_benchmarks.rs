//! # NoTouch Kiosk Benchmarks
//!
//! | Path | Budget per call |
//! |------|-----------------|
//! | Scale line parse | well under the 1 s serial read timeout |
//! | Ledger delta (in memory) | < 1 ms |
//! | Ledger delta (JSON file) | < 10 ms on SD card class storage |

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kc_01_hardware::parse_weight_line;
use kc_02_ledger::{
    AggregateStore, InMemoryAggregateStore, JsonFileStore, WeightLedger, WeightLedgerApi,
};
use shared_types::{AssignmentCode, Weight, WeightAggregate};

fn bench_scale_line_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("kc-01-scale-lines");

    let lines: [(&str, &[u8]); 4] = [
        ("clean", b"ST,GS,  12.34 kg\r\n"),
        ("control_bytes", b"\x02ST,GS,\x00  12.34kg\x03\r\n"),
        ("negative", b"ST,GS, - 0.10 kg\r\n"),
        ("no_reading", b"OL,GS, ------ kg\r\n"),
    ];
    for (name, line) in lines {
        group.bench_with_input(BenchmarkId::new("parse", name), &line, |b, line| {
            b.iter(|| black_box(parse_weight_line(line, "kg")))
        });
    }

    for size in [3usize, 30, 300] {
        let samples: Vec<Weight> = (0..size as i64).map(Weight::from_hundredths).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("mean", size), &samples, |b, samples| {
            b.iter(|| black_box(Weight::mean(samples)))
        });
    }

    group.finish();
}

fn seed<S: AggregateStore>(store: &S) {
    for code in 0..50 {
        let row = WeightAggregate {
            assignment_code: AssignmentCode(code),
            company: format!("Company {}", code % 5),
            accumulated_weight: Weight::from_hundredths(10_000),
        };
        let _ = store.store(&row);
    }
}

fn bench_ledger_delta(c: &mut Criterion) {
    let mut group = c.benchmark_group("kc-02-ledger");
    group.measurement_time(Duration::from_secs(5));

    let memory = InMemoryAggregateStore::new();
    seed(&memory);
    let ledger = WeightLedger::new(memory);
    group.bench_function("apply_delta_memory", |b| {
        b.iter(|| {
            black_box(ledger.apply_delta(
                AssignmentCode(7),
                "Company 2",
                Weight::from_hundredths(1),
            ))
        })
    });

    let dir = tempfile::tempdir().expect("tempdir");
    let file = JsonFileStore::open(dir.path().join("ledger.json")).expect("ledger file");
    seed(&file);
    let ledger = WeightLedger::new(file);
    group.bench_function("apply_delta_json_file", |b| {
        b.iter(|| {
            black_box(ledger.apply_delta(
                AssignmentCode(7),
                "Company 2",
                Weight::from_hundredths(1),
            ))
        })
    });

    group.bench_function("company_codes", |b| {
        b.iter(|| black_box(ledger.company_codes("Company 2")))
    });

    group.finish();
}

criterion_group!(benches, bench_scale_line_parsing, bench_ledger_delta);
criterion_main!(benches);
