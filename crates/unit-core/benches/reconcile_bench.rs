use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;
use unit_core::{ChangeDetector, Record, RecordId, StoredRecord, reconcile_by_fields};

fn record(i: usize, name: &str) -> Record {
    json!({ "code": format!("C{:05}", i), "name": name })
        .as_object()
        .cloned()
        .unwrap()
}

fn reconcile_benchmark(c: &mut Criterion) {
    let key = vec!["code".to_string()];
    let detector = ChangeDetector::default();
    let mut group = c.benchmark_group("reconcile_by_fields");

    for size in [1_000usize, 10_000] {
        // Every tenth row renamed, every twentieth dropped.
        let existing: Vec<StoredRecord> = (0..size)
            .map(|i| StoredRecord::new(RecordId(i as u64 + 1), record(i, "old")))
            .collect();
        let source: Vec<Record> = (0..size)
            .filter(|i| i % 20 != 0)
            .map(|i| record(i, if i % 10 == 0 { "new" } else { "old" }))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                reconcile_by_fields(
                    black_box(source.clone()),
                    black_box(&existing),
                    &key,
                    &detector,
                )
                .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, reconcile_benchmark);
criterion_main!(benches);
