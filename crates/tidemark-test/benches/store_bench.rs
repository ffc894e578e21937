//! Benchmarks for reconciliation store operations

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tidemark_core::{EntityId, EventTime, Payload};
use tidemark_state::PolicyKind;
use tidemark_test::{FuzzerConfig, OrderFuzzer};

fn bench_create_delete_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_delete_cycle");
    let id = EntityId::from("bench");
    let payload = Payload::new("Added");

    for policy in PolicyKind::ALL {
        let store = policy.build();
        let mut t = 0i64;

        group.bench_with_input(BenchmarkId::from_parameter(policy), &policy, |b, _| {
            b.iter(|| {
                t += 2;
                let _ = store.create(black_box(&id), &payload, EventTime::from_micros(t));
                let _ = store.delete(black_box(&id), EventTime::from_micros(t + 1));
            })
        });
    }

    group.finish();
}

fn bench_update_in_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_in_order");
    let payload = Payload::new("Updated");

    for policy in PolicyKind::ALL {
        let store = policy.build();
        let ids: Vec<EntityId> = (0..1000).map(|n| EntityId::new(format!("e{}", n))).collect();
        for id in &ids {
            let _ = store.create(id, &payload, EventTime::ZERO);
        }
        let mut t = 0i64;
        let mut n = 0usize;

        group.bench_with_input(BenchmarkId::from_parameter(policy), &policy, |b, _| {
            b.iter(|| {
                t += 1;
                n = (n + 1) % ids.len();
                black_box(store.update(&ids[n], &payload, EventTime::from_micros(t)))
            })
        });
    }

    group.finish();
}

fn bench_stale_update(c: &mut Criterion) {
    let store = PolicyKind::TimeTolerant.build();
    let id = EntityId::from("bench");
    let payload = Payload::new("Added");
    let _ = store.create(&id, &payload, EventTime::from_millis(10));

    c.bench_function("tolerant_stale_update", |b| {
        b.iter(|| black_box(store.update(&id, &payload, black_box(EventTime::from_millis(1)))))
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let store = PolicyKind::TimeTolerant.build();
    let payload = Payload::new("Added");
    for n in 0..1000 {
        let _ = store.create(&EntityId::new(format!("e{}", n)), &payload, EventTime::ZERO);
    }

    c.bench_function("snapshot_1000", |b| b.iter(|| black_box(store.snapshot())));
}

fn bench_order_fuzzer(c: &mut Criterion) {
    c.bench_function("order_fuzzer_light", |b| {
        b.iter(|| {
            let mut fuzzer = OrderFuzzer::new(FuzzerConfig::light());
            black_box(fuzzer.run(PolicyKind::TimeTolerant))
        })
    });
}

criterion_group!(
    benches,
    bench_create_delete_cycle,
    bench_update_in_order,
    bench_stale_update,
    bench_snapshot,
    bench_order_fuzzer,
);

criterion_main!(benches);
