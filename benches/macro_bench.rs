//! Macro Expander (C5) lookup throughput, grounded in the teacher's
//! `shortcut_bench.rs` capacity sizing (near `MAX_MACROS`).

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vi_ime_core::macros::{Macro, MacroStore};

fn store_with(n: usize) -> MacroStore {
    let mut store = MacroStore::new();
    for i in 0..n {
        store.add(Macro::new(format!("t{i}"), format!("replacement {i}")));
    }
    store
}

fn bench_expand_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("macro_expand_hit");
    for n in [10usize, 50, 200] {
        let store = store_with(n);
        let snap = store.snapshot();
        group.bench_with_input(BenchmarkId::new("hit", n), &n, |b, _| {
            b.iter(|| black_box(snap.expand(black_box("t0"), false, 2)));
        });
    }
    group.finish();
}

fn bench_expand_miss(c: &mut Criterion) {
    let store = store_with(200);
    let snap = store.snapshot();
    c.bench_function("macro_expand_miss", |b| {
        b.iter(|| black_box(snap.expand(black_box("not_a_trigger"), false, 14)));
    });
}

fn bench_snapshot_publish(c: &mut Criterion) {
    let store = store_with(200);
    c.bench_function("macro_snapshot_publish", |b| {
        b.iter(|| black_box(store.snapshot()));
    });
}

criterion_group!(benches, bench_expand_hit, bench_expand_miss, bench_snapshot_publish);
criterion_main!(benches);
