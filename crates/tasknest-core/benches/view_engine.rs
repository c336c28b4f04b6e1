#![allow(missing_docs)]

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tasknest_core::{
    Category, CategoryFilter, FixedClock, Priority, SortKey, StatusFilter, TaskDraft, TaskStats, TaskStore,
    ViewParams, derive_view,
};
use time::Duration;
use time::macros::datetime;

fn build_store(count: usize) -> TaskStore<FixedClock> {
    let start = datetime!(2025-01-01 00:00 UTC);
    let mut store = TaskStore::with_clock(FixedClock::new(start));
    for idx in 0..count {
        let category = Category::ALL[idx % Category::ALL.len()];
        let priority = Priority::ALL[idx % Priority::ALL.len()];
        let mut draft = TaskDraft::new(format!("task {idx} review notes"))
            .category(category)
            .priority(priority)
            .tags([format!("tag-{}", idx % 7)]);
        if idx % 3 == 0 {
            draft = draft.due(start + Duration::days(i64::try_from(idx % 30).unwrap_or(0)));
        }
        if let Ok(id) = store.create(draft) {
            if idx % 4 == 0 {
                let _ = store.toggle_complete(id);
            }
        }
        store.clock().advance(Duration::seconds(1));
    }
    store
}

fn derive_view_benchmark(c: &mut Criterion) {
    let now = datetime!(2025-01-15 00:00 UTC);
    let mut group = c.benchmark_group("derive_view");
    for &size in &[100usize, 1_000, 10_000] {
        let store = build_store(size);
        for sort in [SortKey::Created, SortKey::Due, SortKey::Alphabetical] {
            let params = ViewParams {
                search: "review".into(),
                category: CategoryFilter::All,
                status: StatusFilter::Active,
                sort,
            };
            group.bench_with_input(BenchmarkId::new(sort.as_str(), size), &params, |b, params| {
                b.iter_batched(
                    || store.snapshot(),
                    |tasks| {
                        black_box(derive_view(&tasks, params, now).len());
                    },
                    BatchSize::SmallInput,
                );
            });
        }
    }
    group.finish();
}

fn stats_benchmark(c: &mut Criterion) {
    let store = build_store(10_000);
    c.bench_function("task_stats_collect", |b| {
        b.iter(|| black_box(TaskStats::collect(store.tasks())));
    });
}

criterion_group!(benches, derive_view_benchmark, stats_benchmark);
criterion_main!(benches);
