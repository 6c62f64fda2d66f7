//! Benchmarks for vermut-reactive.
//!
//! Target: marking an unobserved object costs one hash lookup.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::cell::RefCell;
use std::rc::Rc;
use vermut_reactive::{Callback, Runtime, Selector, SentinelPolicy, Subscription};

fn objects(count: usize) -> Vec<Rc<RefCell<u64>>> {
    (0..count as u64).map(|i| Rc::new(RefCell::new(i))).collect()
}

fn bench_observe(c: &mut Criterion) {
    let mut group = c.benchmark_group("observe");
    let runtime = Runtime::new();
    let obj = Rc::new(RefCell::new(0u64));

    group.bench_function("unobserved", |b| b.iter(|| runtime.observe(black_box(&obj))));

    let _sub = runtime.subscribe_fn(&obj, || {});
    runtime.mark_mutated(&obj);
    group.bench_function("stamped", |b| b.iter(|| runtime.observe(black_box(&obj))));

    group.finish();
}

fn bench_mark_unobserved(c: &mut Criterion) {
    let mut group = c.benchmark_group("mark/unobserved");
    let obj = Rc::new(RefCell::new(0u64));

    for (name, policy) in [
        ("sentinel", SentinelPolicy::StampOnEveryMark),
        ("no_sentinel", SentinelPolicy::Disabled),
    ] {
        let runtime = Runtime::builder().sentinel(policy).build();
        group.bench_function(name, |b| b.iter(|| runtime.mark_mutated(black_box(&obj))));
    }

    group.finish();
}

fn bench_mark_and_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("mark/flush");

    for size in [1, 10, 100, 1000] {
        let runtime = Runtime::new();
        let objs = objects(size);
        let _subs: Vec<Subscription> = objs
            .iter()
            .map(|obj| runtime.subscribe_fn(obj, || {}))
            .collect();

        group.bench_with_input(BenchmarkId::new("distinct", size), &objs, |b, objs| {
            b.iter(|| {
                for obj in objs {
                    runtime.mark_mutated(obj);
                }
                runtime.run_microtasks()
            })
        });
    }

    group.finish();
}

fn bench_shared_callback(c: &mut Criterion) {
    let mut group = c.benchmark_group("flush/shared_callback");

    for size in [10, 100, 1000] {
        let runtime = Runtime::new();
        let objs = objects(size);
        let callback = Callback::new(|| {});
        let _subs: Vec<Subscription> = objs
            .iter()
            .map(|obj| runtime.subscribe(obj, callback.clone()))
            .collect();

        group.bench_with_input(BenchmarkId::new("dedup", size), &objs, |b, objs| {
            b.iter(|| {
                for obj in objs {
                    runtime.mark_mutated(obj);
                }
                runtime.run_microtasks()
            })
        });
    }

    group.finish();
}

fn bench_subscribe(c: &mut Criterion) {
    let mut group = c.benchmark_group("subscribe");
    let runtime = Runtime::new();
    let obj = Rc::new(RefCell::new(0u64));

    group.bench_function("subscribe_unsubscribe", |b| {
        b.iter(|| drop(runtime.subscribe_fn(black_box(&obj), || {})))
    });

    group.finish();
}

fn bench_selector(c: &mut Criterion) {
    let mut group = c.benchmark_group("selector");

    for size in [10, 100, 1000] {
        let runtime = Runtime::new();
        let objs = objects(size);
        let tracked = objs.clone();
        let sum = Selector::new(&runtime, move |t| {
            tracked.iter().map(|obj| *t.track(obj).borrow()).sum::<u64>()
        });

        group.bench_with_input(BenchmarkId::new("reevaluate", size), &objs, |b, objs| {
            b.iter(|| {
                *objs[0].borrow_mut() += 1;
                runtime.mark_mutated(&objs[0]);
                runtime.run_microtasks();
                sum.get()
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_observe,
    bench_mark_unobserved,
    bench_mark_and_flush,
    bench_shared_callback,
    bench_subscribe,
    bench_selector,
);

criterion_main!(benches);
