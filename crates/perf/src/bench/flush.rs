//! Flush throughput

use crate::report::Report;
use crate::utils::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::warn;
use vermut_reactive::{Callback, Runtime};

const GROUP: &str = "Flush";

pub fn run(report: &mut Report) {
    distinct_callbacks(report);
    shared_callback(report);
    cascade(report);
}

fn distinct_callbacks(report: &mut Report) {
    println!("  One callback per object:");

    for &size in &SIZES {
        let runtime = Runtime::new();
        let calls = Rc::new(Cell::new(0u64));
        let objects: Vec<_> = (0..size).map(|i| Rc::new(RefCell::new(i))).collect();
        let _subs: Vec<_> = objects
            .iter()
            .map(|obj| {
                let calls = calls.clone();
                runtime.subscribe_fn(obj, move || calls.set(calls.get() + 1))
            })
            .collect();

        let timing = measure(ITERATIONS, || {
            for obj in &objects {
                runtime.mark_mutated(obj);
            }
            runtime.run_microtasks()
        });
        report.record(GROUP, "distinct", Some(size), size, timing);
        check_calls(&runtime, calls.get(), size);
    }
}

fn shared_callback(report: &mut Report) {
    println!("  One callback shared by every object:");

    for &size in &SIZES {
        let runtime = Runtime::new();
        let calls = Rc::new(Cell::new(0u64));
        let c = calls.clone();
        let callback = Callback::new(move || c.set(c.get() + 1));
        let objects: Vec<_> = (0..size).map(|i| Rc::new(RefCell::new(i))).collect();
        let _subs: Vec<_> = objects
            .iter()
            .map(|obj| runtime.subscribe(obj, callback.clone()))
            .collect();

        let timing = measure(ITERATIONS, || {
            for obj in &objects {
                runtime.mark_mutated(obj);
            }
            runtime.run_microtasks()
        });
        report.record(GROUP, "shared", Some(size), size, timing);
        check_calls(&runtime, calls.get(), 1);
    }
}

/// Each delivery marks the next object, one flush per link.
fn cascade(report: &mut Report) {
    println!("  Cascading marks:");

    for &size in &SMALL_SIZES {
        let runtime = Runtime::new();
        let objects: Rc<Vec<_>> = Rc::new((0..size).map(|i| Rc::new(RefCell::new(i))).collect());
        let _subs: Vec<_> = (0..size)
            .map(|i| {
                let rt = runtime.clone();
                let chain = Rc::downgrade(&objects);
                runtime.subscribe_fn(&objects[i], move || {
                    if let Some(next) = chain.upgrade().and_then(|c| c.get(i + 1).cloned()) {
                        rt.mark_mutated(&next);
                    }
                })
            })
            .collect();

        let timing = measure(ITERATIONS, || {
            runtime.mark_mutated(&objects[0]);
            runtime.run_microtasks()
        });
        report.record(GROUP, "cascade", Some(size), size, timing);
    }
}

fn check_calls(runtime: &Runtime, calls: u64, per_flush: usize) {
    let expected = runtime.flush_count() * per_flush as u64;
    if calls != expected {
        warn!(calls, expected, "unexpected number of deliveries");
    }
}
