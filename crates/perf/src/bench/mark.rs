//! Cost of `observe` and `mark_mutated` outside of flushes

use crate::report::{Report, Target};
use crate::utils::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use vermut_reactive::{Runtime, SentinelPolicy};

const GROUP: &str = "Mark";

pub fn run(report: &mut Report) {
    mark_unobserved(report);
    mark_observed(report);
    observe(report);
}

fn mark_unobserved(report: &mut Report) {
    println!("  Marking unobserved objects:");

    for (name, policy) in [
        ("unobserved", SentinelPolicy::StampOnEveryMark),
        ("unobserved_no_sentinel", SentinelPolicy::Disabled),
    ] {
        let runtime = Runtime::builder().sentinel(policy).build();
        let objects: Vec<_> = (0..SIZES[2]).map(|i| Rc::new(RefCell::new(i))).collect();

        let timing = measure(ITERATIONS, || {
            for obj in &objects {
                runtime.mark_mutated(obj);
            }
        });
        report.record_with_target(
            GROUP,
            name,
            Some(objects.len()),
            objects.len(),
            timing,
            Target {
                label: "per mark",
                per_op: Duration::from_nanos(200),
            },
        );
    }
}

fn mark_observed(report: &mut Report) {
    println!("  Marking observed objects (no flush):");

    for &size in &SIZES {
        let timing = measure_with_setup(
            ITERATIONS,
            || {
                let runtime = Runtime::new();
                let objects: Vec<_> = (0..size).map(|i| Rc::new(RefCell::new(i))).collect();
                let subs: Vec<_> = objects
                    .iter()
                    .map(|obj| runtime.subscribe_fn(obj, || {}))
                    .collect();
                (runtime, objects, subs)
            },
            |(runtime, objects, subs)| {
                for obj in &objects {
                    runtime.mark_mutated(obj);
                }
                (runtime, objects, subs)
            },
        );
        report.record(GROUP, "observed", Some(size), size, timing);
    }
}

fn observe(report: &mut Report) {
    println!("  Reading versions:");

    let runtime = Runtime::new();
    let objects: Vec<_> = (0..SIZES[2]).map(|i| Rc::new(RefCell::new(i))).collect();
    let _subs: Vec<_> = objects
        .iter()
        .step_by(2)
        .map(|obj| runtime.subscribe_fn(obj, || {}))
        .collect();
    for obj in &objects {
        runtime.mark_mutated(obj);
    }

    let timing = measure(ITERATIONS, || {
        objects
            .iter()
            .filter(|obj| runtime.observe(*obj).is_stamped())
            .count()
    });
    report.record(GROUP, "observe", Some(objects.len()), objects.len(), timing);
}
