//! Selector re-evaluation and re-subscription

use crate::report::Report;
use crate::utils::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use vermut_reactive::{register_observer, Runtime, Selector};

const GROUP: &str = "Selector";

pub fn run(report: &mut Report) {
    reevaluate(report);
    switch_dependencies(report);
    binding(report);
}

fn reevaluate(report: &mut Report) {
    println!("  Re-evaluation over N dependencies:");

    for &size in &SMALL_SIZES {
        let runtime = Runtime::new();
        let objects: Vec<_> = (0..size as u64).map(|i| Rc::new(RefCell::new(i))).collect();
        let tracked = objects.clone();
        let sum = Selector::new(&runtime, move |t| {
            tracked.iter().map(|obj| *t.track(obj).borrow()).sum::<u64>()
        });

        let timing = measure(ITERATIONS, || {
            *objects[0].borrow_mut() += 1;
            runtime.mark_mutated(&objects[0]);
            runtime.run_microtasks();
            sum.get()
        });
        report.record(GROUP, "reevaluate", Some(size), 1, timing);
    }
}

fn switch_dependencies(report: &mut Report) {
    println!("  Switching between two dependency sets:");

    for &size in &SMALL_SIZES {
        let runtime = Runtime::new();
        let flag = Rc::new(Cell::new(false));
        let left: Vec<_> = (0..size as u64).map(|i| Rc::new(RefCell::new(i))).collect();
        let right: Vec<_> = (0..size as u64).map(|i| Rc::new(RefCell::new(i))).collect();

        let (f, l, r) = (flag.clone(), left.clone(), right.clone());
        let selector = Selector::new(&runtime, move |t| {
            let side = if t.track(&f).get() { &r } else { &l };
            side.iter().map(|obj| *t.track(obj).borrow()).max()
        });

        let timing = measure(ITERATIONS, || {
            flag.set(!flag.get());
            runtime.mark_mutated(&flag);
            runtime.run_microtasks();
            selector.dependencies().len()
        });
        report.record(GROUP, "switch", Some(size), 1, timing);
    }
}

fn binding(report: &mut Report) {
    println!("  Bindings over one selector:");

    for &size in &SMALL_SIZES {
        let runtime = Runtime::new();
        let counter = Rc::new(RefCell::new(0u64));
        let c = counter.clone();
        let parity = Selector::new(&runtime, move |t| *t.track(&c).borrow() % 2);
        let renders = Rc::new(Cell::new(0u64));
        let _bindings: Vec<_> = (0..size)
            .map(|_| {
                let renders = renders.clone();
                register_observer(parity.clone(), move |_| renders.set(renders.get() + 1))
            })
            .collect();

        let timing = measure(ITERATIONS, || {
            *counter.borrow_mut() += 1;
            runtime.mark_mutated(&counter);
            runtime.run_microtasks()
        });
        report.record(GROUP, "bindings", Some(size), size, timing);
    }
}
