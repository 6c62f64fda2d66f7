//! Property-based tests for vermut-reactive using proptest.

use proptest::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use vermut_reactive::{Callback, Runtime, Subscription};

/// A subscriber watching a subset of the objects through one callback.
struct Watcher {
    calls: Rc<Cell<u32>>,
    watches: Vec<usize>,
    _subs: Vec<Subscription>,
}

fn setup(
    runtime: &Runtime,
    objects: &[Rc<RefCell<u32>>],
    watch_sets: &[Vec<usize>],
) -> Vec<Watcher> {
    watch_sets
        .iter()
        .map(|watches| {
            let calls = Rc::new(Cell::new(0));
            let c = calls.clone();
            let callback = Callback::new(move || c.set(c.get() + 1));
            let subs = watches
                .iter()
                .map(|&i| runtime.subscribe(&objects[i], callback.clone()))
                .collect();
            Watcher {
                calls,
                watches: watches.clone(),
                _subs: subs,
            }
        })
        .collect()
}

proptest! {
    /// Each subscriber is notified exactly once per flush if any of its
    /// objects was marked, and not at all otherwise.
    #[test]
    fn at_most_once_per_flush(
        watch_sets in prop::collection::vec(prop::collection::vec(0usize..8, 0..5), 1..10),
        marks in prop::collection::vec(0usize..8, 0..40),
    ) {
        let runtime = Runtime::new();
        let objects: Vec<_> = (0..8).map(|i| Rc::new(RefCell::new(i))).collect();
        let watchers = setup(&runtime, &objects, &watch_sets);

        for &i in &marks {
            runtime.mark_mutated(&objects[i]);
        }
        runtime.run_microtasks();

        for watcher in &watchers {
            let touched = watcher.watches.iter().any(|i| marks.contains(i));
            prop_assert_eq!(watcher.calls.get(), u32::from(touched));
        }
    }

    /// Marked objects with subscribers get a new version; others keep theirs.
    #[test]
    fn versions_change_only_when_observed(
        observed in prop::collection::vec(any::<bool>(), 8),
        marks in prop::collection::vec(0usize..8, 1..20),
    ) {
        let runtime = Runtime::new();
        let objects: Vec<_> = (0..8).map(|i| Rc::new(RefCell::new(i))).collect();
        let _subs: Vec<_> = objects
            .iter()
            .zip(&observed)
            .filter(|(_, watched)| **watched)
            .map(|(obj, _)| runtime.subscribe_fn(obj, || {}))
            .collect();

        let before: Vec<_> = objects.iter().map(|obj| runtime.observe(obj)).collect();
        for &i in &marks {
            runtime.mark_mutated(&objects[i]);
        }

        for (i, obj) in objects.iter().enumerate() {
            let changed = runtime.observe(obj) != before[i];
            prop_assert_eq!(changed, observed[i] && marks.contains(&i));
        }
    }

    /// Pending objects are deduplicated and one flush is scheduled per batch.
    #[test]
    fn batch_deduplicates(marks in prop::collection::vec(0usize..6, 1..50)) {
        let runtime = Runtime::new();
        let objects: Vec<_> = (0..6).map(|i| Rc::new(RefCell::new(i))).collect();
        let _subs: Vec<_> = objects
            .iter()
            .map(|obj| runtime.subscribe_fn(obj, || {}))
            .collect();

        for &i in &marks {
            runtime.mark_mutated(&objects[i]);
        }

        let mut distinct = marks.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(runtime.pending_len(), distinct.len());
        prop_assert_eq!(runtime.run_microtasks(), 1);
        prop_assert_eq!(runtime.flush_count(), 1);
        prop_assert_eq!(runtime.pending_len(), 0);
    }

    /// After an arbitrary interleaving of subscribes and unsubscribes, the
    /// runtime only keeps entries for objects that still have subscribers.
    #[test]
    fn cleanup_tracks_subscriber_count(
        ops in prop::collection::vec((0usize..4, any::<bool>()), 1..60),
    ) {
        let runtime = Runtime::new();
        let objects: Vec<_> = (0..4).map(|i| Rc::new(RefCell::new(i))).collect();
        let mut held: Vec<Vec<Subscription>> = (0..4).map(|_| Vec::new()).collect();

        for (i, subscribe) in ops {
            if subscribe {
                held[i].push(runtime.subscribe_fn(&objects[i], || {}));
            } else {
                held[i].pop();
            }
        }

        for (i, obj) in objects.iter().enumerate() {
            prop_assert_eq!(runtime.subscriber_count(obj), held[i].len());
        }
        let live = held.iter().filter(|subs| !subs.is_empty()).count();
        prop_assert_eq!(runtime.observed_count(), live);
    }
}
