//! Selectors: cached values derived from tracked reads.
//!
//! A selector evaluates its function inside a [`Tracker`], subscribes to
//! every object the function touched and re-evaluates when one of them is
//! marked mutated. Between evaluations only the difference in dependencies
//! is applied, so objects read by both evaluations keep their subscription.
//!
//! A selector is itself trackable. When a re-evaluation produces a value
//! different from the cached one, the selector marks itself mutated and its
//! own subscribers are notified in the next flush.

use crate::registry::Callback;
use crate::runtime::{Runtime, WeakRuntime};
use crate::subscription::Subscription;
use crate::tracker::{run_tracked, DependencySet, Tracker};
use hashbrown::HashMap;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};
use vermut_core::{Error, ObjectKey, ObjectRef, Result, Trackable, Version};

type Compute<T> = Box<dyn Fn(&mut Tracker) -> T>;

struct SelectorInner<T> {
    runtime: WeakRuntime,
    compute: Compute<T>,
    value: RefCell<T>,
    dependencies: RefCell<DependencySet>,
    watched: RefCell<HashMap<ObjectKey, Subscription>>,
    callback: Callback,
    evaluating: Cell<bool>,
    evaluations: Cell<u64>,
}

/// Resets the evaluation flag, also on unwind.
struct Evaluating<'a>(&'a Cell<bool>);

impl Drop for Evaluating<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// A cached, automatically re-subscribing derived value.
pub struct Selector<T> {
    inner: Rc<SelectorInner<T>>,
}

impl<T> Clone for Selector<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Selector<T> {
    /// Creates a selector whose dependencies are discovered on every
    /// evaluation.
    ///
    /// `f` runs once immediately.
    pub fn new<F>(runtime: &Runtime, f: F) -> Self
    where
        F: Fn(&mut Tracker) -> T + 'static,
    {
        Self::build(runtime, Box::new(f))
    }

    /// Creates a selector over a fixed dependency list.
    ///
    /// `f` re-runs whenever any of `dependencies` is marked mutated. Reads
    /// inside `f` are not tracked.
    pub fn with_dependencies<F>(runtime: &Runtime, dependencies: &[&dyn Trackable], f: F) -> Self
    where
        F: Fn() -> T + 'static,
    {
        let fixed: Vec<ObjectRef> = dependencies
            .iter()
            .filter_map(|dependency| dependency.object_ref())
            .collect();

        Self::build(
            runtime,
            Box::new(move |tracker: &mut Tracker| {
                for object in &fixed {
                    tracker.track(object);
                }
                f()
            }),
        )
    }

    /// Creates a selector that also re-evaluates after any mutation on the
    /// runtime, through its sentinel.
    ///
    /// Needed for reads of objects nobody subscribes to directly. Requires
    /// [`SentinelPolicy::StampOnEveryMark`](crate::SentinelPolicy).
    pub fn watching_all<F>(runtime: &Runtime, f: F) -> Self
    where
        F: Fn(&mut Tracker) -> T + 'static,
    {
        if runtime.config().sentinel == crate::SentinelPolicy::Disabled {
            warn!("watching_all selector on a runtime with the sentinel disabled");
        }

        let sentinel = runtime.sentinel();
        Self::build(
            runtime,
            Box::new(move |tracker: &mut Tracker| {
                tracker.track(&sentinel);
                f(tracker)
            }),
        )
    }

    fn build(runtime: &Runtime, compute: Compute<T>) -> Self {
        let (value, dependencies) = run_tracked(|tracker| compute(tracker));

        let inner = Rc::new_cyclic(|weak: &Weak<SelectorInner<T>>| {
            let weak = weak.clone();
            SelectorInner {
                runtime: runtime.downgrade(),
                compute,
                value: RefCell::new(value),
                dependencies: RefCell::new(DependencySet::new()),
                watched: RefCell::new(HashMap::new()),
                callback: Callback::new(move || {
                    let Some(inner) = weak.upgrade() else {
                        return;
                    };
                    if let Err(err) = (Selector { inner }).refresh() {
                        warn!(%err, "selector refresh failed");
                    }
                }),
                evaluating: Cell::new(false),
                evaluations: Cell::new(1),
            }
        });

        let selector = Self { inner };
        selector.resubscribe(runtime, dependencies);
        selector
    }

    /// Re-evaluates now.
    ///
    /// Returns whether the cached value changed. Fails with
    /// [`Error::ReentrantEvaluation`] when called from inside this
    /// selector's own function, and with [`Error::RuntimeDropped`] once the
    /// runtime is gone.
    pub fn refresh(&self) -> Result<bool> {
        let inner = &*self.inner;
        let runtime = inner
            .runtime
            .upgrade()
            .ok_or_else(|| Error::runtime_dropped("Selector::refresh"))?;

        if inner.evaluating.replace(true) {
            warn!(selector = %self.key(), "selector evaluated itself");
            return Err(Error::reentrant_evaluation(self.key()));
        }

        let (value, dependencies) = {
            let _evaluating = Evaluating(&inner.evaluating);
            run_tracked(|tracker| (inner.compute)(tracker))
        };
        inner.evaluations.set(inner.evaluations.get() + 1);
        self.resubscribe(&runtime, dependencies);

        let changed = *inner.value.borrow() != value;
        if changed {
            *inner.value.borrow_mut() = value;
            runtime.mark_mutated(self);
        }
        trace!(selector = %self.key(), changed, "selector evaluated");
        Ok(changed)
    }

    /// Subscribes to added dependencies and drops subscriptions of removed
    /// ones. Common dependencies are left alone.
    fn resubscribe(&self, runtime: &Runtime, dependencies: DependencySet) {
        let diff = dependencies.diff(&self.inner.dependencies.borrow());

        if !diff.is_empty() {
            let stale: Vec<Subscription> = {
                let mut watched = self.inner.watched.borrow_mut();
                for object in &diff.added {
                    let subscription = runtime.subscribe(object, self.inner.callback.clone());
                    watched.insert(object.key(), subscription);
                }
                diff.removed
                    .iter()
                    .filter_map(|key| watched.remove(key))
                    .collect()
            };
            drop(stale);
            debug!(
                selector = %self.key(),
                added = diff.added.len(),
                removed = diff.removed.len(),
                "selector resubscribed"
            );
        }

        *self.inner.dependencies.borrow_mut() = dependencies;
    }

    /// Returns a clone of the cached value.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Calls `f` with a reference to the cached value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }
}

impl<T: 'static> Selector<T> {
    fn key(&self) -> ObjectKey {
        ObjectKey::of(&self.inner)
    }

    /// Returns the dependencies of the latest evaluation.
    pub fn dependencies(&self) -> DependencySet {
        self.inner.dependencies.borrow().clone()
    }

    /// Returns true if the latest evaluation touched `object`.
    pub fn depends_on<O: Trackable + ?Sized>(&self, object: &O) -> bool {
        object
            .object_key()
            .map(|key| self.inner.dependencies.borrow().contains(key))
            .unwrap_or(false)
    }

    /// Returns the selector's own version token.
    pub fn version(&self) -> Version {
        match self.inner.runtime.upgrade() {
            Some(runtime) => runtime.observe(&self.inner),
            None => Version::Untracked,
        }
    }

    /// Returns how many times the function has run.
    pub fn evaluations(&self) -> u64 {
        self.inner.evaluations.get()
    }

    pub(crate) fn runtime(&self) -> Option<Runtime> {
        self.inner.runtime.upgrade()
    }
}

impl<T: 'static> Trackable for Selector<T> {
    fn object_ref(&self) -> Option<ObjectRef> {
        Some(ObjectRef::new(&self.inner))
    }

    fn object_key(&self) -> Option<ObjectKey> {
        Some(self.key())
    }
}

impl<T: fmt::Debug> fmt::Debug for Selector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("value", &*self.inner.value.borrow())
            .field("dependencies", &self.inner.dependencies.borrow().len())
            .field("evaluations", &self.inner.evaluations.get())
            .finish()
    }
}
