//! The change-notification runtime.
//!
//! A `Runtime` owns the version store, the subscription registry and the
//! pending batch, plus the [`Host`] it schedules flushes on. It is a cheap,
//! cloneable `Rc` handle. Each thread has a default runtime, reachable via
//! [`Runtime::current`] and the free functions of this crate.
//!
//! # Flush protocol
//!
//! 1. `mark_mutated` stamps the object, adds it to the batch and, if no
//!    flush is scheduled yet, defers one on the host.
//! 2. The flush takes the batch and clears the scheduled flag *before* any
//!    callback runs. Marks made by callbacks start the next batch.
//! 3. Subscribers of every taken object are collected and deduplicated by
//!    callback identity, so each callback runs at most once per flush.
//! 4. Right before each delivery the callback's registrations are checked
//!    again; unsubscribing mid-flush cancels a delivery that has not run.

use crate::batch::Batch;
use crate::config::{Config, SentinelPolicy};
use crate::host::{Host, MicrotaskQueue};
use crate::registry::{Callback, Removal, SubscriptionId, SubscriptionRegistry};
use crate::subscription::Subscription;
use crate::version_store::VersionStore;
use hashbrown::HashMap;
use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll, Waker};
use tracing::{debug, trace, warn};
use vermut_core::{Error, ObjectKey, ObjectRef, Result, Trackable, Version};

thread_local! {
    static CURRENT: Runtime = Runtime::new();
}

/// Internal object behind [`Runtime::sentinel`].
struct Sentinel;

/// One distinct callback to deliver in a flush.
struct Delivery {
    callback: Callback,
    registrations: Vec<SubscriptionId>,
}

struct State {
    versions: VersionStore,
    registry: SubscriptionRegistry,
    batch: Batch,
    in_flight: bool,
    flushes: u64,
    waiters: Vec<Waker>,
}

impl State {
    /// Enqueues `key`. Returns true if a flush must be deferred.
    fn enqueue(&mut self, key: ObjectKey) -> bool {
        self.batch.push(key);
        self.batch.schedule()
    }

    fn is_settled(&self) -> bool {
        !self.batch.is_scheduled() && !self.in_flight
    }

    /// Collects the distinct callbacks watching `keys`, in first-seen order.
    fn deliveries(&self, keys: &[ObjectKey]) -> Vec<Delivery> {
        let mut deliveries: Vec<Delivery> = Vec::new();
        let mut positions: HashMap<usize, usize> = HashMap::new();

        for key in keys {
            for (id, callback) in self.registry.subscribers(*key) {
                match positions.get(&callback.identity()) {
                    Some(&pos) => deliveries[pos].registrations.push(id),
                    None => {
                        positions.insert(callback.identity(), deliveries.len());
                        deliveries.push(Delivery {
                            callback: callback.clone(),
                            registrations: vec![id],
                        });
                    }
                }
            }
        }

        deliveries
    }

    fn wants(&self, delivery: &Delivery) -> bool {
        delivery
            .registrations
            .iter()
            .any(|id| self.registry.is_live(*id))
    }

    /// Drops registry and version entries of objects that no longer exist.
    fn prune(&mut self, sentinel: ObjectKey) -> usize {
        let dead = self.registry.dead_objects();
        for key in &dead {
            self.registry.remove_all(*key);
            if *key != sentinel {
                self.versions.forget(*key);
            }
        }
        dead.len()
    }
}

pub(crate) struct RuntimeInner {
    state: RefCell<State>,
    host: Rc<dyn Host>,
    config: Config,
    sentinel: Rc<Sentinel>,
}

impl RuntimeInner {
    fn sentinel_key(&self) -> ObjectKey {
        ObjectKey::of(&self.sentinel)
    }
}

/// Non-owning runtime handle held by subscriptions and observers.
#[derive(Clone)]
pub(crate) struct WeakRuntime(Weak<RuntimeInner>);

impl WeakRuntime {
    /// A handle that never upgrades.
    pub(crate) fn dangling() -> Self {
        Self(Weak::new())
    }

    pub(crate) fn upgrade(&self) -> Option<Runtime> {
        self.0.upgrade().map(|inner| Runtime { inner })
    }
}

/// Builder for [`Runtime`].
pub struct RuntimeBuilder {
    config: Config,
    host: Option<Rc<dyn Host>>,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeBuilder {
    /// Starts from the default configuration and a [`MicrotaskQueue`] host.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            host: None,
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets the sentinel policy.
    pub fn sentinel(mut self, sentinel: SentinelPolicy) -> Self {
        self.config.sentinel = sentinel;
        self
    }

    /// Sets the host flushes are deferred on.
    pub fn host<H: Host + 'static>(mut self, host: H) -> Self {
        self.host = Some(Rc::new(host));
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> Runtime {
        let host = self
            .host
            .unwrap_or_else(|| Rc::new(MicrotaskQueue::new()) as Rc<dyn Host>);
        Runtime {
            inner: Rc::new(RuntimeInner {
                state: RefCell::new(State {
                    versions: VersionStore::new(),
                    registry: SubscriptionRegistry::new(),
                    batch: Batch::new(),
                    in_flight: false,
                    flushes: 0,
                    waiters: Vec::new(),
                }),
                host,
                config: self.config,
                sentinel: Rc::new(Sentinel),
            }),
        }
    }
}

/// Single-threaded change-notification runtime.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// Creates a runtime with the default configuration and host.
    pub fn new() -> Self {
        RuntimeBuilder::new().build()
    }

    /// Returns a builder.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Returns this thread's default runtime.
    pub fn current() -> Self {
        CURRENT.with(Runtime::clone)
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub(crate) fn downgrade(&self) -> WeakRuntime {
        WeakRuntime(Rc::downgrade(&self.inner))
    }

    /// Returns the current version token of `object`.
    ///
    /// Pure and cheap: one hash lookup. Non-trackable input yields
    /// [`Version::Untracked`].
    pub fn observe<O: Trackable + ?Sized>(&self, object: &O) -> Version {
        match object.object_key() {
            Some(key) => self.inner.state.borrow().versions.read(key),
            None => Version::Untracked,
        }
    }

    /// Asserts that `object` was mutated in place and returns it.
    ///
    /// A no-op for objects nobody subscribed to, apart from stamping the
    /// sentinel under [`SentinelPolicy::StampOnEveryMark`]. Subscribers are
    /// notified in a later flush, never from inside this call.
    pub fn mark_mutated<'a, O: Trackable + ?Sized>(&self, object: &'a O) -> &'a O {
        let Some(key) = object.object_key() else {
            return object;
        };

        let defer = {
            let mut state = self.inner.state.borrow_mut();
            let mut defer = false;

            if state.registry.contains(key) {
                state.versions.stamp(key);
                defer |= state.enqueue(key);
                trace!(object = %key, "marked mutated");
            }

            if self.inner.config.sentinel == SentinelPolicy::StampOnEveryMark {
                let sentinel = self.inner.sentinel_key();
                state.versions.stamp(sentinel);
                if state.registry.contains(sentinel) {
                    defer |= state.enqueue(sentinel);
                }
            }

            defer
        };

        if defer {
            self.defer_flush();
        }
        object
    }

    /// Registers `callback` for changes to `object`.
    ///
    /// Non-trackable input returns an inert subscription.
    pub fn subscribe<O: Trackable + ?Sized>(&self, object: &O, callback: Callback) -> Subscription {
        let Some(object) = object.object_ref() else {
            return Subscription::inert();
        };

        let key = object.key();
        let id = self.inner.state.borrow_mut().registry.add(object, callback);
        trace!(object = %key, subscription = id, "subscribed");
        Subscription::new(self.downgrade(), id)
    }

    /// Registers a closure for changes to `object`.
    pub fn subscribe_fn<O, F>(&self, object: &O, f: F) -> Subscription
    where
        O: Trackable + ?Sized,
        F: Fn() + 'static,
    {
        self.subscribe(object, Callback::new(f))
    }

    /// Removes a registration by ID.
    ///
    /// Removing the last registration of an object also drops its version,
    /// so a later subscription starts from the never-observed state.
    /// Returns false if the registration no longer exists.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let (removed, released) = {
            let mut state = self.inner.state.borrow_mut();
            let removed = match state.registry.remove(id) {
                Removal::NotFound => false,
                Removal::Removed => true,
                Removal::Emptied(key) => {
                    if key != self.inner.sentinel_key() {
                        state.versions.forget(key);
                    }
                    trace!(object = %key, "last subscriber removed");
                    true
                }
            };
            (removed, state.registry.take_released())
        };

        drop(released);
        removed
    }

    /// Removes every registration of `object`. Returns how many were removed.
    pub fn unsubscribe_all<O: Trackable + ?Sized>(&self, object: &O) -> usize {
        let Some(key) = object.object_key() else {
            return 0;
        };

        let (removed, released) = {
            let mut state = self.inner.state.borrow_mut();
            let removed = state.registry.remove_all(key);
            if removed > 0 && key != self.inner.sentinel_key() {
                state.versions.forget(key);
            }
            (removed, state.registry.take_released())
        };

        drop(released);
        removed
    }

    /// Returns the number of registrations for `object`.
    pub fn subscriber_count<O: Trackable + ?Sized>(&self, object: &O) -> usize {
        object
            .object_key()
            .map(|key| self.inner.state.borrow().registry.subscriber_count(key))
            .unwrap_or(0)
    }

    /// Returns true if a registration is still live.
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.inner.state.borrow().registry.is_live(id)
    }

    /// Returns the sentinel object, which changes whenever anything is
    /// marked mutated (see [`SentinelPolicy`]).
    pub fn sentinel(&self) -> ObjectRef {
        ObjectRef::new(&self.inner.sentinel)
    }

    /// Runs the scheduled flush now.
    ///
    /// Returns `Ok(false)` if nothing was scheduled, and
    /// [`Error::FlushInProgress`] when called from inside a flush.
    pub fn flush_now(&self) -> Result<bool> {
        if self.is_flushing() {
            warn!("flush_now called from inside a flush");
            return Err(Error::flush_in_progress(self.pending_len()));
        }
        Ok(self.flush())
    }

    /// Returns a future that resolves once no flush is scheduled or running.
    ///
    /// Polling it drains the host's own queue (see [`Host::run_pending`]),
    /// so with the default host awaiting it is enough to settle.
    pub fn settled(&self) -> Settled {
        Settled {
            runtime: self.downgrade(),
        }
    }

    /// Drains the host's own queue. Returns how many tasks ran.
    pub fn run_microtasks(&self) -> usize {
        self.inner.host.run_pending()
    }

    /// Returns true if a flush is scheduled and has not started.
    pub fn is_flush_scheduled(&self) -> bool {
        self.inner.state.borrow().batch.is_scheduled()
    }

    /// Returns true while subscriber callbacks are being delivered.
    pub fn is_flushing(&self) -> bool {
        self.inner.state.borrow().in_flight
    }

    /// Returns the number of objects waiting for the next flush.
    pub fn pending_len(&self) -> usize {
        self.inner.state.borrow().batch.len()
    }

    /// Returns the number of completed flushes.
    pub fn flush_count(&self) -> u64 {
        self.inner.state.borrow().flushes
    }

    /// Returns the number of objects with at least one subscriber.
    pub fn observed_count(&self) -> usize {
        self.inner.state.borrow().registry.object_count()
    }

    /// Drops the entries of objects that were dropped while still
    /// subscribed. Returns how many objects were swept.
    pub fn prune(&self) -> usize {
        let (swept, released) = {
            let mut state = self.inner.state.borrow_mut();
            let swept = state.prune(self.inner.sentinel_key());
            (swept, state.registry.take_released())
        };

        drop(released);
        if swept > 0 {
            debug!(swept, "pruned dead objects");
        }
        swept
    }

    fn defer_flush(&self) {
        let runtime = self.downgrade();
        debug!("flush scheduled");
        self.inner.host.defer(Box::new(move || {
            if let Some(runtime) = runtime.upgrade() {
                runtime.run_deferred();
            }
        }));
    }

    fn run_deferred(&self) {
        if self.is_flushing() {
            // A host ran us from inside a delivery; go again afterwards.
            self.defer_flush();
            return;
        }
        self.flush();
    }

    fn flush(&self) -> bool {
        let (deliveries, objects) = {
            let mut state = self.inner.state.borrow_mut();
            if !state.batch.is_scheduled() {
                return false;
            }
            let keys = state.batch.take();
            state.in_flight = true;
            (state.deliveries(&keys), keys.len())
        };

        let _guard = FlushGuard { runtime: self };
        debug!(objects, callbacks = deliveries.len(), "flush started");

        let mut delivered = 0usize;
        for delivery in &deliveries {
            if !self.inner.state.borrow().wants(delivery) {
                continue;
            }
            delivery.callback.call();
            delivered += 1;
        }

        debug!(delivered, "flush finished");
        true
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Runtime")
            .field("config", &self.inner.config)
            .field("registry", &state.registry)
            .field("pending", &state.batch.len())
            .field("in_flight", &state.in_flight)
            .field("flushes", &state.flushes)
            .finish()
    }
}

/// Ends a flush even if a callback panics.
struct FlushGuard<'a> {
    runtime: &'a Runtime,
}

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        let inner = &self.runtime.inner;
        let (waiters, released) = {
            let mut state = inner.state.borrow_mut();
            state.in_flight = false;
            state.flushes += 1;

            if inner.config.prune_due(state.flushes) {
                let swept = state.prune(inner.sentinel_key());
                if swept > 0 {
                    debug!(swept, "pruned dead objects");
                }
            }

            let waiters = if state.is_settled() {
                mem::take(&mut state.waiters)
            } else {
                Vec::new()
            };
            (waiters, state.registry.take_released())
        };

        drop(released);
        for waker in waiters {
            waker.wake();
        }
    }
}

/// Future returned by [`Runtime::settled`].
#[must_use = "futures do nothing unless polled"]
pub struct Settled {
    runtime: WeakRuntime,
}

impl Future for Settled {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let Some(runtime) = self.runtime.upgrade() else {
            return Poll::Ready(());
        };

        runtime.run_microtasks();

        let mut state = runtime.inner.state.borrow_mut();
        if state.is_settled() {
            return Poll::Ready(());
        }
        if !state.waiters.iter().any(|w| w.will_wake(cx.waker())) {
            state.waiters.push(cx.waker().clone());
        }
        Poll::Pending
    }
}

impl fmt::Debug for Settled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settled").finish_non_exhaustive()
    }
}

/// Returns the current version of `object` on this thread's runtime.
pub fn observe<O: Trackable + ?Sized>(object: &O) -> Version {
    Runtime::current().observe(object)
}

/// Marks `object` mutated on this thread's runtime and returns it.
pub fn mark_mutated<O: Trackable + ?Sized>(object: &O) -> &O {
    CURRENT.with(|runtime| runtime.mark_mutated(object))
}

/// Subscribes `callback` to `object` on this thread's runtime.
pub fn subscribe<O: Trackable + ?Sized>(object: &O, callback: Callback) -> Subscription {
    Runtime::current().subscribe(object, callback)
}

/// Runs this thread's scheduled flush now.
pub fn flush_now() -> Result<bool> {
    Runtime::current().flush_now()
}

/// Resolves once this thread's runtime has no scheduled or running flush.
pub fn settled() -> Settled {
    Runtime::current().settled()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::Cell;

    fn counting(runtime: &Runtime, object: &Rc<RefCell<Vec<i32>>>) -> (Rc<Cell<u32>>, Subscription) {
        let count = Rc::new(Cell::new(0u32));
        let count_clone = count.clone();
        let sub = runtime.subscribe_fn(object, move || count_clone.set(count_clone.get() + 1));
        (count, sub)
    }

    #[test]
    fn test_observe_identity_stable() {
        let runtime = Runtime::new();
        let obj = Rc::new(RefCell::new(vec![1]));

        let v1 = runtime.observe(&obj);
        let v2 = runtime.observe(&obj);
        assert_eq!(v1, v2);
        assert_eq!(v1, Version::Identity(ObjectKey::of(&obj)));
    }

    #[test]
    fn test_observe_untracked() {
        let runtime = Runtime::new();
        assert_eq!(runtime.observe(&None::<Rc<u8>>), Version::Untracked);
        assert_eq!(runtime.observe(&()), Version::Untracked);
    }

    #[test]
    fn test_mark_unobserved_is_noop() {
        let runtime = Runtime::new();
        let obj = Rc::new(RefCell::new(vec![1]));
        let before = runtime.observe(&obj);

        obj.borrow_mut().push(2);
        let same = runtime.mark_mutated(&obj);

        assert!(Rc::ptr_eq(same, &obj));
        assert_eq!(runtime.observe(&obj), before);
        assert!(!runtime.is_flush_scheduled());
    }

    #[test]
    fn test_mark_defers_notification() {
        let runtime = Runtime::new();
        let obj = Rc::new(RefCell::new(vec![1]));
        let (count, _sub) = counting(&runtime, &obj);

        let before = runtime.observe(&obj);
        runtime.mark_mutated(&obj);

        assert_ne!(runtime.observe(&obj), before);
        assert_eq!(count.get(), 0);
        assert!(runtime.is_flush_scheduled());

        assert_eq!(runtime.run_microtasks(), 1);
        assert_eq!(count.get(), 1);
        assert_eq!(runtime.flush_count(), 1);
    }

    #[test]
    fn test_duplicate_marks_notify_once() {
        let runtime = Runtime::new();
        let obj = Rc::new(RefCell::new(vec![]));
        let (count, _sub) = counting(&runtime, &obj);

        runtime.mark_mutated(&obj);
        runtime.mark_mutated(&obj);
        runtime.mark_mutated(&obj);
        assert_eq!(runtime.pending_len(), 1);

        assert_eq!(runtime.flush_now(), Ok(true));
        assert_eq!(count.get(), 1);
        assert_eq!(runtime.flush_now(), Ok(false));
    }

    #[test]
    fn test_shared_callback_once_per_flush() {
        let runtime = Runtime::new();
        let a = Rc::new(RefCell::new(vec![1]));
        let b = Rc::new(RefCell::new(vec![2]));
        let count = Rc::new(Cell::new(0u32));
        let count_clone = count.clone();
        let callback = Callback::new(move || count_clone.set(count_clone.get() + 1));

        let _sa = runtime.subscribe(&a, callback.clone());
        let _sb = runtime.subscribe(&b, callback);

        runtime.mark_mutated(&a);
        runtime.mark_mutated(&b);
        runtime.flush_now().unwrap();

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_unsubscribe_last_restores_identity() {
        let runtime = Runtime::new();
        let obj = Rc::new(RefCell::new(vec![1]));
        let (_, sub) = counting(&runtime, &obj);

        runtime.mark_mutated(&obj);
        assert!(runtime.observe(&obj).is_stamped());

        sub.unsubscribe();
        assert_eq!(runtime.observe(&obj), Version::Identity(ObjectKey::of(&obj)));
        assert_eq!(runtime.observed_count(), 0);
    }

    #[test]
    fn test_unsubscribe_all() {
        let runtime = Runtime::new();
        let obj = Rc::new(RefCell::new(vec![1]));
        let (count_a, sub_a) = counting(&runtime, &obj);
        let (count_b, _sub_b) = counting(&runtime, &obj);

        assert_eq!(runtime.unsubscribe_all(&obj), 2);
        assert!(!sub_a.is_active());

        runtime.mark_mutated(&obj);
        runtime.run_microtasks();
        assert_eq!(count_a.get(), 0);
        assert_eq!(count_b.get(), 0);
    }

    #[test]
    fn test_sentinel_stamped_on_every_mark() {
        let runtime = Runtime::new();
        let unobserved = Rc::new(RefCell::new(vec![0]));
        let sentinel = runtime.sentinel();

        let before = runtime.observe(&sentinel);
        runtime.mark_mutated(&unobserved);
        assert_ne!(runtime.observe(&sentinel), before);
        // Nobody watches the sentinel, so nothing is scheduled.
        assert!(!runtime.is_flush_scheduled());
    }

    #[test]
    fn test_sentinel_subscribers_notified() {
        let runtime = Runtime::new();
        let unobserved = Rc::new(RefCell::new(vec![0]));
        let count = Rc::new(Cell::new(0u32));
        let c = count.clone();
        let _sub = runtime.subscribe_fn(&runtime.sentinel(), move || c.set(c.get() + 1));

        runtime.mark_mutated(&unobserved);
        runtime.mark_mutated(&unobserved);
        runtime.run_microtasks();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_sentinel_disabled() {
        let runtime = Runtime::builder().sentinel(SentinelPolicy::Disabled).build();
        let obj = Rc::new(RefCell::new(vec![0]));
        let sentinel = runtime.sentinel();

        let before = runtime.observe(&sentinel);
        runtime.mark_mutated(&obj);
        assert_eq!(runtime.observe(&sentinel), before);
    }

    #[test]
    fn test_flush_now_inside_flush_errors() {
        let runtime = Runtime::new();
        let obj = Rc::new(RefCell::new(vec![0]));
        let result = Rc::new(RefCell::new(None));

        let rt = runtime.clone();
        let r = result.clone();
        let _sub = runtime.subscribe_fn(&obj, move || {
            *r.borrow_mut() = Some(rt.flush_now());
        });

        runtime.mark_mutated(&obj);
        runtime.run_microtasks();
        assert!(matches!(
            *result.borrow(),
            Some(Err(Error::FlushInProgress { .. }))
        ));
    }

    #[test]
    fn test_settled_drives_queue() {
        let runtime = Runtime::new();
        let obj = Rc::new(RefCell::new(vec![0]));
        let (count, _sub) = counting(&runtime, &obj);

        runtime.mark_mutated(&obj);
        block_on(runtime.settled());
        assert_eq!(count.get(), 1);
        assert!(!runtime.is_flush_scheduled());
    }

    #[test]
    fn test_prune_dead_objects() {
        let runtime = Runtime::new();
        let obj = Rc::new(RefCell::new(vec![0]));
        let (_, sub) = counting(&runtime, &obj);

        drop(obj);
        assert_eq!(runtime.observed_count(), 1);
        assert_eq!(runtime.prune(), 1);
        assert_eq!(runtime.observed_count(), 0);
        assert!(!sub.is_active());
        // The stale handle is still safe to use.
        sub.unsubscribe();
    }

    #[test]
    fn test_automatic_prune_interval() {
        let runtime = Runtime::builder()
            .config(Config::new().with_prune_interval(1))
            .build();
        let keep = Rc::new(RefCell::new(vec![0]));
        let gone = Rc::new(RefCell::new(vec![0]));
        let (_, _keep_sub) = counting(&runtime, &keep);
        let (_, _gone_sub) = counting(&runtime, &gone);

        drop(gone);
        runtime.mark_mutated(&keep);
        runtime.run_microtasks();
        assert_eq!(runtime.observed_count(), 1);
    }

    #[test]
    fn test_free_functions_use_thread_runtime() {
        let obj = Rc::new(RefCell::new(vec![0]));
        let count = Rc::new(Cell::new(0u32));
        let c = count.clone();
        let _sub = subscribe(&obj, Callback::new(move || c.set(c.get() + 1)));

        let before = observe(&obj);
        mark_mutated(&obj).borrow_mut().push(1);
        assert_ne!(observe(&obj), before);

        assert_eq!(flush_now(), Ok(true));
        assert_eq!(count.get(), 1);
        block_on(settled());
    }
}
