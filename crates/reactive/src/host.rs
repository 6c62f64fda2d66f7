//! Deferred-callback hosts.
//!
//! A runtime never flushes synchronously inside `mark_mutated`. It hands a
//! [`Microtask`] to its [`Host`], which runs it after the current
//! synchronous unit of work:
//!
//! - [`MicrotaskQueue`]: run-to-completion FIFO drained by the application
//!   (the default host).
//! - [`LocalSpawnHost`]: posts onto a `futures` local executor, such as a
//!   `LocalPool` driving the application's event loop.
//! - `PromiseHost` (feature `wasm`): the JavaScript microtask queue.

use futures::task::{LocalSpawn, LocalSpawnExt};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;

/// A deferred unit of work.
pub type Microtask = Box<dyn FnOnce()>;

/// Something that can run a task after the current call stack unwinds.
pub trait Host {
    /// Schedules `task`. Must not run it before returning.
    fn defer(&self, task: Microtask);

    /// Runs tasks this host holds itself. Hosts driven by an external event
    /// loop return 0.
    fn run_pending(&self) -> usize {
        0
    }
}

/// A run-to-completion microtask queue.
///
/// Tasks deferred while the queue drains run in the same drain, after the
/// tasks already queued.
#[derive(Default)]
pub struct MicrotaskQueue {
    tasks: RefCell<VecDeque<Microtask>>,
    draining: Cell<bool>,
}

impl MicrotaskQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of queued tasks.
    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Returns true if no task is queued.
    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }
}

impl Host for MicrotaskQueue {
    fn defer(&self, task: Microtask) {
        self.tasks.borrow_mut().push_back(task);
    }

    /// Drains the queue. A nested call from inside a running task returns 0
    /// and leaves the work to the outer drain.
    fn run_pending(&self) -> usize {
        if self.draining.replace(true) {
            return 0;
        }
        let _draining = Draining(&self.draining);

        let mut ran = 0;
        loop {
            // Borrow only to pop; tasks may defer more work.
            let task = self.tasks.borrow_mut().pop_front();
            match task {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }

        ran
    }
}

/// Clears the draining flag, also when a task panics.
struct Draining<'a>(&'a Cell<bool>);

impl Drop for Draining<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl fmt::Debug for MicrotaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MicrotaskQueue")
            .field("queued", &self.len())
            .field("draining", &self.draining.get())
            .finish()
    }
}

/// Host that spawns deferred work onto a `futures` local executor.
pub struct LocalSpawnHost<S> {
    spawner: S,
}

impl<S: LocalSpawn> LocalSpawnHost<S> {
    /// Wraps a local spawner, e.g. `LocalPool::spawner()`.
    pub fn new(spawner: S) -> Self {
        Self { spawner }
    }
}

impl<S: LocalSpawn> Host for LocalSpawnHost<S> {
    fn defer(&self, task: Microtask) {
        if let Err(err) = self.spawner.spawn_local(async move { task() }) {
            tracing::warn!(%err, "executor is shut down; deferred flush dropped");
        }
    }
}

impl<S> fmt::Debug for LocalSpawnHost<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSpawnHost").finish_non_exhaustive()
    }
}

/// Host that queues deferred work on the JavaScript microtask queue via
/// `Promise.resolve().then(..)`.
#[cfg(feature = "wasm")]
#[derive(Debug, Default)]
pub struct PromiseHost;

#[cfg(feature = "wasm")]
impl Host for PromiseHost {
    fn defer(&self, task: Microtask) {
        use wasm_bindgen::prelude::*;

        let callback: Closure<dyn FnMut(JsValue)> = Closure::once(move |_: JsValue| task());
        let _ = js_sys::Promise::resolve(&JsValue::UNDEFINED).then(&callback);
        callback.forget();
    }
}
