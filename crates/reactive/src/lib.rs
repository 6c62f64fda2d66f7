//! Vermut Reactive - batched change notification for in-place mutated objects.
//!
//! Objects are mutated directly and then *marked*. Observers that subscribed
//! to a marked object are notified in one deferred flush, at most once per
//! flush, however many of their objects were touched in between.
//!
//! # Core Concepts
//!
//! - `Runtime`: owns versions, subscriptions and the pending batch
//! - `Version`: cheap token that changes every time an object is marked
//! - `Subscription`: RAII handle of one registration
//! - `Host`: where deferred flushes run (`MicrotaskQueue` by default)
//! - `Selector`: cached derived value with automatic dependency tracking
//! - `Binding`: render-on-change consumer of an `ExternalStore`
//!
//! # Example
//!
//! ```
//! use std::cell::{Cell, RefCell};
//! use std::rc::Rc;
//! use vermut_reactive::Runtime;
//!
//! let runtime = Runtime::new();
//! let todos = Rc::new(RefCell::new(vec!["write docs"]));
//! let calls = Rc::new(Cell::new(0));
//!
//! let c = calls.clone();
//! let _sub = runtime.subscribe_fn(&todos, move || c.set(c.get() + 1));
//!
//! let before = runtime.observe(&todos);
//! runtime.mark_mutated(&todos).borrow_mut().push("review");
//! runtime.mark_mutated(&todos).borrow_mut().push("ship");
//! assert_ne!(runtime.observe(&todos), before);
//!
//! // Nothing is delivered until the deferred flush runs.
//! assert_eq!(calls.get(), 0);
//! runtime.run_microtasks();
//! assert_eq!(calls.get(), 1);
//! ```

pub mod batch;
pub mod binding;
pub mod config;
pub mod host;
pub mod registry;
pub mod runtime;
pub mod selector;
pub mod subscription;
pub mod tracker;
pub mod version_store;

pub use binding::{register_observer, Binding, ExternalStore, ObjectStore};
pub use config::{Config, SentinelPolicy};
#[cfg(feature = "wasm")]
pub use host::PromiseHost;
pub use host::{Host, LocalSpawnHost, Microtask, MicrotaskQueue};
pub use registry::{Callback, SubscriptionId, SubscriptionRegistry};
pub use runtime::{
    flush_now, mark_mutated, observe, settled, subscribe, Runtime, RuntimeBuilder, Settled,
};
pub use selector::Selector;
pub use subscription::Subscription;
pub use tracker::{run_tracked, DependencyDiff, DependencySet, Tracker};

// Re-export commonly used types from dependencies
pub use vermut_core::{Error, ObjectKey, ObjectRef, Result, StampId, Trackable, Version};
