//! External store bindings.
//!
//! A UI layer integrates through the same contract it would use for any
//! external store: subscribe with a change callback, read a snapshot, and
//! re-render only if the snapshot differs from the one last rendered.
//! [`register_observer`] implements the consumer side of that contract.
//!
//! ```
//! use std::cell::{Cell, RefCell};
//! use std::rc::Rc;
//! use vermut_reactive::{register_observer, ObjectStore, Runtime};
//!
//! let runtime = Runtime::new();
//! let todos = Rc::new(RefCell::new(vec!["write docs"]));
//! let renders = Rc::new(Cell::new(0));
//!
//! let r = renders.clone();
//! let binding = register_observer(ObjectStore::new(&runtime, todos.clone()), move |_| {
//!     r.set(r.get() + 1);
//! });
//!
//! runtime.mark_mutated(&todos).borrow_mut().push("ship");
//! runtime.run_microtasks();
//! assert_eq!(renders.get(), 1);
//!
//! binding.unmount();
//! ```

use crate::registry::Callback;
use crate::runtime::Runtime;
use crate::selector::Selector;
use crate::subscription::Subscription;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use tracing::trace;
use vermut_core::{Trackable, Version};

/// The store side of a binding.
pub trait ExternalStore {
    /// Value compared between renders.
    type Snapshot: Clone + PartialEq;

    /// Registers `on_change`, to be called after the store changed.
    fn subscribe(&self, on_change: Callback) -> Subscription;

    /// Returns the current snapshot.
    fn snapshot(&self) -> Self::Snapshot;
}

/// Exposes one trackable object as an external store.
///
/// The snapshot is the object's version token, so it changes exactly when
/// the object is marked mutated.
#[derive(Clone)]
pub struct ObjectStore<O> {
    runtime: Runtime,
    object: O,
}

impl<O: Trackable> ObjectStore<O> {
    pub fn new(runtime: &Runtime, object: O) -> Self {
        Self {
            runtime: runtime.clone(),
            object,
        }
    }

    /// Returns the wrapped object.
    pub fn object(&self) -> &O {
        &self.object
    }
}

impl<O: Trackable> ExternalStore for ObjectStore<O> {
    type Snapshot = Version;

    fn subscribe(&self, on_change: Callback) -> Subscription {
        self.runtime.subscribe(&self.object, on_change)
    }

    fn snapshot(&self) -> Version {
        self.runtime.observe(&self.object)
    }
}

impl<O> fmt::Debug for ObjectStore<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStore").finish_non_exhaustive()
    }
}

impl<T: Clone + PartialEq + 'static> ExternalStore for Selector<T> {
    type Snapshot = T;

    fn subscribe(&self, on_change: Callback) -> Subscription {
        match self.runtime() {
            Some(runtime) => runtime.subscribe(self, on_change),
            None => Subscription::inert(),
        }
    }

    fn snapshot(&self) -> T {
        self.get()
    }
}

struct BindingInner<S: ExternalStore> {
    store: S,
    render: Box<dyn Fn(&S::Snapshot)>,
    rendered: RefCell<S::Snapshot>,
    renders: Cell<u64>,
    subscription: RefCell<Option<Subscription>>,
}

impl<S: ExternalStore> BindingInner<S> {
    fn on_change(&self) {
        let snapshot = self.store.snapshot();
        if *self.rendered.borrow() == snapshot {
            return;
        }

        *self.rendered.borrow_mut() = snapshot.clone();
        self.renders.set(self.renders.get() + 1);
        trace!(renders = self.renders.get(), "binding re-rendered");
        (self.render)(&snapshot);
    }
}

/// A mounted observer of an [`ExternalStore`].
///
/// Unmounts when dropped.
pub struct Binding<S: ExternalStore> {
    inner: Rc<BindingInner<S>>,
}

impl<S: ExternalStore + 'static> Binding<S> {
    /// Returns the current snapshot of the store.
    pub fn current(&self) -> S::Snapshot {
        self.inner.store.snapshot()
    }

    /// Returns the snapshot of the last render, or of the mount.
    pub fn last_rendered(&self) -> S::Snapshot {
        self.inner.rendered.borrow().clone()
    }

    /// Returns how many times the render callback ran.
    pub fn renders(&self) -> u64 {
        self.inner.renders.get()
    }

    /// Returns the store.
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    /// Returns true until unmounted.
    pub fn is_mounted(&self) -> bool {
        self.inner.subscription.borrow().is_some()
    }

    /// Stops observing the store. Safe to call more than once.
    pub fn unmount(&self) {
        let subscription = self.inner.subscription.borrow_mut().take();
        drop(subscription);
    }
}

impl<S: ExternalStore> Drop for Binding<S> {
    fn drop(&mut self) {
        let subscription = self.inner.subscription.borrow_mut().take();
        drop(subscription);
    }
}

impl<S: ExternalStore> fmt::Debug for Binding<S>
where
    S::Snapshot: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("rendered", &*self.inner.rendered.borrow())
            .field("renders", &self.inner.renders.get())
            .field("mounted", &self.inner.subscription.borrow().is_some())
            .finish()
    }
}

/// Mounts an observer on `store`.
///
/// The snapshot at mount time counts as rendered. After that, `render` runs
/// once per notification whose snapshot differs from the last rendered one.
pub fn register_observer<S, F>(store: S, render: F) -> Binding<S>
where
    S: ExternalStore + 'static,
    F: Fn(&S::Snapshot) + 'static,
{
    let inner = Rc::new(BindingInner {
        rendered: RefCell::new(store.snapshot()),
        store,
        render: Box::new(render),
        renders: Cell::new(0),
        subscription: RefCell::new(None),
    });

    let weak = Rc::downgrade(&inner);
    let subscription = inner.store.subscribe(Callback::new(move || {
        if let Some(inner) = weak.upgrade() {
            inner.on_change();
        }
    }));
    *inner.subscription.borrow_mut() = Some(subscription);

    Binding { inner }
}
