//! Subscription handles.

use crate::registry::SubscriptionId;
use crate::runtime::WeakRuntime;
use std::cell::Cell;
use std::fmt;

/// A live registration.
///
/// Dropping the handle unsubscribes. Use [`detach`](Subscription::detach) to
/// keep the registration for the lifetime of the runtime and manage it by ID.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    runtime: WeakRuntime,
    id: Cell<Option<SubscriptionId>>,
}

impl Subscription {
    pub(crate) fn new(runtime: WeakRuntime, id: SubscriptionId) -> Self {
        Self {
            runtime,
            id: Cell::new(Some(id)),
        }
    }

    /// A handle that refers to no registration.
    ///
    /// Returned when subscribing to something that cannot be tracked.
    pub fn inert() -> Self {
        Self {
            runtime: WeakRuntime::dangling(),
            id: Cell::new(None),
        }
    }

    /// Returns the registration ID, or `None` once unsubscribed.
    #[inline]
    pub fn id(&self) -> Option<SubscriptionId> {
        self.id.get()
    }

    /// Returns true if the registration still exists.
    ///
    /// False after [`unsubscribe`](Subscription::unsubscribe), after the
    /// object was pruned, or once the runtime is gone.
    pub fn is_active(&self) -> bool {
        match (self.id.get(), self.runtime.upgrade()) {
            (Some(id), Some(runtime)) => runtime.is_subscribed(id),
            _ => false,
        }
    }

    /// Removes the registration. Safe to call more than once.
    ///
    /// A delivery already scheduled for this registration is cancelled if it
    /// has not run yet.
    pub fn unsubscribe(&self) {
        if let Some(id) = self.id.take() {
            if let Some(runtime) = self.runtime.upgrade() {
                runtime.unsubscribe(id);
            }
        }
    }

    /// Releases the handle without unsubscribing.
    pub fn detach(self) -> Option<SubscriptionId> {
        self.id.take()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id.get())
            .finish()
    }
}
