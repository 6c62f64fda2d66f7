//! Subscription registry.
//!
//! This module provides `SubscriptionRegistry`, which maps each observed
//! object to the callbacks interested in it. Entries are created on the
//! first subscription and removed with the last one, so an object with no
//! subscribers leaves no trace behind.

use hashbrown::HashMap;
use std::fmt;
use std::mem;
use std::rc::Rc;
use vermut_core::{ObjectKey, ObjectRef};

/// Unique identifier for a registration.
pub type SubscriptionId = u64;

/// A change callback.
///
/// Cloning a `Callback` keeps its identity. Within one flush, a callback
/// registered on several changed objects is delivered once, so an observer
/// watching several objects should register clones of one `Callback`.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn()>);

impl Callback {
    /// Wraps a closure into a new callback identity.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self(Rc::new(f))
    }

    /// Invokes the callback.
    #[inline]
    pub fn call(&self) {
        (self.0)()
    }

    /// Identity key used to deduplicate deliveries.
    #[inline]
    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:#x})", self.identity())
    }
}

/// Outcome of removing a registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    /// No registration with that ID exists.
    NotFound,
    /// Removed; the object still has subscribers.
    Removed,
    /// Removed the last subscriber of the object; its entry is gone.
    Emptied(ObjectKey),
}

struct Slot {
    id: SubscriptionId,
    callback: Callback,
}

struct ObjectEntry {
    object: ObjectRef,
    slots: Vec<Slot>,
}

/// Maps observed objects to their subscribers.
pub struct SubscriptionRegistry {
    /// Object -> registrations in subscription order
    objects: HashMap<ObjectKey, ObjectEntry>,
    /// Registration -> object (for removal by ID)
    index: HashMap<SubscriptionId, ObjectKey>,
    /// Next registration ID to assign
    next_id: SubscriptionId,
    /// Callbacks of removed registrations, not yet dropped
    released: Vec<Callback>,
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            index: HashMap::new(),
            next_id: 1,
            released: Vec::new(),
        }
    }

    /// Registers `callback` for `object` and returns the registration ID.
    ///
    /// Registering the same callback twice for one object creates two
    /// independent registrations.
    pub fn add(&mut self, object: ObjectRef, callback: Callback) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;

        let key = object.key();
        self.objects
            .entry(key)
            .or_insert_with(|| ObjectEntry {
                object,
                slots: Vec::new(),
            })
            .slots
            .push(Slot { id, callback });
        self.index.insert(id, key);

        id
    }

    /// Removes one registration.
    ///
    /// The callback is kept until [`take_released`](Self::take_released).
    pub fn remove(&mut self, id: SubscriptionId) -> Removal {
        let Some(key) = self.index.remove(&id) else {
            return Removal::NotFound;
        };
        let Some(entry) = self.objects.get_mut(&key) else {
            return Removal::Removed;
        };

        if let Some(pos) = entry.slots.iter().position(|slot| slot.id == id) {
            let slot = entry.slots.remove(pos);
            self.released.push(slot.callback);
        }
        if entry.slots.is_empty() {
            self.objects.remove(&key);
            Removal::Emptied(key)
        } else {
            Removal::Removed
        }
    }

    /// Removes every registration of `key`. Returns how many were removed.
    pub fn remove_all(&mut self, key: ObjectKey) -> usize {
        match self.objects.remove(&key) {
            Some(entry) => {
                let removed = entry.slots.len();
                for slot in entry.slots {
                    self.index.remove(&slot.id);
                    self.released.push(slot.callback);
                }
                removed
            }
            None => 0,
        }
    }

    /// Hands over the callbacks of removed registrations.
    ///
    /// Dropping a callback can drop a `Subscription` it captured, which
    /// calls back into the runtime, so the caller drops these only after
    /// releasing its own borrow of the registry.
    pub fn take_released(&mut self) -> Vec<Callback> {
        mem::take(&mut self.released)
    }

    /// Returns true if `key` has at least one subscriber.
    #[inline]
    pub fn contains(&self, key: ObjectKey) -> bool {
        self.objects.contains_key(&key)
    }

    /// Returns true if the registration still exists.
    #[inline]
    pub fn is_live(&self, id: SubscriptionId) -> bool {
        self.index.contains_key(&id)
    }

    /// Returns the number of registrations for `key`.
    pub fn subscriber_count(&self, key: ObjectKey) -> usize {
        self.objects
            .get(&key)
            .map(|entry| entry.slots.len())
            .unwrap_or(0)
    }

    /// Returns the number of observed objects.
    #[inline]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Returns the total number of registrations.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if nothing is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Iterates over the registrations of `key` in subscription order.
    pub fn subscribers(
        &self,
        key: ObjectKey,
    ) -> impl Iterator<Item = (SubscriptionId, &Callback)> + '_ {
        self.objects
            .get(&key)
            .into_iter()
            .flat_map(|entry| entry.slots.iter().map(|slot| (slot.id, &slot.callback)))
    }

    /// Returns the keys of objects that were dropped while still subscribed.
    pub fn dead_objects(&self) -> Vec<ObjectKey> {
        self.objects
            .iter()
            .filter(|(_, entry)| !entry.object.is_alive())
            .map(|(key, _)| *key)
            .collect()
    }
}

impl fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("objects", &self.objects.len())
            .field("registrations", &self.index.len())
            .finish()
    }
}
