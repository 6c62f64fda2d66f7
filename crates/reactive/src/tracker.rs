//! Dependency tracking.
//!
//! A [`Tracker`] is the recording scope of one evaluation. Reads go through
//! [`Tracker::track`], which records the object and hands it back, so a
//! selector is written as a plain read function:
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use vermut_reactive::run_tracked;
//!
//! let prices = Rc::new(RefCell::new(vec![3, 4]));
//! let (total, deps) = run_tracked(|t| t.track(&prices).borrow().iter().sum::<i32>());
//!
//! assert_eq!(total, 7);
//! assert_eq!(deps.len(), 1);
//! ```
//!
//! The scope is passed explicitly, so nested evaluations never share a set.

use hashbrown::HashSet;
use std::fmt;
use std::slice;
use vermut_core::{ObjectKey, ObjectRef, Trackable};

/// Objects touched by one evaluation, in first-touch order.
#[derive(Clone, Default)]
pub struct DependencySet {
    order: Vec<ObjectRef>,
    keys: HashSet<ObjectKey>,
}

impl DependencySet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `object`. Returns false if it was already present.
    pub fn insert(&mut self, object: ObjectRef) -> bool {
        if self.keys.insert(object.key()) {
            self.order.push(object);
            true
        } else {
            false
        }
    }

    /// Returns true if `key` is in the set.
    #[inline]
    pub fn contains(&self, key: ObjectKey) -> bool {
        self.keys.contains(&key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates in first-touch order.
    pub fn iter(&self) -> slice::Iter<'_, ObjectRef> {
        self.order.iter()
    }

    /// Iterates over the keys in first-touch order.
    pub fn keys(&self) -> impl Iterator<Item = ObjectKey> + '_ {
        self.order.iter().map(ObjectRef::key)
    }

    /// Computes what changed relative to `previous`.
    ///
    /// Objects present in both sets appear in neither list.
    pub fn diff(&self, previous: &DependencySet) -> DependencyDiff {
        DependencyDiff {
            added: self
                .order
                .iter()
                .filter(|object| !previous.contains(object.key()))
                .cloned()
                .collect(),
            removed: previous
                .keys()
                .filter(|key| !self.contains(*key))
                .collect(),
        }
    }
}

impl FromIterator<ObjectRef> for DependencySet {
    fn from_iter<I: IntoIterator<Item = ObjectRef>>(iter: I) -> Self {
        let mut set = Self::new();
        for object in iter {
            set.insert(object);
        }
        set
    }
}

impl<'a> IntoIterator for &'a DependencySet {
    type Item = &'a ObjectRef;
    type IntoIter = slice::Iter<'a, ObjectRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for DependencySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}

/// Difference between two dependency sets.
#[derive(Clone, Debug, Default)]
pub struct DependencyDiff {
    /// Newly touched objects, to subscribe.
    pub added: Vec<ObjectRef>,
    /// Objects no longer touched, to unsubscribe.
    pub removed: Vec<ObjectKey>,
}

impl DependencyDiff {
    /// Returns true if both sets hold the same objects.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Recording scope for one evaluation.
#[derive(Debug, Default)]
pub struct Tracker {
    dependencies: DependencySet,
}

impl Tracker {
    /// Creates a tracker with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `object` as a dependency and returns it.
    ///
    /// Non-trackable input is returned without being recorded.
    pub fn track<'a, O: Trackable + ?Sized>(&mut self, object: &'a O) -> &'a O {
        if let Some(object) = object.object_ref() {
            self.dependencies.insert(object);
        }
        object
    }

    /// Returns what has been recorded so far.
    #[inline]
    pub fn dependencies(&self) -> &DependencySet {
        &self.dependencies
    }

    /// Consumes the tracker, returning the recorded set.
    pub fn into_dependencies(self) -> DependencySet {
        self.dependencies
    }
}

/// Runs `f` in a fresh recording scope.
///
/// Returns the result of `f` and every object it passed through
/// [`Tracker::track`].
pub fn run_tracked<T, F>(f: F) -> (T, DependencySet)
where
    F: FnOnce(&mut Tracker) -> T,
{
    let mut tracker = Tracker::new();
    let value = f(&mut tracker);
    (value, tracker.into_dependencies())
}
