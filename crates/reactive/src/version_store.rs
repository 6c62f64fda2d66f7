//! Version store.
//!
//! Maps object identity to the stamp of its latest mutation. Objects that
//! were never stamped have no entry; their version is their identity, so no
//! token is allocated until the first mutation.

use hashbrown::HashMap;
use vermut_core::{ObjectKey, StampId, Version};

/// Per-object version tokens.
///
/// The store only ever holds keys. Liveness of the objects themselves is
/// tracked by the registry's `Weak` handles, so an entry never keeps a value
/// alive.
#[derive(Debug, Default)]
pub struct VersionStore {
    stamps: HashMap<ObjectKey, StampId>,
}

impl VersionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            stamps: HashMap::new(),
        }
    }

    /// Returns the current version of `key`.
    #[inline]
    pub fn read(&self, key: ObjectKey) -> Version {
        self.stamps
            .get(&key)
            .map_or(Version::Identity(key), |stamp| Version::Stamped(*stamp))
    }

    /// Issues a fresh token for `key`, discarding the previous one.
    pub fn stamp(&mut self, key: ObjectKey) -> Version {
        let stamp = StampId::fresh();
        self.stamps.insert(key, stamp);
        Version::Stamped(stamp)
    }

    /// Drops the entry for `key`, restoring its identity version.
    ///
    /// Returns true if an entry existed.
    pub fn forget(&mut self, key: ObjectKey) -> bool {
        self.stamps.remove(&key).is_some()
    }

    /// Returns the number of stamped objects.
    #[inline]
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    /// Returns true if no object is stamped.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }
}
