//! Pending batch of mutated objects.

use hashbrown::HashSet;
use std::mem;
use vermut_core::ObjectKey;

/// Objects marked mutated since the last flush.
///
/// Insertion-ordered and deduplicated by identity. [`take`](Batch::take)
/// empties the batch and clears the scheduled flag in one step, so marks made
/// while a flush runs start a new batch.
#[derive(Debug, Default)]
pub struct Batch {
    order: Vec<ObjectKey>,
    members: HashSet<ObjectKey>,
    scheduled: bool,
}

impl Batch {
    /// Creates an empty, unscheduled batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `key`. Returns false if it was already pending.
    pub fn push(&mut self, key: ObjectKey) -> bool {
        if self.members.insert(key) {
            self.order.push(key);
            true
        } else {
            false
        }
    }

    /// Marks the batch as scheduled.
    ///
    /// Returns true if it was not scheduled before, in which case the caller
    /// must arrange for a flush.
    #[inline]
    pub fn schedule(&mut self) -> bool {
        !mem::replace(&mut self.scheduled, true)
    }

    /// Returns true if a flush is scheduled for this batch.
    #[inline]
    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Takes the pending keys in insertion order and resets the batch.
    pub fn take(&mut self) -> Vec<ObjectKey> {
        self.members.clear();
        self.scheduled = false;
        mem::take(&mut self.order)
    }

    /// Returns true if `key` is pending.
    #[inline]
    pub fn contains(&self, key: ObjectKey) -> bool {
        self.members.contains(&key)
    }

    /// Returns the number of pending objects.
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if nothing is pending.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
