//! Version tokens.
//!
//! A `Version` answers "did this object change since I last looked?".
//! Tokens are compared by identity only: they carry no ordering and no
//! content, and a fresh `StampId` is issued for every mutation.

use crate::object::{ObjectKey, Trackable};
use core::sync::atomic::{AtomicU64, Ordering};

/// Process-wide stamp counter. Never reset, so stamps are never reused.
static NEXT_STAMP: AtomicU64 = AtomicU64::new(1);

/// Identity of a single mutation event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StampId(u64);

impl StampId {
    /// Issues a stamp that has never been issued before.
    #[inline]
    pub fn fresh() -> Self {
        Self(NEXT_STAMP.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw stamp number.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Opaque version token of a trackable object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Version {
    /// The value is not trackable; its version never changes.
    Untracked,
    /// The object was never marked mutated while observed. The token is the
    /// object's own identity.
    Identity(ObjectKey),
    /// The object was marked mutated; the token is that mutation's stamp.
    Stamped(StampId),
}

impl Version {
    /// The version of a value that has never been stamped.
    pub fn identity<O: Trackable + ?Sized>(object: &O) -> Self {
        object
            .object_key()
            .map_or(Version::Untracked, Version::Identity)
    }

    /// Returns true if this token was issued by a mutation.
    #[inline]
    pub fn is_stamped(&self) -> bool {
        matches!(self, Version::Stamped(_))
    }

    /// Returns true for the token of a non-trackable value.
    #[inline]
    pub fn is_untracked(&self) -> bool {
        matches!(self, Version::Untracked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;

    #[test]
    fn test_fresh_stamps_are_distinct() {
        let a = StampId::fresh();
        let b = StampId::fresh();
        assert_ne!(a, b);
        assert!(b.get() > a.get());
    }

    #[test]
    fn test_identity_version() {
        let obj = Rc::new(5u8);
        let v = Version::identity(&obj);
        assert_eq!(v, Version::Identity(ObjectKey::of(&obj)));
        assert!(!v.is_stamped());
        assert_eq!(v, Version::identity(&obj));
    }

    #[test]
    fn test_untracked_version() {
        let v = Version::identity(&());
        assert!(v.is_untracked());
        assert_eq!(v, Version::identity(&None::<Rc<u8>>));
    }

    #[test]
    fn test_stamped_differs_from_identity() {
        let obj = Rc::new(5u8);
        let stamped = Version::Stamped(StampId::fresh());
        assert!(stamped.is_stamped());
        assert_ne!(stamped, Version::identity(&obj));
    }
}
