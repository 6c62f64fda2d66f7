//! Object identity for trackable values.
//!
//! Objects are keyed by the address of their `Rc` allocation. Two objects
//! are never considered equal by value, only by identity.

use alloc::rc::{Rc, Weak};
use core::any::Any;
use core::fmt;

/// Identity of a trackable object.
///
/// The key is the address of the object's `Rc` allocation. It stays unique
/// while any [`ObjectRef`] for the object exists: the `Weak` inside keeps the
/// allocation reserved (but not the value) after the last strong reference
/// is gone, so the address cannot be handed out to a new object.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey(usize);

impl ObjectKey {
    /// Returns the identity key of an `Rc` allocation.
    #[inline]
    pub fn of<T: ?Sized>(rc: &Rc<T>) -> Self {
        Self(Rc::as_ptr(rc).cast::<()>() as usize)
    }

    /// Returns the raw address backing this key.
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Debug for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectKey({:#x})", self.0)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A non-owning reference to a trackable object.
#[derive(Clone)]
pub struct ObjectRef {
    key: ObjectKey,
    handle: Weak<dyn Any>,
}

impl ObjectRef {
    /// Creates a reference to the object behind `rc` without retaining its value.
    pub fn new<T: 'static>(rc: &Rc<T>) -> Self {
        let weak: Weak<T> = Rc::downgrade(rc);
        let handle: Weak<dyn Any> = weak;
        Self {
            key: ObjectKey::of(rc),
            handle,
        }
    }

    /// Returns the identity key.
    #[inline]
    pub fn key(&self) -> ObjectKey {
        self.key
    }

    /// Returns true while the application still holds the object.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.handle.strong_count() > 0
    }

    /// Upgrades to a strong, type-erased reference if the object is alive.
    pub fn upgrade(&self) -> Option<Rc<dyn Any>> {
        self.handle.upgrade()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ObjectRef {}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("key", &self.key)
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// A value that can be observed, marked mutated and subscribed to.
///
/// Implementations for "absent" values (`None`, `()`) return `None`, which
/// the runtime treats as a documented no-op. This lets callers pass
/// possibly-missing objects without branching.
pub trait Trackable {
    /// Returns a non-owning reference to the tracked object, if any.
    fn object_ref(&self) -> Option<ObjectRef>;

    /// Returns the identity key of the tracked object, if any.
    ///
    /// Cheaper than [`object_ref`](Trackable::object_ref) for lookups that
    /// never need to retain the object.
    fn object_key(&self) -> Option<ObjectKey> {
        self.object_ref().map(|object| object.key())
    }
}

impl<T: 'static> Trackable for Rc<T> {
    #[inline]
    fn object_ref(&self) -> Option<ObjectRef> {
        Some(ObjectRef::new(self))
    }

    #[inline]
    fn object_key(&self) -> Option<ObjectKey> {
        Some(ObjectKey::of(self))
    }
}

impl<R: Trackable> Trackable for Option<R> {
    fn object_ref(&self) -> Option<ObjectRef> {
        self.as_ref().and_then(Trackable::object_ref)
    }

    fn object_key(&self) -> Option<ObjectKey> {
        self.as_ref().and_then(Trackable::object_key)
    }
}

impl<R: Trackable + ?Sized> Trackable for &R {
    fn object_ref(&self) -> Option<ObjectRef> {
        (**self).object_ref()
    }

    fn object_key(&self) -> Option<ObjectKey> {
        (**self).object_key()
    }
}

impl Trackable for ObjectRef {
    fn object_ref(&self) -> Option<ObjectRef> {
        Some(self.clone())
    }

    fn object_key(&self) -> Option<ObjectKey> {
        Some(self.key)
    }
}

impl Trackable for () {
    fn object_ref(&self) -> Option<ObjectRef> {
        None
    }
}
