//! Vermut Core - identity and version primitives for the vermut change-notification engine.
//!
//! This crate provides the foundational types shared by the reactive runtime:
//!
//! - `ObjectKey`: Identity of a trackable object (the address of its `Rc` allocation)
//! - `ObjectRef`: An identity key paired with a `Weak` handle, so the object can be
//!   watched without being kept alive
//! - `Trackable`: Values that can be observed, marked mutated and subscribed to
//! - `Version`: Opaque version token, compared by identity only
//! - `Error`: Misuse reports surfaced by the runtime
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use vermut_core::{ObjectKey, Trackable, Version};
//!
//! let todos = Rc::new(RefCell::new(vec!["write docs"]));
//! let key = todos.object_key().unwrap();
//!
//! assert_eq!(key, ObjectKey::of(&todos));
//! assert_eq!(Version::identity(&todos), Version::Identity(key));
//! assert_eq!(Version::identity(&None::<Rc<u8>>), Version::Untracked);
//! ```

#![no_std]

extern crate alloc;

mod error;
mod object;
mod version;

pub use error::{Error, Result};
pub use object::{ObjectKey, ObjectRef, Trackable};
pub use version::{StampId, Version};
