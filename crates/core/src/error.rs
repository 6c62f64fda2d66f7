//! Error types for vermut.
//!
//! Core operations are total. The variants below report misuse that the
//! runtime refuses to guess about.

use crate::object::ObjectKey;
use core::fmt;

/// Result type alias for vermut operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Misuse reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A synchronous flush was requested from inside a running flush.
    FlushInProgress {
        /// Objects already queued for the next flush.
        pending: usize,
    },
    /// A selector was asked to re-evaluate while it was evaluating.
    ReentrantEvaluation {
        selector: ObjectKey,
    },
    /// The runtime an observer was created on no longer exists.
    RuntimeDropped {
        operation: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::FlushInProgress { pending } => {
                write!(
                    f,
                    "Flush already in progress ({} objects pending for the next flush)",
                    pending
                )
            }
            Error::ReentrantEvaluation { selector } => {
                write!(f, "Re-entrant evaluation of selector {}", selector)
            }
            Error::RuntimeDropped { operation } => {
                write!(f, "Runtime dropped before {}", operation)
            }
        }
    }
}

impl core::error::Error for Error {}

impl Error {
    /// Creates a flush-in-progress error.
    pub fn flush_in_progress(pending: usize) -> Self {
        Error::FlushInProgress { pending }
    }

    /// Creates a re-entrant evaluation error.
    pub fn reentrant_evaluation(selector: ObjectKey) -> Self {
        Error::ReentrantEvaluation { selector }
    }

    /// Creates a runtime-dropped error.
    pub fn runtime_dropped(operation: &'static str) -> Self {
        Error::RuntimeDropped { operation }
    }
}
