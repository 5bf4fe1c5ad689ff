//! In-memory record stores for contacts and notes.
//!
//! # Responsibility
//! - Own the keyed collections a session mutates.
//! - Expose only add/find/search/delete style operations, never the
//!   underlying collection.
//!
//! # Invariants
//! - Keys are unique per store (case-sensitive identity).
//! - Iteration follows insertion order.
//! - Failed operations never mutate the store.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod contact_store;
pub mod note_store;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure for keyed operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A record with this exact key already exists.
    DuplicateKey(String),
    /// No record matches the requested key.
    NotFound(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateKey(key) => write!(f, "record `{key}` already exists"),
            Self::NotFound(key) => write!(f, "record `{key}` does not exist"),
        }
    }
}

impl Error for StoreError {}
