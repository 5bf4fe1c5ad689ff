//! Domain records for the contact book and the note book.
//!
//! # Responsibility
//! - Define the records a session edits and a snapshot persists.
//! - Route every field mutation through `crate::validate`.
//!
//! # Invariants
//! - A record never holds an unvalidated phone or e-mail.
//! - Record keys (contact name, note title) are never blank.

pub mod contact;
pub mod note;
pub mod snapshot;
