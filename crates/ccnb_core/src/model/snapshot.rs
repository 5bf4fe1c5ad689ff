//! Snapshot: the unit of persistence.

use crate::repo::contact_store::ContactStore;
use crate::repo::note_store::NoteStore;

/// The pair of stores one user session owns and saves as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub contacts: ContactStore,
    pub notes: NoteStore,
}

impl Snapshot {
    /// Fresh snapshot with both stores empty.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty() && self.notes.is_empty()
    }
}
