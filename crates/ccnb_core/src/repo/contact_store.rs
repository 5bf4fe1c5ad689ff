//! Contact store with case-insensitive lookup and ordered field search.
//!
//! # Invariants
//! - Two records never share the exact same name.
//! - `find` resolves names case-insensitively; the earliest inserted record
//!   wins when several names differ only by case.
//! - `search` tests fields in the fixed order name, phones, birthday,
//!   emails, address and stops at the first match per record.

use super::{StoreError, StoreResult};
use crate::model::contact::ContactRecord;
use log::debug;

/// Insertion-ordered collection of contact records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactStore {
    records: Vec<ContactRecord>,
}

impl ContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record; fails if the exact name is taken.
    pub fn add(&mut self, record: ContactRecord) -> StoreResult<()> {
        if self.records.iter().any(|item| item.name() == record.name()) {
            return Err(StoreError::DuplicateKey(record.name().to_string()));
        }
        self.records.push(record);
        debug!(
            "event=contact_add module=repo status=ok count={}",
            self.records.len()
        );
        Ok(())
    }

    /// Case-insensitive exact name lookup.
    pub fn find(&self, name: &str) -> Option<&ContactRecord> {
        self.position(name).map(|index| &self.records[index])
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut ContactRecord> {
        self.position(name).map(|index| &mut self.records[index])
    }

    /// Returns every record with at least one field containing `pattern`.
    ///
    /// Matching is case-insensitive except for phones, which are compared
    /// as-is because they are stored normalized.
    pub fn search(&self, pattern: &str) -> Vec<&ContactRecord> {
        let needle = pattern.to_lowercase();
        self.records
            .iter()
            .filter(|record| record_matches(record, pattern, &needle))
            .collect()
    }

    /// Removes the record `find(name)` resolves to.
    pub fn delete(&mut self, name: &str) -> StoreResult<ContactRecord> {
        let index = self
            .position(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        let removed = self.records.remove(index);
        debug!(
            "event=contact_delete module=repo status=ok count={}",
            self.records.len()
        );
        Ok(removed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContactRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let wanted = name.to_lowercase();
        self.records
            .iter()
            .position(|record| record.name().to_lowercase() == wanted)
    }
}

fn record_matches(record: &ContactRecord, pattern: &str, needle: &str) -> bool {
    if record.name().to_lowercase().contains(needle) {
        return true;
    }
    if record.phones().iter().any(|phone| phone.contains(pattern)) {
        return true;
    }
    if record
        .birthday_display()
        .is_some_and(|birthday| birthday.contains(needle))
    {
        return true;
    }
    if record
        .emails()
        .iter()
        .any(|email| email.to_lowercase().contains(needle))
    {
        return true;
    }
    record
        .address()
        .is_some_and(|address| address.to_lowercase().contains(needle))
}
