//! Note store keyed by exact title.

use super::{StoreError, StoreResult};
use crate::model::note::NoteRecord;
use log::debug;
use std::cmp::Reverse;

/// Insertion-ordered collection of notes with unique titles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteStore {
    notes: Vec<NoteRecord>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, note: NoteRecord) -> StoreResult<()> {
        if self.position(note.title()).is_some() {
            return Err(StoreError::DuplicateKey(note.title().to_string()));
        }
        self.notes.push(note);
        debug!(
            "event=note_add module=repo status=ok count={}",
            self.notes.len()
        );
        Ok(())
    }

    pub fn find(&self, title: &str) -> Option<&NoteRecord> {
        self.position(title).map(|index| &self.notes[index])
    }

    pub fn find_mut(&mut self, title: &str) -> Option<&mut NoteRecord> {
        self.position(title).map(|index| &mut self.notes[index])
    }

    pub fn edit_content(&mut self, title: &str, content: impl Into<String>) -> StoreResult<()> {
        self.require_mut(title)?.edit_content(content);
        Ok(())
    }

    pub fn delete(&mut self, title: &str) -> StoreResult<NoteRecord> {
        let index = self
            .position(title)
            .ok_or_else(|| StoreError::NotFound(title.to_string()))?;
        Ok(self.notes.remove(index))
    }

    pub fn add_tags<'a>(
        &mut self,
        title: &str,
        tags: impl IntoIterator<Item = &'a str>,
    ) -> StoreResult<()> {
        let note = self.require_mut(title)?;
        for tag in tags {
            note.add_tag(tag);
        }
        Ok(())
    }

    pub fn remove_tag(&mut self, title: &str, tag: &str) -> StoreResult<()> {
        self.require_mut(title)?.remove_tag(tag);
        Ok(())
    }

    /// Notes whose title, content or tags contain `keyword` (any case).
    pub fn search(&self, keyword: &str) -> Vec<&NoteRecord> {
        self.notes
            .iter()
            .filter(|note| note.matches_keyword(keyword))
            .collect()
    }

    /// Notes carrying every tag in `tags` (exact tag match).
    pub fn with_tags(&self, tags: &[&str]) -> Vec<&NoteRecord> {
        self.notes
            .iter()
            .filter(|note| tags.iter().all(|tag| note.has_tag(tag)))
            .collect()
    }

    /// Notes ordered by tag count, most tags first; ties keep insertion order.
    pub fn sorted_by_tag_count(&self) -> Vec<&NoteRecord> {
        let mut sorted: Vec<&NoteRecord> = self.notes.iter().collect();
        sorted.sort_by_key(|note| Reverse(note.tags().count()));
        sorted
    }

    /// Notes ordered by their sorted tag lists; untagged notes come last.
    pub fn sorted_by_tags(&self) -> Vec<&NoteRecord> {
        let mut sorted: Vec<&NoteRecord> = self.notes.iter().collect();
        sorted.sort_by_cached_key(|note| {
            let tags: Vec<String> = note.tags().map(str::to_string).collect();
            (tags.is_empty(), tags)
        });
        sorted
    }

    pub fn iter(&self) -> impl Iterator<Item = &NoteRecord> {
        self.notes.iter()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    fn position(&self, title: &str) -> Option<usize> {
        self.notes.iter().position(|note| note.title() == title)
    }

    fn require_mut(&mut self, title: &str) -> StoreResult<&mut NoteRecord> {
        self.find_mut(title)
            .ok_or_else(|| StoreError::NotFound(title.to_string()))
    }
}
