//! Note record model.

use crate::validate::{require_key, ValidationError};
use std::collections::BTreeSet;

/// One note: a unique title, free-text content and a tag set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    title: String,
    content: String,
    tags: BTreeSet<String>,
}

impl NoteRecord {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Result<Self, ValidationError> {
        let title = title.into();
        require_key(&title, "note title")?;
        Ok(Self {
            title,
            content: content.into(),
            tags: BTreeSet::new(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Tags in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Replaces the whole content.
    pub fn edit_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Adds a tag. Blank tags are ignored; adding twice is a no-op.
    pub fn add_tag(&mut self, tag: &str) {
        let tag = tag.trim();
        if !tag.is_empty() {
            self.tags.insert(tag.to_string());
        }
    }

    /// Removes a tag if present.
    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.remove(tag.trim());
    }

    /// Case-insensitive substring match over title, content and tags.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.content.to_lowercase().contains(&needle)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle))
    }
}
