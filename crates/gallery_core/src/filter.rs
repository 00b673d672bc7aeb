//! Filter and sort engine for folder views.
//!
//! Pure presentation state: recomputed from the entry set on every
//! change, never persisted with the entries.

use crate::entry::Entry;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "size")]
    Size,
    #[serde(rename = "date")]
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

/// Search, type filter, and sort parameters for one folder view.
#[derive(Debug, Clone)]
pub struct ListQuery {
    /// Case-insensitive substring match against the full key.
    pub search_term: String,
    /// Extensions to keep. Empty means no filtering. Folders always pass.
    pub file_type_filter: BTreeSet<String>,
    pub sort_by: SortBy,
    pub sort_direction: SortDirection,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            file_type_filter: BTreeSet::new(),
            sort_by: SortBy::Name,
            sort_direction: SortDirection::Ascending,
        }
    }
}

impl ListQuery {
    /// Apply the filters and the folders-first sort to a normalized
    /// entry set. The sort is stable: equal entries keep their original
    /// listing order, so identical parameters always give identical
    /// output.
    pub fn apply(&self, entries: &[Entry]) -> Vec<Entry> {
        let mut result: Vec<Entry> = entries
            .iter()
            .filter(|e| self.matches(e))
            .cloned()
            .collect();
        result.sort_by(|a, b| self.compare(a, b));
        result
    }

    fn matches(&self, entry: &Entry) -> bool {
        if !self.search_term.is_empty() {
            let term = self.search_term.to_lowercase();
            if !entry.key.to_lowercase().contains(&term) {
                return false;
            }
        }

        if !self.file_type_filter.is_empty()
            && !entry.is_folder
            && !self.file_type_filter.contains(&entry.extension)
        {
            return false;
        }

        true
    }

    fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        // Folders always sort before files, regardless of key or direction.
        if a.is_folder != b.is_folder {
            return if a.is_folder {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }

        let cmp = match self.sort_by {
            SortBy::Name => a.key.to_lowercase().cmp(&b.key.to_lowercase()),
            SortBy::Size => a.size.unwrap_or(0).cmp(&b.size.unwrap_or(0)),
            SortBy::Date => a.last_modified.unwrap_or(0).cmp(&b.last_modified.unwrap_or(0)),
        };

        match self.sort_direction {
            SortDirection::Ascending => cmp,
            SortDirection::Descending => cmp.reverse(),
        }
    }
}

/// Distinct file extensions present in an entry set, sorted. Feeds the
/// type-filter choices offered for the current folder.
pub fn available_extensions(entries: &[Entry]) -> BTreeSet<String> {
    entries
        .iter()
        .filter(|e| !e.is_folder && !e.extension.is_empty())
        .map(|e| e.extension.clone())
        .collect()
}
