//! Keeps the side-car index consistent with document edits.
//!
//! # Responsibility
//! - Record inserted, updated and removed entries.
//! - Shift recorded paragraph offsets when paragraphs move.
//! - Look entries up by text within a section.
//!
//! # Invariants
//! - Section buckets are created on first use and keep insertion order.
//! - `record_update` never changes `paragraph_index`; `relocate` does.
//! - Every mutation refreshes the index-level `updated_at`.

use crate::model::entry::{advance_timestamp, DocumentIndex, Entry, EntryId, SectionBucket};
use chrono::Utc;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from index mutations addressed by entry id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSyncError {
    EntryNotFound(EntryId),
}

impl Display for IndexSyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntryNotFound(entry_id) => write!(f, "entry not found in index: {entry_id}"),
        }
    }
}

impl Error for IndexSyncError {}

/// Distinct outcomes of a failed text lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindEntryError {
    /// The section has no recorded entries at all.
    SectionHasNoEntries { section_path: String },
    /// The section has entries but none with the requested text.
    NoMatch { section_path: String, text: String },
    /// Matches exist but fewer than `occurrence_index + 1`.
    OccurrenceOutOfRange {
        section_path: String,
        occurrence_index: usize,
        matches: usize,
    },
}

impl Display for FindEntryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SectionHasNoEntries { section_path } => {
                write!(f, "section `{section_path}` has no recorded entries")
            }
            Self::NoMatch { section_path, text } => {
                write!(f, "no entry with text `{text}` in section `{section_path}`")
            }
            Self::OccurrenceOutOfRange {
                section_path,
                occurrence_index,
                matches,
            } => write!(
                f,
                "occurrence index {occurrence_index} is out of range: section `{section_path}` has {matches} matching entries"
            ),
        }
    }
}

impl Error for FindEntryError {}

/// Records a newly inserted entry.
pub fn record_insert(
    index: &mut DocumentIndex,
    entry_id: EntryId,
    section_path: &str,
    text: &str,
    paragraph_index: usize,
) {
    let now = Utc::now();
    index
        .sections
        .entry(section_path.to_string())
        .or_insert_with(|| SectionBucket {
            created_at: now,
            entry_ids: Vec::new(),
        })
        .entry_ids
        .push(entry_id.clone());
    index.entries.insert(
        entry_id.clone(),
        Entry {
            entry_id,
            section_path: section_path.to_string(),
            text: text.to_string(),
            paragraph_index,
            created_at: now,
            updated_at: now,
        },
    );
    index.touch();
}

/// Overwrites an entry's text.
pub fn record_update(
    index: &mut DocumentIndex,
    entry_id: &str,
    new_text: &str,
) -> Result<(), IndexSyncError> {
    let entry = index
        .entries
        .get_mut(entry_id)
        .ok_or_else(|| IndexSyncError::EntryNotFound(entry_id.to_string()))?;
    entry.text = new_text.to_string();
    entry.updated_at = advance_timestamp(entry.updated_at);
    index.touch();
    Ok(())
}

/// Records the live paragraph offset of an entry.
pub fn relocate(
    index: &mut DocumentIndex,
    entry_id: &str,
    paragraph_index: usize,
) -> Result<(), IndexSyncError> {
    let entry = index
        .entries
        .get_mut(entry_id)
        .ok_or_else(|| IndexSyncError::EntryNotFound(entry_id.to_string()))?;
    if entry.paragraph_index != paragraph_index {
        entry.paragraph_index = paragraph_index;
        index.touch();
    }
    Ok(())
}

/// Removes an entry and its bucket reference. The bucket itself is kept.
pub fn record_remove(index: &mut DocumentIndex, entry_id: &str) -> Result<Entry, IndexSyncError> {
    let entry = index
        .entries
        .shift_remove(entry_id)
        .ok_or_else(|| IndexSyncError::EntryNotFound(entry_id.to_string()))?;
    if let Some(bucket) = index.sections.get_mut(&entry.section_path) {
        bucket.entry_ids.retain(|id| id != entry_id);
    }
    index.touch();
    Ok(entry)
}

/// Adjusts recorded offsets after a paragraph was inserted at `at`.
///
/// Entries recorded at or after `at` move down by one.
pub fn shift_after_insert(index: &mut DocumentIndex, at: usize) -> usize {
    let mut shifted = 0;
    for entry in index.entries.values_mut() {
        if entry.paragraph_index >= at {
            entry.paragraph_index += 1;
            shifted += 1;
        }
    }
    if shifted > 0 {
        index.touch();
    }
    shifted
}

/// Adjusts recorded offsets after the paragraph at `at` was removed.
///
/// Entries recorded after `at` move up by one.
pub fn shift_after_remove(index: &mut DocumentIndex, at: usize) -> usize {
    let mut shifted = 0;
    for entry in index.entries.values_mut() {
        if entry.paragraph_index > at {
            entry.paragraph_index -= 1;
            shifted += 1;
        }
    }
    if shifted > 0 {
        index.touch();
    }
    shifted
}

/// Finds the `occurrence_index`-th entry (0-based, insertion order) in
/// `section_path` whose text equals `text`.
pub fn find_by_text(
    index: &DocumentIndex,
    text: &str,
    section_path: &str,
    occurrence_index: usize,
) -> Result<EntryId, FindEntryError> {
    let in_section = index
        .entries
        .values()
        .filter(|entry| entry.section_path == section_path)
        .collect::<Vec<_>>();
    if in_section.is_empty() {
        return Err(FindEntryError::SectionHasNoEntries {
            section_path: section_path.to_string(),
        });
    }

    let matches = in_section
        .into_iter()
        .filter(|entry| entry.text == text)
        .collect::<Vec<_>>();
    if matches.is_empty() {
        return Err(FindEntryError::NoMatch {
            section_path: section_path.to_string(),
            text: text.to_string(),
        });
    }

    matches
        .get(occurrence_index)
        .map(|entry| entry.entry_id.clone())
        .ok_or(FindEntryError::OccurrenceOutOfRange {
            section_path: section_path.to_string(),
            occurrence_index,
            matches: matches.len(),
        })
}

/// Rank of `entry_id` among same-text entries of its section, in insertion order.
pub fn occurrence_rank(index: &DocumentIndex, entry_id: &str) -> Option<usize> {
    let target = index.entry(entry_id)?;
    index
        .entries
        .values()
        .filter(|entry| entry.section_path == target.section_path && entry.text == target.text)
        .position(|entry| entry.entry_id == target.entry_id)
}
