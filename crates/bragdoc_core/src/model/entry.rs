//! Side-car index records.
//!
//! # Responsibility
//! - Define the persisted shape of one document's index file.
//! - Keep sections and entries in insertion order.
//!
//! # Invariants
//! - Every id listed in a section bucket exists in `entries` with the same `section_path`.
//! - `entry_id` values are never reassigned.
//! - `paragraph_index` is the last known offset, not a live pointer.

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque stable identifier of one entry.
pub type EntryId = String;

/// Generates a fresh entry identifier.
pub fn generate_entry_id() -> EntryId {
    Uuid::new_v4().to_string()
}

/// One recorded accomplishment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub entry_id: EntryId,
    /// Canonical section path key.
    pub section_path: String,
    /// Entry text without the rendered bullet marker.
    pub text: String,
    pub paragraph_index: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-section bucket listing entry ids in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionBucket {
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub entry_ids: Vec<EntryId>,
}

/// Whole index file for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentIndex {
    pub document_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub sections: IndexMap<String, SectionBucket>,
    #[serde(default)]
    pub entries: IndexMap<EntryId, Entry>,
}

impl DocumentIndex {
    /// Creates an empty index for `document_name`.
    pub fn new(document_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            document_name: document_name.into(),
            created_at: now,
            updated_at: now,
            sections: IndexMap::new(),
            entries: IndexMap::new(),
        }
    }

    pub fn entry(&self, entry_id: &str) -> Option<&Entry> {
        self.entries.get(entry_id)
    }

    /// Entries recorded under `section_path`, in insertion order.
    pub fn entries_in_section<'a>(&'a self, section_path: &'a str) -> impl Iterator<Item = &'a Entry> {
        self.sections
            .get(section_path)
            .into_iter()
            .flat_map(|bucket| bucket.entry_ids.iter())
            .filter_map(|entry_id| self.entries.get(entry_id))
            .filter(move |entry| entry.section_path == section_path)
    }

    /// Refreshes the index-level `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = advance_timestamp(self.updated_at);
    }
}

/// Returns the current time, or a tick past `previous` when the clock has not moved.
///
/// Keeps `updated_at` strictly increasing per record even on coarse clocks.
pub fn advance_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::{advance_timestamp, generate_entry_id, DocumentIndex};
    use chrono::{Duration, Utc};

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(generate_entry_id(), generate_entry_id());
    }

    #[test]
    fn advance_timestamp_is_strictly_increasing() {
        let future = Utc::now() + Duration::hours(1);
        assert!(advance_timestamp(future) > future);
    }

    #[test]
    fn index_serializes_documented_shape() {
        let index = DocumentIndex::new("Brag Document - Jane Doe (2025)");
        let value = serde_json::to_value(&index).unwrap();
        assert_eq!(value["document_name"], "Brag Document - Jane Doe (2025)");
        assert!(value["sections"].as_object().unwrap().is_empty());
        assert!(value["entries"].as_object().unwrap().is_empty());
        assert!(value["created_at"].is_string());
    }
}
