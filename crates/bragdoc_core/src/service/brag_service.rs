//! Brag document use-case service.
//!
//! # Responsibility
//! - Create yearly documents from the workspace template.
//! - Add, update, remove and list entries, keeping document and index in step.
//! - Report the heading outline of a document.
//!
//! # Invariants
//! - Every operation re-reads the document and index; nothing is cached between calls.
//! - Operations on the same document are serialized within the process.
//! - Recorded offsets shift with every inserted or removed entry paragraph.
//! - A recorded offset that no longer holds the entry text is re-resolved by
//!   text match inside the entry's section before any mutation.

use super::error::{BragError, BragResult};
use super::locks::with_document_lock;
use super::template::{default_template, initialize_from_template};
use crate::config::{DocumentKey, WorkspaceConfig};
use crate::document::{Document, DocxDocument};
use crate::editor::{insert_entry, remove_entry_paragraph, strip_bullet, update_entry_text};
use crate::index_sync::{
    find_by_text, occurrence_rank, record_insert, record_remove, record_update, relocate,
    shift_after_insert, shift_after_remove,
};
use crate::model::entry::{generate_entry_id, DocumentIndex, Entry, EntryId};
use crate::model::section::{SectionPath, SectionRange};
use crate::outline::classifier::{list_headings, HeadingInfo};
use crate::outline::locator::try_locate;
use crate::repo::index_repo::{IndexRepository, JsonIndexRepository};
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Whether `create` produced a new document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CreateStatus {
    Created,
    Exists,
}

/// Result of `create_document`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateOutcome {
    pub status: CreateStatus,
    pub document_path: PathBuf,
    pub index_path: PathBuf,
    /// `true` when the copied template was initialized on this call. A failed
    /// initialization leaves the raw template copy in place.
    pub initialized: bool,
    /// `true` when this call wrote a new empty index.
    pub index_created: bool,
}

/// Result of `add_entry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddedEntry {
    pub entry_id: EntryId,
    pub section_path: String,
    pub text: String,
    /// Paragraph index the new entry occupies.
    pub position: usize,
}

/// Result of `update_entry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatedEntry {
    pub entry_id: EntryId,
    pub section_path: String,
    pub old_text: String,
    pub text: String,
    pub paragraph_index: usize,
}

/// Result of `remove_entry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedEntry {
    pub entry_id: EntryId,
    pub section_path: String,
    pub text: String,
    pub paragraph_index: usize,
}

/// Heading outline, optionally with the range of one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentOutline {
    pub paragraph_count: usize,
    pub headings: Vec<HeadingInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<SectionRange>,
}

/// Result of `write_template`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateOutcome {
    pub template_path: PathBuf,
    pub written: bool,
}

/// How an update or removal addresses its entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryTarget {
    Id(EntryId),
    /// `occurrence_index`-th entry (0-based) in `section_path` with exactly `text`.
    Text {
        text: String,
        section_path: String,
        occurrence_index: usize,
    },
}

impl EntryTarget {
    /// Builds a target from loose caller arguments.
    ///
    /// A non-blank `entry_id` wins. Otherwise both `old_text` and
    /// `section_path` are required; `occurrence_index` defaults to 0.
    pub fn from_parts(
        entry_id: Option<&str>,
        old_text: Option<&str>,
        section_path: Option<&str>,
        occurrence_index: Option<usize>,
    ) -> BragResult<Self> {
        fn non_blank(value: Option<&str>) -> Option<&str> {
            value.map(str::trim).filter(|value| !value.is_empty())
        }
        if let Some(entry_id) = non_blank(entry_id) {
            return Ok(Self::Id(entry_id.to_string()));
        }
        match (non_blank(old_text), non_blank(section_path)) {
            (Some(text), Some(section_path)) => Ok(Self::Text {
                text: text.to_string(),
                section_path: section_path.to_string(),
                occurrence_index: occurrence_index.unwrap_or(0),
            }),
            _ => Err(BragError::InvalidArgument(
                "either entry_id or both old_text and section_path are required".to_string(),
            )),
        }
    }
}

/// Use-case service over a workspace and an index repository.
pub struct BragService<R: IndexRepository> {
    config: WorkspaceConfig,
    index_repo: R,
}

impl BragService<JsonIndexRepository> {
    /// Service using JSON index files.
    pub fn with_json_index(config: WorkspaceConfig) -> Self {
        Self::new(config, JsonIndexRepository::new())
    }
}

impl<R: IndexRepository> BragService<R> {
    pub fn new(config: WorkspaceConfig, index_repo: R) -> Self {
        Self { config, index_repo }
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Ensures the document and its index exist.
    ///
    /// An existing document is left untouched and reported as `Exists`; its
    /// index is still created when missing. A new document is copied from the
    /// template, titled, and stripped of example paragraphs. When that
    /// initialization fails the pre-initialization copy is restored.
    pub fn create_document(&self, full_name: &str, year: i32) -> BragResult<CreateOutcome> {
        let key = DocumentKey::new(full_name, year)?;
        let document_path = self.config.document_path(&key);
        let index_path = self.config.index_path(&key);

        with_document_lock(&document_path, || -> BragResult<CreateOutcome> {
            if document_path.exists() {
                let index_created = self.index_repo.ensure(&index_path)?;
                info!(
                    "event=document_create module=service status=exists year={} index_created={}",
                    key.year(),
                    index_created
                );
                return Ok(CreateOutcome {
                    status: CreateStatus::Exists,
                    document_path: document_path.clone(),
                    index_path: index_path.clone(),
                    initialized: false,
                    index_created,
                });
            }

            let template_path = self.config.template_path();
            if !template_path.is_file() {
                warn!("event=document_create module=service status=error reason=template_missing");
                return Err(BragError::TemplateNotFound(template_path));
            }
            if let Some(parent) = document_path.parent() {
                create_dir(parent)?;
            }
            fs::copy(&template_path, &document_path).map_err(|source| BragError::Io {
                path: document_path.clone(),
                source,
            })?;

            let initialized = initialize_with_backup(&document_path, &key)?;
            let index_created = self.index_repo.ensure(&index_path)?;
            info!(
                "event=document_create module=service status=ok year={} initialized={} index_created={}",
                key.year(),
                initialized,
                index_created
            );
            Ok(CreateOutcome {
                status: CreateStatus::Created,
                document_path: document_path.clone(),
                index_path: index_path.clone(),
                initialized,
                index_created,
            })
        })
    }

    /// Inserts `text` as a new entry of `section_path`.
    ///
    /// `position` counts paragraphs after the section heading; `None` appends
    /// after the last non-blank paragraph of the section.
    pub fn add_entry(
        &self,
        full_name: &str,
        year: i32,
        section_path: &str,
        text: &str,
        position: Option<usize>,
    ) -> BragResult<AddedEntry> {
        let key = DocumentKey::new(full_name, year)?;
        let path = SectionPath::parse(section_path)?;
        let text = normalize_entry_text(text)?;
        let document_path = self.existing_document(&key)?;
        let index_path = self.config.index_path(&key);

        with_document_lock(&document_path, || -> BragResult<AddedEntry> {
            self.index_repo.ensure(&index_path)?;
            let mut index = self.index_repo.load(&index_path)?;
            let snapshot = snapshot_document(&document_path)?;
            let mut document = DocxDocument::open(&document_path)?;

            let paragraph_index = insert_entry(&mut document, &path, text, position)?;
            let entry_id = generate_entry_id();
            let section_key = path.canonical();
            let shifted = shift_after_insert(&mut index, paragraph_index);
            record_insert(
                &mut index,
                entry_id.clone(),
                &section_key,
                text,
                paragraph_index,
            );
            self.save_index_or_restore(&index_path, &index, &document_path, &snapshot)?;

            info!(
                "event=entry_add module=service status=ok section={} entry_id={} paragraph_index={} shifted={}",
                section_key, entry_id, paragraph_index, shifted
            );
            Ok(AddedEntry {
                entry_id,
                section_path: section_key,
                text: text.to_string(),
                position: paragraph_index,
            })
        })
    }

    /// Rewrites the text of the entry addressed by `target`.
    pub fn update_entry(
        &self,
        full_name: &str,
        year: i32,
        target: &EntryTarget,
        new_text: &str,
    ) -> BragResult<UpdatedEntry> {
        let key = DocumentKey::new(full_name, year)?;
        let new_text = normalize_entry_text(new_text)?;
        let document_path = self.existing_document(&key)?;
        let index_path = self.existing_index(&key)?;

        with_document_lock(&document_path, || -> BragResult<UpdatedEntry> {
            let mut index = self.index_repo.load(&index_path)?;
            let entry = resolve_target(&index, target)?;
            let snapshot = snapshot_document(&document_path)?;
            let mut document = DocxDocument::open(&document_path)?;
            let paragraph_index = resolve_live_paragraph(&document, &index, &entry)?;

            let old_text = update_entry_text(&mut document, paragraph_index, new_text)?;
            record_update(&mut index, &entry.entry_id, new_text)?;
            relocate(&mut index, &entry.entry_id, paragraph_index)?;
            self.save_index_or_restore(&index_path, &index, &document_path, &snapshot)?;

            info!(
                "event=entry_update module=service status=ok section={} entry_id={} paragraph_index={} relocated={}",
                entry.section_path,
                entry.entry_id,
                paragraph_index,
                paragraph_index != entry.paragraph_index
            );
            Ok(UpdatedEntry {
                entry_id: entry.entry_id,
                section_path: entry.section_path,
                old_text,
                text: new_text.to_string(),
                paragraph_index,
            })
        })
    }

    /// Removes the entry addressed by `target` from the document and index.
    pub fn remove_entry(
        &self,
        full_name: &str,
        year: i32,
        target: &EntryTarget,
    ) -> BragResult<RemovedEntry> {
        let key = DocumentKey::new(full_name, year)?;
        let document_path = self.existing_document(&key)?;
        let index_path = self.existing_index(&key)?;

        with_document_lock(&document_path, || -> BragResult<RemovedEntry> {
            let mut index = self.index_repo.load(&index_path)?;
            let entry = resolve_target(&index, target)?;
            let snapshot = snapshot_document(&document_path)?;
            let mut document = DocxDocument::open(&document_path)?;
            let paragraph_index = resolve_live_paragraph(&document, &index, &entry)?;

            remove_entry_paragraph(&mut document, paragraph_index)?;
            let removed = record_remove(&mut index, &entry.entry_id)?;
            let shifted = shift_after_remove(&mut index, paragraph_index);
            self.save_index_or_restore(&index_path, &index, &document_path, &snapshot)?;

            info!(
                "event=entry_remove module=service status=ok section={} entry_id={} paragraph_index={} shifted={}",
                removed.section_path, removed.entry_id, paragraph_index, shifted
            );
            Ok(RemovedEntry {
                entry_id: removed.entry_id,
                section_path: removed.section_path,
                text: removed.text,
                paragraph_index,
            })
        })
    }

    /// Indexed entries in insertion order, optionally limited to one section.
    pub fn list_entries(
        &self,
        full_name: &str,
        year: i32,
        section_path: Option<&str>,
    ) -> BragResult<Vec<Entry>> {
        let key = DocumentKey::new(full_name, year)?;
        let index_path = self.existing_index(&key)?;
        let section_key = section_path
            .map(SectionPath::parse)
            .transpose()?
            .map(|path| path.canonical());

        let index = self.index_repo.load(&index_path)?;
        let entries = match section_key.as_deref() {
            Some(section_key) => index.entries_in_section(section_key).cloned().collect(),
            None => index.entries.values().cloned().collect::<Vec<_>>(),
        };
        info!(
            "event=entry_list module=service status=ok filtered={} count={}",
            section_key.is_some(),
            entries.len()
        );
        Ok(entries)
    }

    /// Heading outline of the document, plus the range of `section_path` when given.
    pub fn outline(
        &self,
        full_name: &str,
        year: i32,
        section_path: Option<&str>,
    ) -> BragResult<DocumentOutline> {
        let key = DocumentKey::new(full_name, year)?;
        let path = section_path.map(SectionPath::parse).transpose()?;
        let document_path = self.existing_document(&key)?;

        let document = DocxDocument::open(&document_path)?;
        let paragraphs = document.paragraphs();
        let range = path
            .as_ref()
            .map(|path| try_locate(paragraphs, path))
            .transpose()?;

        Ok(DocumentOutline {
            paragraph_count: document.paragraph_count(),
            headings: list_headings(paragraphs),
            section_path: path.map(|path| path.canonical()),
            range,
        })
    }

    /// Writes the default template to the workspace template path.
    ///
    /// An existing template is kept unless `overwrite` is set.
    pub fn write_template(&self, overwrite: bool) -> BragResult<TemplateOutcome> {
        let template_path = self.config.template_path();
        if template_path.exists() && !overwrite {
            return Ok(TemplateOutcome {
                template_path,
                written: false,
            });
        }
        if let Some(parent) = template_path.parent() {
            create_dir(parent)?;
        }
        default_template().write(&template_path)?;
        info!("event=template_write module=service status=ok overwrite={overwrite}");
        Ok(TemplateOutcome {
            template_path,
            written: true,
        })
    }

    fn existing_document(&self, key: &DocumentKey) -> BragResult<PathBuf> {
        let path = self.config.document_path(key);
        if !path.is_file() {
            return Err(BragError::DocumentNotFound(path));
        }
        Ok(path)
    }

    fn existing_index(&self, key: &DocumentKey) -> BragResult<PathBuf> {
        let path = self.config.index_path(key);
        if !self.index_repo.exists(&path) {
            return Err(BragError::IndexNotFound(path));
        }
        Ok(path)
    }

    /// Persists `index`; on failure puts `snapshot` back so the document
    /// never holds an edit the index does not know about.
    fn save_index_or_restore(
        &self,
        index_path: &Path,
        index: &DocumentIndex,
        document_path: &Path,
        snapshot: &[u8],
    ) -> BragResult<()> {
        let Err(err) = self.index_repo.save(index_path, index) else {
            return Ok(());
        };
        let err = BragError::from(err);
        warn!(
            "event=index_save module=service status=error action=restore_document error_code={}",
            err.error_code()
        );
        fs::write(document_path, snapshot).map_err(|source| BragError::Io {
            path: document_path.to_path_buf(),
            source,
        })?;
        Err(err)
    }
}

/// Sibling path holding the pre-initialization copy of a new document.
pub fn backup_path(document_path: &Path) -> PathBuf {
    document_path.with_extension("backup.docx")
}

/// Initializes a fresh template copy, restoring it from a backup on failure.
///
/// Returns whether initialization succeeded. The backup never outlives the call.
fn initialize_with_backup(document_path: &Path, key: &DocumentKey) -> BragResult<bool> {
    let backup = backup_path(document_path);
    fs::copy(document_path, &backup).map_err(|source| BragError::Io {
        path: backup.clone(),
        source,
    })?;

    let result = DocxDocument::open(document_path)
        .and_then(|mut document| initialize_from_template(&mut document, key));
    let initialized = match result {
        Ok(summary) => {
            info!(
                "event=document_init module=service status=ok title_replaced={} removed_examples={}",
                summary.title_index.is_some(),
                summary.removed_examples
            );
            true
        }
        Err(err) => {
            warn!("event=document_init module=service status=error action=restore_backup error={err}");
            fs::copy(&backup, document_path).map_err(|source| BragError::Io {
                path: document_path.to_path_buf(),
                source,
            })?;
            false
        }
    };

    fs::remove_file(&backup).map_err(|source| BragError::Io {
        path: backup.clone(),
        source,
    })?;
    Ok(initialized)
}

fn snapshot_document(document_path: &Path) -> BragResult<Vec<u8>> {
    fs::read(document_path).map_err(|source| BragError::Io {
        path: document_path.to_path_buf(),
        source,
    })
}

fn resolve_target(index: &DocumentIndex, target: &EntryTarget) -> BragResult<Entry> {
    let entry_id = match target {
        EntryTarget::Id(entry_id) => entry_id.clone(),
        EntryTarget::Text {
            text,
            section_path,
            occurrence_index,
        } => {
            let section_key = SectionPath::parse(section_path)?.canonical();
            find_by_text(index, text.trim(), &section_key, *occurrence_index)?
        }
    };
    index
        .entry(&entry_id)
        .cloned()
        .ok_or(BragError::EntryNotFound(entry_id))
}

/// Current paragraph of `entry`: the recorded offset when it still holds the
/// entry text, else the same-rank text match inside the entry's section.
fn resolve_live_paragraph<D: Document>(
    document: &D,
    index: &DocumentIndex,
    entry: &Entry,
) -> BragResult<usize> {
    let holds_entry = |paragraph_index: usize| {
        document
            .paragraphs()
            .get(paragraph_index)
            .is_some_and(|paragraph| strip_bullet(&paragraph.text) == entry.text)
    };
    if holds_entry(entry.paragraph_index) {
        return Ok(entry.paragraph_index);
    }

    let path = SectionPath::parse(&entry.section_path)?;
    let range = try_locate(document.paragraphs(), &path)?;
    let rank = occurrence_rank(index, &entry.entry_id).unwrap_or(0);
    let live = (range.start..range.end)
        .filter(|paragraph_index| holds_entry(*paragraph_index))
        .nth(rank)
        .ok_or_else(|| BragError::EntryParagraphMissing(entry.entry_id.clone()))?;
    warn!(
        "event=entry_resolve module=service status=relocated entry_id={} recorded={} live={}",
        entry.entry_id, entry.paragraph_index, live
    );
    Ok(live)
}

fn normalize_entry_text(text: &str) -> BragResult<&str> {
    let text = text.trim();
    if text.is_empty() {
        return Err(BragError::InvalidArgument(
            "entry text must not be blank".to_string(),
        ));
    }
    if text.contains(['\n', '\r']) {
        return Err(BragError::InvalidArgument(
            "entry text must be a single line".to_string(),
        ));
    }
    // XML 1.0 has no representation for C0 controls other than tab and newlines.
    if text.chars().any(|c| c.is_control() && c != '\t') {
        return Err(BragError::InvalidArgument(
            "entry text must not contain control characters".to_string(),
        ));
    }
    Ok(text)
}

fn create_dir(path: &Path) -> BragResult<()> {
    fs::create_dir_all(path).map_err(|source| BragError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        backup_path, normalize_entry_text, resolve_live_paragraph, BragError, EntryTarget,
    };
    use crate::document::MemoryDocument;
    use crate::index_sync::record_insert;
    use crate::model::entry::DocumentIndex;
    use crate::model::paragraph::{Paragraph, Run};
    use std::path::Path;

    fn document() -> MemoryDocument {
        MemoryDocument::new(vec![
            Paragraph::from_runs(0, Some("Heading 1".to_string()), vec![Run::new("Projects", false)]),
            Paragraph::plain(0, "• Shipped X"),
            Paragraph::plain(0, "• Shipped X"),
            Paragraph::plain(0, "• Led Y"),
            Paragraph::from_runs(0, Some("Heading 1".to_string()), vec![Run::new("What you learned", false)]),
        ])
    }

    #[test]
    fn target_requires_id_or_text_and_section() {
        assert_eq!(
            EntryTarget::from_parts(Some(" abc "), Some("ignored"), None, None).unwrap(),
            EntryTarget::Id("abc".to_string())
        );
        assert_eq!(
            EntryTarget::from_parts(None, Some("Shipped X"), Some("Projects"), None).unwrap(),
            EntryTarget::Text {
                text: "Shipped X".to_string(),
                section_path: "Projects".to_string(),
                occurrence_index: 0,
            }
        );
        let missing = EntryTarget::from_parts(Some("  "), Some("Shipped X"), None, Some(1));
        assert!(matches!(missing, Err(BragError::InvalidArgument(_))));
    }

    #[test]
    fn recorded_offset_is_used_when_it_still_holds_the_text() {
        let mut index = DocumentIndex::new("doc");
        record_insert(&mut index, "a".to_string(), "Projects", "Led Y", 3);
        let entry = index.entry("a").cloned().unwrap();
        assert_eq!(resolve_live_paragraph(&document(), &index, &entry).unwrap(), 3);
    }

    #[test]
    fn stale_offset_is_re_resolved_by_rank_within_section() {
        let mut index = DocumentIndex::new("doc");
        record_insert(&mut index, "first".to_string(), "Projects", "Shipped X", 0);
        record_insert(&mut index, "second".to_string(), "Projects", "Shipped X", 9);
        let second = index.entry("second").cloned().unwrap();
        assert_eq!(resolve_live_paragraph(&document(), &index, &second).unwrap(), 2);

        record_insert(&mut index, "gone".to_string(), "Projects", "Never written", 1);
        let gone = index.entry("gone").cloned().unwrap();
        assert!(matches!(
            resolve_live_paragraph(&document(), &index, &gone),
            Err(BragError::EntryParagraphMissing(id)) if id == "gone"
        ));
    }

    #[test]
    fn entry_text_is_trimmed_and_single_line() {
        assert_eq!(normalize_entry_text("  Shipped X ").unwrap(), "Shipped X");
        assert!(normalize_entry_text("   ").is_err());
        assert!(normalize_entry_text("a\nb").is_err());
    }

    #[test]
    fn entry_text_rejects_control_characters_but_keeps_tabs() {
        for text in ["Shipped\u{1}X", "Shipped\u{0}", "bell\u{7}", "Shipped\u{1f}X"] {
            assert!(
                matches!(normalize_entry_text(text), Err(BragError::InvalidArgument(_))),
                "{text:?}"
            );
        }
        assert_eq!(normalize_entry_text("Shipped\tX").unwrap(), "Shipped\tX");
    }

    #[test]
    fn backup_sits_next_to_document() {
        assert_eq!(
            backup_path(Path::new("/w/Brag Document - Jane Doe (2025).docx")),
            Path::new("/w/Brag Document - Jane Doe (2025).backup.docx")
        );
    }
}
