//! Use-case API returning structured JSON-ready envelopes.
//!
//! # Responsibility
//! - Expose one function per brag document operation over an explicit workspace.
//! - Turn every service failure into an `ActionResponse` with a stable error code.
//!
//! # Invariants
//! - Functions never panic and never return `Err`; failures live in the envelope.
//! - `error_code` holds the snake_case code from `BragError::error_code`.

use bragdoc_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, AddedEntry,
    BragError, BragResult, BragService, CreateOutcome, DocumentOutline, Entry, EntryTarget,
    JsonIndexRepository, RemovedEntry, TemplateOutcome, UpdatedEntry, WorkspaceConfig,
};
use log::warn;
use serde::{Deserialize, Serialize};

/// Response envelope shared by every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Stable error code on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Human-readable outcome for diagnostics.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl<T> ActionResponse<T> {
    fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error_code: None,
            message: message.into(),
            suggestion: None,
        }
    }

    fn failure(operation: &str, err: &BragError) -> Self {
        warn!(
            "event=api_call module=api status=error operation={} error_code={}",
            operation,
            err.error_code()
        );
        Self {
            ok: false,
            data: None,
            error_code: Some(err.error_code().to_string()),
            message: err.to_string(),
            suggestion: err.suggestion().map(str::to_string),
        }
    }

    fn from_result(operation: &str, message: &str, result: BragResult<T>) -> Self {
        match result {
            Ok(data) => Self::success(message, data),
            Err(err) => Self::failure(operation, &err),
        }
    }
}

/// Update or removal request. Either `entry_id`, or `old_text` plus
/// `section_path`, must be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntrySelector {
    pub entry_id: Option<String>,
    pub old_text: Option<String>,
    pub section_path: Option<String>,
    pub occurrence_index: Option<usize>,
}

impl EntrySelector {
    fn target(&self) -> BragResult<EntryTarget> {
        EntryTarget::from_parts(
            self.entry_id.as_deref(),
            self.old_text.as_deref(),
            self.section_path.as_deref(),
            self.occurrence_index,
        )
    }
}

/// Core crate version.
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
/// Repeating the same `level + log_dir` is a no-op.
pub fn init_logging(level: &str, log_dir: &str) -> String {
    match init_logging_inner(level, log_dir) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Ensures the yearly document and its index exist.
pub fn create_brag_document(
    config: &WorkspaceConfig,
    full_name: &str,
    year: i32,
) -> ActionResponse<CreateOutcome> {
    let result = service(config).create_document(full_name, year);
    ActionResponse::from_result("create", "document ready", result)
}

/// Adds one entry to a section of an existing document.
pub fn add_entry(
    config: &WorkspaceConfig,
    full_name: &str,
    year: i32,
    section_path: &str,
    text: &str,
    position: Option<usize>,
) -> ActionResponse<AddedEntry> {
    let result = service(config).add_entry(full_name, year, section_path, text, position);
    ActionResponse::from_result("add_entry", "entry added", result)
}

/// Rewrites the text of one entry.
pub fn update_entry(
    config: &WorkspaceConfig,
    full_name: &str,
    year: i32,
    selector: &EntrySelector,
    new_text: &str,
) -> ActionResponse<UpdatedEntry> {
    let result = selector
        .target()
        .and_then(|target| service(config).update_entry(full_name, year, &target, new_text));
    ActionResponse::from_result("update_entry", "entry updated", result)
}

/// Removes one entry from the document and index.
pub fn remove_entry(
    config: &WorkspaceConfig,
    full_name: &str,
    year: i32,
    selector: &EntrySelector,
) -> ActionResponse<RemovedEntry> {
    let result = selector
        .target()
        .and_then(|target| service(config).remove_entry(full_name, year, &target));
    ActionResponse::from_result("remove_entry", "entry removed", result)
}

/// Lists indexed entries, optionally for one section.
pub fn list_entries(
    config: &WorkspaceConfig,
    full_name: &str,
    year: i32,
    section_path: Option<&str>,
) -> ActionResponse<Vec<Entry>> {
    let result = service(config).list_entries(full_name, year, section_path);
    ActionResponse::from_result("list_entries", "entries listed", result)
}

/// Heading outline, plus one section range when `section_path` is set.
pub fn outline(
    config: &WorkspaceConfig,
    full_name: &str,
    year: i32,
    section_path: Option<&str>,
) -> ActionResponse<DocumentOutline> {
    let result = service(config).outline(full_name, year, section_path);
    ActionResponse::from_result("outline", "outline resolved", result)
}

/// Writes the default template into the workspace.
pub fn write_template(config: &WorkspaceConfig, overwrite: bool) -> ActionResponse<TemplateOutcome> {
    let result = service(config).write_template(overwrite);
    ActionResponse::from_result("write_template", "template ready", result)
}

fn service(config: &WorkspaceConfig) -> BragService<JsonIndexRepository> {
    BragService::with_json_index(config.clone())
}
