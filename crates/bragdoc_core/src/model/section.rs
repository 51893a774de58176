//! Section path model and the fixed top-level vocabulary.
//!
//! # Responsibility
//! - Parse `/`-delimited section paths into a main section and optional nested name.
//! - Own the closed, ordered list of top-level section names and its alias.
//!
//! # Invariants
//! - A section path has one main segment and at most one nested segment.
//! - `Goals for next year` and `Goals for next year (optional)` name the same section.

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Top-level section names, in document order.
pub const TOP_LEVEL_SECTIONS: &[&str] = &[
    "Goals for this year",
    "Goals for next year",
    "Projects",
    "Collaboration & mentorship",
    "Design & documentation",
    "Company building",
    "What you learned",
    "Outside of work",
];

const NEXT_YEAR_GOALS: &str = "Goals for next year";
const NEXT_YEAR_GOALS_ALIAS: &str = "Goals for next year (optional)";

/// Error returned when a section path cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionPathError {
    /// Path is blank or has a blank segment.
    Empty(String),
    /// Path nests deeper than one subsection.
    TooDeep(String),
}

impl Display for SectionPathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(raw) => write!(f, "section path has an empty segment: `{raw}`"),
            Self::TooDeep(raw) => write!(
                f,
                "section path supports one nested level at most: `{raw}`"
            ),
        }
    }
}

impl Error for SectionPathError {}

/// Parsed section path such as `Outside of work/Articles`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPath {
    main: String,
    nested: Option<String>,
}

impl SectionPath {
    /// Parses a raw path, trimming each segment.
    ///
    /// # Errors
    /// - `Empty` when the path or one of its segments is blank.
    /// - `TooDeep` when more than two segments are given.
    pub fn parse(raw: &str) -> Result<Self, SectionPathError> {
        let segments = raw.split('/').map(str::trim).collect::<Vec<_>>();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(SectionPathError::Empty(raw.to_string()));
        }
        match segments.as_slice() {
            [main] => Ok(Self {
                main: (*main).to_string(),
                nested: None,
            }),
            [main, nested] => Ok(Self {
                main: (*main).to_string(),
                nested: Some((*nested).to_string()),
            }),
            _ => Err(SectionPathError::TooDeep(raw.to_string())),
        }
    }

    pub fn main(&self) -> &str {
        &self.main
    }

    pub fn nested(&self) -> Option<&str> {
        self.nested.as_deref()
    }

    /// Canonical key used by the index: trimmed segments, alias folded.
    pub fn canonical(&self) -> String {
        let main = canonical_section_name(&self.main);
        match &self.nested {
            Some(nested) => format!("{main}/{nested}"),
            None => main.to_string(),
        }
    }
}

impl Display for SectionPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.nested {
            Some(nested) => write!(f, "{}/{}", self.main, nested),
            None => write!(f, "{}", self.main),
        }
    }
}

/// Maps the known alias onto its canonical top-level name.
pub fn canonical_section_name(name: &str) -> &str {
    let trimmed = name.trim();
    if trimmed == NEXT_YEAR_GOALS_ALIAS {
        NEXT_YEAR_GOALS
    } else {
        trimmed
    }
}

/// Returns whether two top-level names denote the same section.
pub fn section_names_match(left: &str, right: &str) -> bool {
    canonical_section_name(left) == canonical_section_name(right)
}

/// Half-open paragraph range `[start, end)` owned by a section.
///
/// `start` is the paragraph right after the heading; `end` is the next
/// heading at the same or a higher level, or the document length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionRange {
    pub start: usize,
    pub end: usize,
}

impl SectionRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }
}
