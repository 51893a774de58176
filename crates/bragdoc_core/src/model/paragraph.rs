//! Paragraph metadata model.
//!
//! # Responsibility
//! - Carry the heading signals (style name, run boldness) of one paragraph.
//! - Stay independent from any concrete document format.

use serde::Serialize;

/// Literal marker rendered in front of every entry paragraph.
pub const BULLET_MARKER: &str = "•";

/// Left indent applied to entry paragraphs, in twentieths of a point.
pub const ENTRY_INDENT_TWIPS: u32 = 720;

/// One formatted run inside a paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Run {
    pub text: String,
    /// `true` only when bold is applied directly on the run.
    pub bold: bool,
}

impl Run {
    pub fn new(text: impl Into<String>, bold: bool) -> Self {
        Self {
            text: text.into(),
            bold,
        }
    }
}

/// Snapshot of one body-level paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    /// 0-based dense position in the document at snapshot time.
    pub index: usize,
    /// Concatenated text of all runs.
    pub text: String,
    /// Display name of the paragraph style (for example `Heading 1`).
    pub style_name: Option<String>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Builds a paragraph whose text is the concatenation of `runs`.
    pub fn from_runs(index: usize, style_name: Option<String>, runs: Vec<Run>) -> Self {
        let text = runs.iter().map(|run| run.text.as_str()).collect::<String>();
        Self {
            index,
            text,
            style_name,
            runs,
        }
    }

    /// Builds a single-run, unstyled paragraph.
    pub fn plain(index: usize, text: impl Into<String>) -> Self {
        Self::from_runs(index, None, vec![Run::new(text, false)])
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Formatting applied when a paragraph is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphFormat {
    /// Keep the target paragraph's own properties (style, first-run formatting).
    Inherit,
    /// Plain paragraph with a fixed left indent.
    Indented { left_twips: u32 },
}

impl ParagraphFormat {
    /// Format used for every rendered entry line.
    pub const fn entry() -> Self {
        Self::Indented {
            left_twips: ENTRY_INDENT_TWIPS,
        }
    }
}

/// Renders entry text as a bulleted line.
pub fn render_entry_text(text: &str) -> String {
    format!("{BULLET_MARKER} {text}")
}

#[cfg(test)]
mod tests {
    use super::{render_entry_text, Paragraph, Run};

    #[test]
    fn from_runs_concatenates_text() {
        let paragraph = Paragraph::from_runs(
            3,
            Some("Normal".to_string()),
            vec![Run::new("Shipped ", true), Run::new("X", false)],
        );
        assert_eq!(paragraph.text, "Shipped X");
        assert_eq!(paragraph.index, 3);
        assert!(!paragraph.is_blank());
    }

    #[test]
    fn render_entry_text_prefixes_bullet() {
        assert_eq!(render_entry_text("Shipped X"), "• Shipped X");
    }
}
