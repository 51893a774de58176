//! In-memory document used to exercise the engines without a file format.

use super::{Document, DocumentError, DocumentResult};
use crate::model::paragraph::{Paragraph, ParagraphFormat, Run};

/// Vector-backed document. `save` only counts calls.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    paragraphs: Vec<Paragraph>,
    formats: Vec<ParagraphFormat>,
    save_count: usize,
}

impl MemoryDocument {
    /// Creates a document from paragraph snapshots, renumbering them densely.
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        let formats = vec![ParagraphFormat::Inherit; paragraphs.len()];
        let mut document = Self {
            paragraphs,
            formats,
            save_count: 0,
        };
        document.renumber();
        document
    }

    /// Creates a document of unstyled single-run paragraphs.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            lines
                .into_iter()
                .map(|line| Paragraph::plain(0, line))
                .collect(),
        )
    }

    pub fn save_count(&self) -> usize {
        self.save_count
    }

    /// Format last written to the paragraph at `index`.
    pub fn format_at(&self, index: usize) -> Option<ParagraphFormat> {
        self.formats.get(index).copied()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.paragraphs
            .iter()
            .map(|paragraph| paragraph.text.as_str())
            .collect()
    }

    fn renumber(&mut self) {
        for (index, paragraph) in self.paragraphs.iter_mut().enumerate() {
            paragraph.index = index;
        }
    }

    fn check_index(&self, index: usize) -> DocumentResult<()> {
        if index >= self.paragraphs.len() {
            return Err(DocumentError::ParagraphOutOfRange {
                index,
                len: self.paragraphs.len(),
            });
        }
        Ok(())
    }
}

impl Document for MemoryDocument {
    fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    fn insert_paragraph_before(
        &mut self,
        index: usize,
        text: &str,
        format: ParagraphFormat,
    ) -> DocumentResult<usize> {
        let position = index.min(self.paragraphs.len());
        self.paragraphs
            .insert(position, Paragraph::plain(position, text));
        self.formats.insert(position, format);
        self.renumber();
        Ok(position)
    }

    fn replace_paragraph(
        &mut self,
        index: usize,
        text: &str,
        format: ParagraphFormat,
    ) -> DocumentResult<()> {
        self.check_index(index)?;
        let paragraph = &mut self.paragraphs[index];
        let bold = match format {
            ParagraphFormat::Inherit => paragraph.runs.first().is_some_and(|run| run.bold),
            ParagraphFormat::Indented { .. } => false,
        };
        let style_name = match format {
            ParagraphFormat::Inherit => paragraph.style_name.take(),
            ParagraphFormat::Indented { .. } => None,
        };
        *paragraph = Paragraph::from_runs(index, style_name, vec![Run::new(text, bold)]);
        self.formats[index] = format;
        Ok(())
    }

    fn remove_paragraph(&mut self, index: usize) -> DocumentResult<()> {
        self.check_index(index)?;
        self.paragraphs.remove(index);
        self.formats.remove(index);
        self.renumber();
        Ok(())
    }

    fn save(&mut self) -> DocumentResult<()> {
        self.save_count += 1;
        Ok(())
    }
}
