//! `.docx` package reader/writer.
//!
//! # Responsibility
//! - Load body-level paragraphs with style and run-boldness metadata.
//! - Apply paragraph inserts, replacements and removals to `word/document.xml`.
//! - Rewrite the package on save, keeping every other part untouched.
//!
//! # Invariants
//! - Non-paragraph body children (tables, section properties) are kept verbatim.
//! - Appended paragraphs are placed before trailing section properties.
//! - Saving replaces the file atomically via a sibling temp file.

use super::styles::{attribute_value, StyleSheet};
use super::{Document, DocumentError, DocumentResult};
use crate::model::paragraph::{Paragraph, ParagraphFormat, Run};
use log::{error, info};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub(crate) const DOCUMENT_PART: &str = "word/document.xml";
pub(crate) const STYLES_PART: &str = "word/styles.xml";

/// Document backed by a `.docx` file on disk.
#[derive(Debug)]
pub struct DocxDocument {
    path: PathBuf,
    package: Vec<u8>,
    body: Body,
    styles: StyleSheet,
    paragraphs: Vec<Paragraph>,
}

impl DocxDocument {
    /// Opens and parses a `.docx` file, repairing missing paragraph styles.
    ///
    /// # Errors
    /// - `NotFound` when `path` does not exist.
    /// - `Package`/`MissingPart`/`Malformed` when the file is not a usable package.
    pub fn open(path: impl AsRef<Path>) -> DocumentResult<Self> {
        let path = path.as_ref().to_path_buf();
        let started_at = Instant::now();
        if !path.exists() {
            return Err(DocumentError::NotFound(path));
        }

        let package = std::fs::read(&path).map_err(|source| DocumentError::Io {
            path: path.clone(),
            source,
        })?;

        let (document_xml, styles_xml) = {
            let mut archive = ZipArchive::new(Cursor::new(package.as_slice()))?;
            let document_xml = read_part(&mut archive, DOCUMENT_PART)?
                .ok_or(DocumentError::MissingPart(DOCUMENT_PART))?;
            (document_xml, read_part(&mut archive, STYLES_PART)?)
        };

        let body = Body::parse(&document_xml)?;
        let mut styles = StyleSheet::parse(styles_xml)?;
        let referenced = body
            .paragraph_blocks()
            .filter_map(|block| block.style_id.as_deref())
            .collect::<Vec<_>>();
        styles.repair(referenced)?;

        let mut document = Self {
            path,
            package,
            body,
            styles,
            paragraphs: Vec::new(),
        };
        document.refresh();
        info!(
            "event=document_open module=document status=ok paragraphs={} duration_ms={}",
            document.paragraphs.len(),
            started_at.elapsed().as_millis()
        );
        Ok(document)
    }

    fn refresh(&mut self) {
        self.paragraphs = self
            .body
            .paragraph_blocks()
            .enumerate()
            .map(|(index, block)| {
                Paragraph::from_runs(
                    index,
                    Some(self.styles.name_for(block.style_id.as_deref())),
                    block.runs.clone(),
                )
            })
            .collect();
    }

    fn render_package(&self) -> DocumentResult<Vec<u8>> {
        let document_xml = self.body.render();
        let mut source = ZipArchive::new(Cursor::new(self.package.as_slice()))?;
        let mut output = Cursor::new(Vec::new());
        {
            let mut writer = ZipWriter::new(&mut output);
            for position in 0..source.len() {
                let mut file = source.by_index(position)?;
                if file.is_dir() {
                    continue;
                }
                let name = file.name().to_string();
                writer.start_file(name.as_str(), entry_options())?;
                let written = if name == DOCUMENT_PART {
                    writer.write_all(document_xml.as_bytes())
                } else if name == STYLES_PART && self.styles.is_dirty() {
                    writer.write_all(self.styles.xml().unwrap_or_default().as_bytes())
                } else {
                    std::io::copy(&mut file, &mut writer).map(|_| ())
                };
                written.map_err(|source| self.io_error(source))?;
            }
            writer.finish()?;
        }
        Ok(output.into_inner())
    }

    fn io_error(&self, source: std::io::Error) -> DocumentError {
        DocumentError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn block_position(&self, index: usize) -> DocumentResult<usize> {
        self.body
            .paragraph_position(index)
            .ok_or(DocumentError::ParagraphOutOfRange {
                index,
                len: self.paragraphs.len(),
            })
    }
}

impl Document for DocxDocument {
    fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    fn insert_paragraph_before(
        &mut self,
        index: usize,
        text: &str,
        format: ParagraphFormat,
    ) -> DocumentResult<usize> {
        let block = ParagraphBlock::parse(&render_paragraph(text, format, None))?;
        let (position, paragraph_index) = match self.body.paragraph_position(index) {
            Some(position) => (position, index),
            None => (self.body.append_position(), self.paragraphs.len()),
        };
        self.body.blocks.insert(position, BodyBlock::Paragraph(block));
        self.refresh();
        Ok(paragraph_index)
    }

    fn replace_paragraph(
        &mut self,
        index: usize,
        text: &str,
        format: ParagraphFormat,
    ) -> DocumentResult<()> {
        let position = self.block_position(index)?;
        let BodyBlock::Paragraph(existing) = &self.body.blocks[position] else {
            return Err(DocumentError::Malformed(format!(
                "body block {position} is not a paragraph"
            )));
        };
        let xml = render_paragraph(text, format, Some(existing));
        self.body.blocks[position] = BodyBlock::Paragraph(ParagraphBlock::parse(&xml)?);
        self.refresh();
        Ok(())
    }

    fn remove_paragraph(&mut self, index: usize) -> DocumentResult<()> {
        let position = self.block_position(index)?;
        self.body.blocks.remove(position);
        self.refresh();
        Ok(())
    }

    fn save(&mut self) -> DocumentResult<()> {
        let started_at = Instant::now();
        let bytes = self.render_package()?;
        let staging = self.path.with_extension("docx.tmp");
        let persisted = std::fs::write(&staging, &bytes)
            .and_then(|()| std::fs::rename(&staging, &self.path));
        if let Err(source) = persisted {
            let _ = std::fs::remove_file(&staging);
            error!(
                "event=document_save module=document status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                source
            );
            return Err(self.io_error(source));
        }

        self.package = bytes;
        self.styles.mark_clean();
        info!(
            "event=document_save module=document status=ok paragraphs={} duration_ms={}",
            self.paragraphs.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> DocumentResult<Option<String>> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut content = String::new();
            file.read_to_string(&mut content)
                .map_err(|err| DocumentError::Malformed(format!("`{name}`: {err}")))?;
            Ok(Some(content.trim_start_matches('\u{feff}').to_string()))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// `word/document.xml` split around the direct children of `w:body`.
#[derive(Debug, Clone)]
struct Body {
    prefix: String,
    blocks: Vec<BodyBlock>,
    suffix: String,
}

#[derive(Debug, Clone)]
enum BodyBlock {
    Paragraph(ParagraphBlock),
    Other { xml: String, is_section_properties: bool },
}

impl Body {
    fn parse(xml: &str) -> DocumentResult<Self> {
        let mut reader = Reader::from_str(xml);
        let mut body_open: Option<usize> = None;
        let mut depth = 0usize;
        let mut child_start = 0usize;
        let mut raw_blocks = Vec::new();

        loop {
            let event = reader
                .read_event()
                .map_err(|err| DocumentError::Malformed(format!("document part: {err}")))?;
            let after = reader.buffer_position() as usize;
            match event {
                Event::Start(start) => {
                    if body_open.is_none() {
                        if start.name().as_ref() == b"w:body" {
                            body_open = Some(after);
                        }
                        continue;
                    }
                    if depth == 0 {
                        child_start = tag_start(xml, after)?;
                    }
                    depth += 1;
                }
                Event::Empty(_) if body_open.is_some() && depth == 0 => {
                    let start = tag_start(xml, after)?;
                    raw_blocks.push(&xml[start..after]);
                }
                Event::End(_) if body_open.is_some() => {
                    if depth == 0 {
                        let close = tag_start(xml, after)?;
                        let open = body_open.unwrap_or(close);
                        return Ok(Self {
                            prefix: xml[..open].to_string(),
                            blocks: raw_blocks
                                .into_iter()
                                .map(BodyBlock::parse)
                                .collect::<DocumentResult<Vec<_>>>()?,
                            suffix: xml[close..].to_string(),
                        });
                    }
                    depth -= 1;
                    if depth == 0 {
                        raw_blocks.push(&xml[child_start..after]);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Err(DocumentError::Malformed(
            "document part has no `w:body` element".to_string(),
        ))
    }

    fn paragraph_blocks(&self) -> impl Iterator<Item = &ParagraphBlock> {
        self.blocks.iter().filter_map(|block| match block {
            BodyBlock::Paragraph(paragraph) => Some(paragraph),
            BodyBlock::Other { .. } => None,
        })
    }

    /// Block position of the `index`-th paragraph.
    fn paragraph_position(&self, index: usize) -> Option<usize> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, block)| matches!(block, BodyBlock::Paragraph(_)))
            .nth(index)
            .map(|(position, _)| position)
    }

    fn append_position(&self) -> usize {
        match self.blocks.last() {
            Some(BodyBlock::Other {
                is_section_properties: true,
                ..
            }) => self.blocks.len() - 1,
            _ => self.blocks.len(),
        }
    }

    fn render(&self) -> String {
        let mut xml = self.prefix.clone();
        for block in &self.blocks {
            match block {
                BodyBlock::Paragraph(paragraph) => xml.push_str(&paragraph.xml),
                BodyBlock::Other { xml: raw, .. } => xml.push_str(raw),
            }
        }
        xml.push_str(&self.suffix);
        xml
    }
}

impl BodyBlock {
    fn parse(raw: &str) -> DocumentResult<Self> {
        if element_name(raw) == "w:p" {
            return ParagraphBlock::parse(raw).map(Self::Paragraph);
        }
        Ok(Self::Other {
            xml: raw.to_string(),
            is_section_properties: element_name(raw) == "w:sectPr",
        })
    }
}

/// Raw paragraph XML plus the metadata extracted from it.
#[derive(Debug, Clone)]
struct ParagraphBlock {
    xml: String,
    style_id: Option<String>,
    properties_xml: Option<String>,
    first_run_properties_xml: Option<String>,
    runs: Vec<Run>,
}

impl ParagraphBlock {
    fn parse(xml: &str) -> DocumentResult<Self> {
        let mut reader = Reader::from_str(xml);
        let mut block = Self {
            xml: xml.to_string(),
            style_id: None,
            properties_xml: None,
            first_run_properties_xml: None,
            runs: Vec::new(),
        };
        let mut properties_start: Option<usize> = None;
        let mut properties_depth = 0usize;
        let mut run_properties_start: Option<usize> = None;
        let mut run_depth = 0usize;
        let mut current_run: Option<Run> = None;
        let mut in_text = false;

        loop {
            let event = reader
                .read_event()
                .map_err(|err| DocumentError::Malformed(format!("paragraph: {err}")))?;
            let after = reader.buffer_position() as usize;
            match event {
                Event::Start(start) => match start.name().as_ref() {
                    b"w:pPr" if current_run.is_none() => {
                        // Tracked changes nest the previous pPr inside w:pPrChange.
                        if properties_depth == 0 {
                            properties_start = Some(tag_start(xml, after)?);
                        }
                        properties_depth += 1;
                    }
                    b"w:pStyle" if properties_depth == 1 => {
                        block.style_id = attribute_value(&start, b"w:val");
                    }
                    b"w:r" => {
                        if run_depth == 0 {
                            current_run = Some(Run::new(String::new(), false));
                        }
                        run_depth += 1;
                    }
                    b"w:rPr" if current_run.is_some() => {
                        run_properties_start = Some(tag_start(xml, after)?);
                    }
                    b"w:b" => apply_bold(current_run.as_mut(), &start),
                    b"w:t" if current_run.is_some() => in_text = true,
                    _ => {}
                },
                Event::Empty(start) => match start.name().as_ref() {
                    b"w:pPr" if current_run.is_none() && properties_depth == 0 => {
                        block.properties_xml = Some(xml[tag_start(xml, after)?..after].to_string());
                    }
                    b"w:pStyle" if properties_depth == 1 => {
                        block.style_id = attribute_value(&start, b"w:val");
                    }
                    b"w:b" if run_properties_start.is_some() => {
                        apply_bold(current_run.as_mut(), &start)
                    }
                    b"w:tab" => push_text(current_run.as_mut(), "\t"),
                    b"w:br" | b"w:cr" => push_text(current_run.as_mut(), "\n"),
                    _ => {}
                },
                Event::Text(text) if in_text => {
                    let decoded = text
                        .decode()
                        .map_err(|err| DocumentError::Malformed(format!("run text: {err}")))?;
                    push_text(current_run.as_mut(), &decoded);
                }
                Event::GeneralRef(reference) if in_text => {
                    let name = reference
                        .decode()
                        .map_err(|err| DocumentError::Malformed(format!("run text: {err}")))?;
                    let resolved = resolve_entity(&name).ok_or_else(|| {
                        DocumentError::Malformed(format!("unknown entity `&{name};`"))
                    })?;
                    push_text(current_run.as_mut(), &resolved.to_string());
                }
                Event::End(end) => match end.name().as_ref() {
                    b"w:pPr" if current_run.is_none() => {
                        properties_depth = properties_depth.saturating_sub(1);
                        if properties_depth == 0 {
                            if let Some(start) = properties_start.take() {
                                block.properties_xml = Some(xml[start..after].to_string());
                            }
                        }
                    }
                    b"w:rPr" => {
                        if let Some(start) = run_properties_start.take() {
                            if block.runs.is_empty() && block.first_run_properties_xml.is_none() {
                                block.first_run_properties_xml =
                                    Some(xml[start..after].to_string());
                            }
                        }
                    }
                    b"w:t" => in_text = false,
                    b"w:r" => {
                        run_depth = run_depth.saturating_sub(1);
                        if run_depth == 0 {
                            if let Some(run) = current_run.take() {
                                block.runs.push(run);
                            }
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(block)
    }
}

fn apply_bold(run: Option<&mut Run>, start: &quick_xml::events::BytesStart<'_>) {
    if let Some(run) = run {
        run.bold = !matches!(
            attribute_value(start, b"w:val").as_deref(),
            Some("0" | "false" | "off")
        );
    }
}

fn push_text(run: Option<&mut Run>, text: &str) {
    if let Some(run) = run {
        run.text.push_str(text);
    }
}

fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse::<u32>().ok()?,
            };
            char::from_u32(value)
        }
    }
}

/// Byte offset of the `<` opening the tag that ends at `after`.
fn tag_start(xml: &str, after: usize) -> DocumentResult<usize> {
    xml.get(..after)
        .and_then(|head| head.rfind('<'))
        .ok_or_else(|| DocumentError::Malformed(format!("no tag start before offset {after}")))
}

fn element_name(raw: &str) -> &str {
    let name = raw.trim_start_matches('<');
    let end = name
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(name.len());
    &name[..end]
}

/// Renders a single-run paragraph. `Inherit` reuses `existing` properties.
fn render_paragraph(
    text: &str,
    format: ParagraphFormat,
    existing: Option<&ParagraphBlock>,
) -> String {
    let (properties, run_properties) = match format {
        ParagraphFormat::Indented { left_twips } => (
            format!("<w:pPr><w:ind w:left=\"{left_twips}\"/></w:pPr>"),
            String::new(),
        ),
        ParagraphFormat::Inherit => (
            existing
                .and_then(|block| block.properties_xml.clone())
                .unwrap_or_default(),
            existing
                .and_then(|block| block.first_run_properties_xml.clone())
                .unwrap_or_default(),
        ),
    };
    format!(
        "<w:p>{properties}<w:r>{run_properties}<w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
        escape(text)
    )
}

#[cfg(test)]
mod tests {
    use super::{element_name, resolve_entity, Body, ParagraphBlock};

    const BODY: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
        r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Projects</w:t></w:r></w:p>"#,
        r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        r#"<w:p/>"#,
        r#"<w:sectPr><w:pgSz w:w="12240"/></w:sectPr>"#,
        r#"</w:body></w:document>"#
    );

    #[test]
    fn body_parse_splits_direct_children_and_round_trips() {
        let body = Body::parse(BODY).unwrap();
        assert_eq!(body.blocks.len(), 4);
        assert_eq!(body.paragraph_blocks().count(), 2);
        assert_eq!(body.paragraph_position(1), Some(2));
        assert_eq!(body.append_position(), 3);
        assert_eq!(body.render(), BODY);
    }

    #[test]
    fn paragraph_parse_reads_style_runs_and_entities() {
        let block = ParagraphBlock::parse(concat!(
            r#"<w:p><w:pPr><w:pStyle w:val="Title"/><w:rPr><w:b/></w:rPr></w:pPr>"#,
            r#"<w:r><w:rPr><w:b/><w:sz w:val="48"/></w:rPr><w:t>R&amp;D </w:t></w:r>"#,
            r#"<w:r><w:rPr><w:b w:val="0"/></w:rPr><w:t xml:space="preserve">wins</w:t><w:tab/></w:r>"#,
            r#"</w:p>"#
        ))
        .unwrap();
        assert_eq!(block.style_id.as_deref(), Some("Title"));
        assert_eq!(block.runs.len(), 2);
        assert_eq!(block.runs[0].text, "R&D ");
        assert!(block.runs[0].bold);
        assert_eq!(block.runs[1].text, "wins\t");
        assert!(!block.runs[1].bold);
        assert!(block
            .first_run_properties_xml
            .as_deref()
            .is_some_and(|xml| xml.contains("w:sz")));
        assert!(block
            .properties_xml
            .as_deref()
            .is_some_and(|xml| xml.starts_with("<w:pPr>") && xml.ends_with("</w:pPr>")));
    }

    #[test]
    fn paragraph_parse_ignores_previous_properties_of_tracked_change() {
        let block = ParagraphBlock::parse(concat!(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading2"/>"#,
            r#"<w:pPrChange w:id="1" w:author="a"><w:pPr><w:pStyle w:val="Normal"/></w:pPr></w:pPrChange>"#,
            r#"</w:pPr><w:r><w:t>Articles</w:t></w:r></w:p>"#
        ))
        .unwrap();
        assert_eq!(block.style_id.as_deref(), Some("Heading2"));
        let properties = block.properties_xml.unwrap();
        assert!(properties.starts_with("<w:pPr><w:pStyle w:val=\"Heading2\"/>"));
        assert!(properties.ends_with("</w:pPrChange></w:pPr>"));
        assert_eq!(block.runs[0].text, "Articles");
    }

    #[test]
    fn helpers_resolve_entities_and_names() {
        assert_eq!(resolve_entity("#x2022"), Some('•'));
        assert_eq!(resolve_entity("#38"), Some('&'));
        assert_eq!(resolve_entity("nbsp"), None);
        assert_eq!(element_name("<w:sectPr w:rsidR=\"1\">"), "w:sectPr");
        assert_eq!(element_name("<w:p/>"), "w:p");
    }
}
