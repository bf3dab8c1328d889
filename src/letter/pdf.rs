// src/letter/pdf.rs
//! Renders a generated cover letter to a one-or-more-page PDF.
//!
//! Layout is deliberately plain: A4, 1 inch margins, 12pt Helvetica, a date
//! header, then paragraph-aware line wrapping. Long letters flow onto
//! additional pages; nothing is ever truncated.

use anyhow::{Context, Result};
use chrono::Local;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::error;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 25.4;
const BODY_FONT_PT: f32 = 12.0;
const LINE_HEIGHT_MM: f32 = 6.0;
const PARAGRAPH_GAP_MM: f32 = 10.0;
const PARAGRAPH_TRAILER_MM: f32 = 2.0;
const HEADER_GAP_MM: f32 = 10.0;

// Rough advance width of an average Helvetica glyph, as a fraction of the
// font size. Used only to pick a wrap column; actual rendering never clips.
const AVG_GLYPH_RATIO: f32 = 0.5;
const PT_TO_MM: f32 = 0.352_778;

/// Renders cover letter text into uniquely named PDFs under `output_dir`.
pub struct CoverLetterRenderer {
    output_dir: PathBuf,
}

impl CoverLetterRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render `content` to a PDF named after `company_name`, or `None` if any
    /// rendering or IO step fails. Soft failure, same as generation.
    pub fn render(&self, content: &str, company_name: &str) -> Option<PathBuf> {
        match self.render_inner(content, company_name) {
            Ok(path) => Some(path),
            Err(e) => {
                error!("Error creating PDF cover letter: {:#}", e);
                None
            }
        }
    }

    fn render_inner(&self, content: &str, company_name: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create cover letter directory: {}",
                self.output_dir.display()
            )
        })?;

        let (doc, page, layer) =
            PdfDocument::new("Cover Letter", Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .context("Failed to load builtin Helvetica font")?;

        let mut cursor = PageCursor {
            doc: &doc,
            font: &font,
            layer: doc.get_page(page).get_layer(layer),
            y: PAGE_HEIGHT_MM - MARGIN_MM,
        };

        // Date header, then a blank gap before the body.
        cursor.write_line(&Local::now().format("%B %d, %Y").to_string());
        cursor.advance(HEADER_GAP_MM);

        for line in content.split('\n') {
            let line = line.trim();
            if line.is_empty() {
                cursor.advance(PARAGRAPH_GAP_MM);
            } else {
                for wrapped in wrap_line(line, max_chars_per_line()) {
                    cursor.write_line(&wrapped);
                }
                cursor.advance(PARAGRAPH_TRAILER_MM);
            }
        }

        drop(cursor);

        let filename = format!(
            "cover_letter_{}_{}.pdf",
            sanitize_company(company_name),
            Local::now().format("%Y%m%d_%H%M%S")
        );
        let path = self.output_dir.join(filename);

        let file = File::create(&path)
            .with_context(|| format!("Failed to create PDF file: {}", path.display()))?;
        doc.save(&mut BufWriter::new(file))
            .context("Failed to write PDF document")?;

        Ok(path)
    }
}

/// Tracks the vertical write position, appending pages on overflow.
struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    font: &'a IndirectFontRef,
    layer: PdfLayerReference,
    y: f32,
}

impl PageCursor<'_> {
    fn write_line(&mut self, text: &str) {
        self.ensure_room();
        self.layer
            .use_text(text, BODY_FONT_PT, Mm(MARGIN_MM), Mm(self.y), self.font);
        self.y -= LINE_HEIGHT_MM;
    }

    fn advance(&mut self, gap_mm: f32) {
        self.y -= gap_mm;
    }

    fn ensure_room(&mut self) {
        if self.y < MARGIN_MM {
            let (page, layer) =
                self.doc
                    .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
    }
}

fn max_chars_per_line() -> usize {
    let printable_mm = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    let glyph_mm = BODY_FONT_PT * AVG_GLYPH_RATIO * PT_TO_MM;
    (printable_mm / glyph_mm) as usize
}

/// Greedy word wrap at `max_chars` columns. Words longer than a full line are
/// split hard so no line ever exceeds the column limit.
fn wrap_line(line: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        let mut word = word;
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let (head, tail) = split_at_char_boundary(word, max_chars);
            lines.push(head.to_string());
            word = tail;
        }

        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + 1 + word.len() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn split_at_char_boundary(word: &str, at: usize) -> (&str, &str) {
    let mut index = at.min(word.len());
    while index > 0 && !word.is_char_boundary(index) {
        index -= 1;
    }
    if index == 0 {
        // First char is wider than the limit; take it whole.
        index = word
            .chars()
            .next()
            .map(char::len_utf8)
            .unwrap_or(word.len());
    }
    word.split_at(index)
}

/// Keep only characters safe for a filename: ASCII alphanumerics, space,
/// underscore and hyphen.
pub fn sanitize_company(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect()
}
