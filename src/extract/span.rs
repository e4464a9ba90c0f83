//! Normalized text spans and the lexical detectors that run on them.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::layout::{LayoutLine, LayoutSource};

/// One logical line of text on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    /// Normalized text (ASCII only, whitespace collapsed)
    pub text: String,
    /// Text as decoded from the PDF, before normalization
    pub raw: String,
    /// Font size of the first character run, rounded to 0.1pt
    pub size: Option<f32>,
    /// Font name of the first character run
    pub fontname: Option<String>,
    /// Page number (1-indexed)
    pub page: u32,
    /// Font name looks bold
    pub bold: bool,
    /// Font name looks italic
    pub italic: bool,
    /// Text starts with an enumerator such as "1.", "IV." or "a)"
    pub numeric_prefix: bool,
    /// Raw text starts with a bullet glyph
    pub bulleted: bool,
}

impl TextSpan {
    /// Build a span from raw line text and its representative font.
    ///
    /// Returns `None` when nothing survives normalization.
    pub fn from_raw(
        raw: impl Into<String>,
        size: Option<f32>,
        fontname: Option<String>,
        page: u32,
    ) -> Option<Self> {
        let raw = raw.into();
        let text = normalize_text(&raw);
        if text.is_empty() {
            return None;
        }

        let font = fontname.as_deref().unwrap_or("");
        Some(Self {
            bold: is_bold_font(font),
            italic: is_italic_font(font),
            numeric_prefix: has_numeric_prefix(&text),
            bulleted: is_bulleted(&raw),
            size: size.map(round_size),
            text,
            raw,
            fontname,
            page,
        })
    }

    fn from_line(line: &LayoutLine, page: u32) -> Option<Self> {
        let first = line.first_run()?;
        Self::from_raw(line.text(), first.font_size, first.font_name.clone(), page)
    }
}

/// Extract the normalized spans of a document, in page then line order.
pub fn extract_spans<S: LayoutSource + ?Sized>(source: &S) -> Result<Vec<TextSpan>> {
    let mut spans = Vec::new();
    for page in source.page_layouts()? {
        spans.extend(
            page.lines
                .iter()
                .filter_map(|line| TextSpan::from_line(line, page.number)),
        );
    }
    Ok(spans)
}

/// Strip control characters and non-ASCII, collapse whitespace.
pub fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        let ch = match ch {
            '\r' | '\n' | '\t' => ' ',
            ' '..='~' => ch,
            _ => continue,
        };
        if ch == ' ' && (out.is_empty() || out.ends_with(' ')) {
            continue;
        }
        out.push(ch);
    }
    out.truncate(out.trim_end().len());
    out
}

/// Whether a font name denotes a bold face.
pub fn is_bold_font(fontname: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Bold|Black|Semibold|BD").unwrap())
        .is_match(fontname)
}

/// Whether a font name denotes an italic face.
pub fn is_italic_font(fontname: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Italic|Oblique").unwrap())
        .is_match(fontname)
}

/// Whether the trimmed text starts with "12.", a roman numeral and a dot, or "a)".
pub fn has_numeric_prefix(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+\.|[IVXivx]+\.|[A-Za-z]\))").unwrap())
        .is_match(text.trim())
}

/// Whether raw text opens with bullet glyphs followed by whitespace.
///
/// Must see the raw text: normalization removes the non-ASCII glyphs.
pub fn is_bulleted(raw: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*[\x{2022}\x{2023}\x{25E6}\x{2024}\x{2058}*\-]+\s+").unwrap())
        .is_match(raw)
}

fn round_size(size: f32) -> f32 {
    (size * 10.0).round() / 10.0
}
