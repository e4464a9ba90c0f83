//! Layout source backed by lopdf.
//!
//! Interprets each page's content stream just far enough to recover text
//! runs, their font and their baseline position, then groups runs into
//! lines.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};

use super::layout::{group_runs_into_lines, CharRun, LayoutSource, PageLayout};

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Default leading when a content stream never sets TL.
const DEFAULT_LEADING: f32 = 12.0;

/// Check that `data` starts with a PDF header and return its version.
pub fn check_pdf_header(data: &[u8]) -> Result<String> {
    if data.len() < PDF_MAGIC.len() + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();

    let valid = matches!(version_bytes, [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit());
    if !valid {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(version)
}

/// [`LayoutSource`] backed by `lopdf::Document`.
pub struct LopdfSource {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
}

impl LopdfSource {
    /// Load from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Load from an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        check_pdf_header(data)?;

        let doc = LopdfDocument::load_mem(data)?;
        if doc.is_encrypted() {
            log::warn!("Document is encrypted; text may not decode");
        }

        let pages = doc.get_pages();
        Ok(Self { doc, pages })
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn page_runs(&self, page_id: ObjectId) -> Result<Vec<CharRun>> {
        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;
        let content = self
            .doc
            .get_page_content(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;
        let content =
            lopdf::content::Content::decode(&content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut state = TextState::default();
        let mut runs = Vec::new();

        for op in content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "BT" => {
                    state.in_text = true;
                    state.matrix = TextMatrix::default();
                }
                "ET" => state.in_text = false,
                "Tf" if operands.len() >= 2 => {
                    if let Object::Name(name) = &operands[0] {
                        state.font_resource = name.clone();
                        state.font_name = Some(base_font_name(&fonts, name));
                    }
                    state.font_size = get_number(&operands[1]).unwrap_or(12.0);
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(get_number) {
                        state.leading = leading;
                    }
                }
                "Td" if operands.len() >= 2 => {
                    let tx = get_number(&operands[0]).unwrap_or(0.0);
                    let ty = get_number(&operands[1]).unwrap_or(0.0);
                    state.matrix.next_line_at(tx, ty);
                }
                "TD" if operands.len() >= 2 => {
                    let tx = get_number(&operands[0]).unwrap_or(0.0);
                    let ty = get_number(&operands[1]).unwrap_or(0.0);
                    state.leading = -ty;
                    state.matrix.next_line_at(tx, ty);
                }
                "Tm" if operands.len() >= 6 => {
                    let n: Vec<f32> = operands.iter().map(|o| get_number(o).unwrap_or(0.0)).collect();
                    state.matrix.set(n[0], n[1], n[2], n[3], n[4], n[5]);
                }
                "T*" => state.matrix.next_line_at(0.0, -state.leading),
                "Tj" | "TJ" | "'" | "\"" => {
                    if matches!(op.operator.as_str(), "'" | "\"") {
                        state.matrix.next_line_at(0.0, -state.leading);
                    }
                    if !state.in_text {
                        continue;
                    }
                    let text = match op.operator.as_str() {
                        "TJ" => self.decode_array(&fonts, &state, operands.first()),
                        "\"" => self.decode_operand(&fonts, &state, operands.get(2)),
                        _ => self.decode_operand(&fonts, &state, operands.first()),
                    };
                    if let Some(run) = state.emit(text) {
                        runs.push(run);
                    }
                }
                _ => {}
            }
        }

        Ok(runs)
    }

    fn decode_operand(
        &self,
        fonts: &BTreeMap<Vec<u8>, &Dictionary>,
        state: &TextState,
        operand: Option<&Object>,
    ) -> String {
        match operand {
            Some(Object::String(bytes, _)) => self.decode_bytes(fonts, state, bytes),
            _ => String::new(),
        }
    }

    /// Decode a TJ array; large negative adjustments become word spaces.
    fn decode_array(
        &self,
        fonts: &BTreeMap<Vec<u8>, &Dictionary>,
        state: &TextState,
        operand: Option<&Object>,
    ) -> String {
        let Some(Object::Array(items)) = operand else {
            return String::new();
        };

        let mut combined = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => {
                    combined.push_str(&self.decode_bytes(fonts, state, bytes));
                }
                other => {
                    // 1/1000 text space units; ~200 is a typical word gap
                    let adjustment = -get_number(other).unwrap_or(0.0);
                    if adjustment > 200.0
                        && !combined.is_empty()
                        && !combined.ends_with(char::is_whitespace)
                    {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }

    fn decode_bytes(
        &self,
        fonts: &BTreeMap<Vec<u8>, &Dictionary>,
        state: &TextState,
        bytes: &[u8],
    ) -> String {
        let encoding = fonts
            .get(&state.font_resource)
            .and_then(|f| f.get_font_encoding(&self.doc).ok());

        match encoding {
            Some(ref enc) => LopdfDocument::decode_text(enc, bytes)
                .unwrap_or_else(|_| decode_text_simple(bytes)),
            None => decode_text_simple(bytes),
        }
    }
}

impl LayoutSource for LopdfSource {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_layout(&self, page_num: u32) -> Result<PageLayout> {
        let page_id = self
            .pages
            .get(&page_num)
            .ok_or(Error::PageOutOfRange(page_num, self.page_count()))?;

        let runs = self.page_runs(*page_id)?;
        log::debug!("Page {}: {} text runs", page_num, runs.len());

        Ok(PageLayout {
            number: page_num,
            lines: group_runs_into_lines(runs),
        })
    }

    fn page_layouts(&self) -> Result<Vec<PageLayout>> {
        self.pages
            .keys()
            .map(|page_num| self.page_layout(*page_num))
            .collect()
    }
}

/// Graphics-independent text state tracked while walking a content stream.
#[derive(Debug, Clone)]
struct TextState {
    in_text: bool,
    font_resource: Vec<u8>,
    font_name: Option<String>,
    font_size: f32,
    leading: f32,
    matrix: TextMatrix,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            in_text: false,
            font_resource: Vec::new(),
            font_name: None,
            font_size: 12.0,
            leading: DEFAULT_LEADING,
            matrix: TextMatrix::default(),
        }
    }
}

impl TextState {
    /// Turn decoded text into a run at the current position and advance.
    fn emit(&mut self, text: String) -> Option<CharRun> {
        if text.trim().is_empty() {
            return None;
        }

        let size = self.font_size * self.matrix.vertical_scale();
        // No glyph widths available here; half an em per character is close
        // enough for spacing decisions between runs.
        let width = text.chars().count() as f32 * size * 0.5;
        let (x, y) = self.matrix.position();
        self.matrix.advance(width);

        Some(CharRun {
            text,
            font_name: self.font_name.clone(),
            font_size: Some(size),
            x,
            y,
            width,
        })
    }
}

/// Text matrix for tracking position in a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    line_e: f32,
    line_f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_e: 0.0,
            line_f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self {
            a,
            b,
            c,
            d,
            e,
            f,
            line_e: e,
            line_f: f,
        };
    }

    /// Move to the start of the next line, offset from the current line start.
    fn next_line_at(&mut self, tx: f32, ty: f32) {
        self.line_e += tx * self.a + ty * self.c;
        self.line_f += tx * self.b + ty * self.d;
        self.e = self.line_e;
        self.f = self.line_f;
    }

    /// Move along the current line after showing text (unscaled width).
    fn advance(&mut self, width: f32) {
        self.e += width;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

fn base_font_name(fonts: &BTreeMap<Vec<u8>, &Dictionary>, resource: &[u8]) -> String {
    fonts
        .get(resource)
        .and_then(|font| font.get(b"BaseFont").ok())
        .and_then(|o| o.as_name().ok())
        .map(|n| String::from_utf8_lossy(n).to_string())
        .unwrap_or_else(|| String::from_utf8_lossy(resource).to_string())
}

/// Helper to extract a number from a PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Simple text decoding fallback when no encoding is available.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Latin-1
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
