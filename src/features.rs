//! Feature encoding for span classification.
//!
//! Every span becomes an eight-column row. The only document-relative
//! column is `is_larger_than_common_font`, measured against the modal font
//! size of the spans passed in together.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::extract::TextSpan;

/// Number of model input columns.
pub const FEATURE_COUNT: usize = 8;

/// Column names in model input order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "size",
    "bold",
    "italic",
    "text_len",
    "num_prefix",
    "is_larger_than_common_font",
    "text_case",
    "is_bulleted",
];

/// Letter case shape of a span's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextCase {
    Upper,
    Lower,
    Sentence,
    Mixed,
}

impl TextCase {
    /// Classify a string.
    ///
    /// "upper"/"lower" require at least one cased character and none of the
    /// opposite case; "sentence" is an uppercase first character followed by
    /// an all-lowercase remainder.
    pub fn of(text: &str) -> Self {
        if is_all_upper(text) {
            return TextCase::Upper;
        }
        if is_all_lower(text) {
            return TextCase::Lower;
        }

        let mut chars = text.chars();
        if let Some(first) = chars.next() {
            let rest = chars.as_str();
            if first.is_uppercase() && !rest.is_empty() && is_all_lower(rest) {
                return TextCase::Sentence;
            }
        }
        TextCase::Mixed
    }

    /// Category name as seen by the case encoder.
    pub fn as_str(&self) -> &'static str {
        match self {
            TextCase::Upper => "upper",
            TextCase::Lower => "lower",
            TextCase::Sentence => "sentence",
            TextCase::Mixed => "mixed",
        }
    }
}

impl std::fmt::Display for TextCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_all_upper(s: &str) -> bool {
    let mut cased = false;
    for c in s.chars() {
        if c.is_lowercase() {
            return false;
        }
        cased |= c.is_uppercase();
    }
    cased
}

fn is_all_lower(s: &str) -> bool {
    let mut cased = false;
    for c in s.chars() {
        if c.is_uppercase() {
            return false;
        }
        cased |= c.is_lowercase();
    }
    cased
}

/// Per-span feature encoding, before scaling and categorical encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Font size; 0 when the span has no size
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    /// Length of the normalized text in characters
    pub text_len: usize,
    pub num_prefix: bool,
    pub is_larger_than_common_font: bool,
    pub text_case: TextCase,
    pub is_bulleted: bool,
}

impl FeatureVector {
    /// Encode one span against the document's modal size.
    pub fn from_span(span: &TextSpan, common_font_size: f32) -> Self {
        Self {
            size: span.size.map(f64::from).unwrap_or(0.0),
            bold: span.bold,
            italic: span.italic,
            text_len: span.text.chars().count(),
            num_prefix: span.numeric_prefix,
            is_larger_than_common_font: span.size.is_some_and(|s| s > common_font_size),
            text_case: TextCase::of(&span.text),
            is_bulleted: span.bulleted,
        }
    }
}

/// Feature vectors of one document plus the baseline they were measured on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    pub rows: Vec<FeatureVector>,
    pub common_font_size: f32,
}

impl FeatureMatrix {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Encode all spans of one document.
pub fn encode(spans: &[TextSpan]) -> FeatureMatrix {
    let common_font_size = modal_font_size(spans);
    FeatureMatrix {
        rows: spans
            .iter()
            .map(|span| FeatureVector::from_span(span, common_font_size))
            .collect(),
        common_font_size,
    }
}

/// Most frequent span size; the earliest seen wins ties, 0 when none is sized.
pub fn modal_font_size(spans: &[TextSpan]) -> f32 {
    // Sizes are already rounded to 0.1pt; count them on a tenth-point grid.
    let mut counts: HashMap<i32, (usize, usize, f32)> = HashMap::new();
    for (order, size) in spans.iter().filter_map(|s| s.size).enumerate() {
        let key = (size * 10.0).round() as i32;
        counts.entry(key).or_insert((0, order, size)).0 += 1;
    }

    counts
        .values()
        .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
        .map(|&(_, _, size)| size)
        .unwrap_or(0.0)
}

/// A feature row together with the span text, as written to training data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    #[serde(flatten)]
    pub features: FeatureVector,
    pub text: String,
    pub page: u32,
}

/// Feature rows for labelling and model training.
pub fn feature_rows(spans: &[TextSpan]) -> Vec<FeatureRow> {
    let matrix = encode(spans);
    matrix
        .rows
        .into_iter()
        .zip(spans)
        .map(|(features, span)| FeatureRow {
            features,
            text: span.text.clone(),
            page: span.page,
        })
        .collect()
}
