//! JSON rendering for outlines, feature rows and ranking reports.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::outline::DocumentOutline;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize any output record.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Render a document outline in its nested or flat form.
pub fn outline_to_json(doc: &DocumentOutline, nested: bool, format: JsonFormat) -> Result<String> {
    if nested {
        to_json(doc, format)
    } else {
        to_json(&doc.to_flat(), format)
    }
}
