//! Span extraction: PDF pages to normalized text spans.
//!
//! The PDF library sits behind [`LayoutSource`]; [`LopdfSource`] is the
//! lopdf-backed implementation and `Vec<PageLayout>` serves in-memory
//! layouts.

mod layout;
mod lopdf_source;
mod span;

pub use layout::{group_runs_into_lines, CharRun, LayoutLine, LayoutSource, PageLayout};
pub use lopdf_source::{check_pdf_header, LopdfSource};
pub use span::{
    extract_spans, has_numeric_prefix, is_bold_font, is_bulleted, is_italic_font, normalize_text,
    TextSpan,
};
