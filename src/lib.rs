//! # sectionrank
//!
//! Document outline extraction and persona-driven section ranking for PDFs.
//!
//! A PDF is read into text spans, each span is labeled by a pretrained
//! classifier (heading level, paragraph or other), and the labeled sequence
//! is folded into a heading tree. Across a document collection the headings
//! become sections that are ranked by semantic similarity to a
//! "persona + task" query.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sectionrank::{extract_outline, render, ModelBundle};
//!
//! fn main() -> sectionrank::Result<()> {
//!     let bundle = ModelBundle::load("models")?;
//!     let outline = extract_outline("document.pdf", &bundle)?;
//!
//!     let json = render::to_json(&outline, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `embeddings` (default): all-MiniLM-L6-v2 sentence embeddings via candle

pub mod classify;
pub mod error;
pub mod extract;
pub mod features;
pub mod outline;
pub mod pipeline;
pub mod rank;
pub mod render;
pub mod sections;

// Re-export commonly used types
pub use classify::{classify, ClassifiedSpan, ModelBundle, SpanLabel, SpanModel};
pub use error::{Error, Result};
pub use extract::{extract_spans, LayoutSource, LopdfSource, TextSpan};
pub use features::{FeatureRow, FeatureVector, TextCase};
pub use outline::{
    DocumentOutline, FlatDocumentOutline, FlatOutlineEntry, HeadingNode, Outline, OutlineBuilder,
    OutlineEntry, ParagraphNode, TitlePolicy,
};
pub use pipeline::{
    BatchOutcome, DocumentFailure, ErrorMode, PipelineOptions, ProcessedDocument, RankOutcome,
};
#[cfg(feature = "embeddings")]
pub use rank::MiniLmEmbedder;
pub use rank::{Embedder, Query, RankOptions, RankedSection, RankingReport};
pub use render::JsonFormat;
pub use sections::Section;

use std::path::Path;

/// Extract the titled outline of a PDF file with default options.
///
/// # Example
///
/// ```no_run
/// use sectionrank::{extract_outline, ModelBundle};
///
/// let bundle = ModelBundle::load("models").unwrap();
/// let doc = extract_outline("document.pdf", &bundle).unwrap();
/// println!("{}: {} headings", doc.title, doc.outline.heading_count());
/// ```
pub fn extract_outline<P: AsRef<Path>>(path: P, bundle: &ModelBundle) -> Result<DocumentOutline> {
    extract_outline_with_options(path, bundle, &PipelineOptions::default())
}

/// Extract the titled outline of a PDF file with custom options.
pub fn extract_outline_with_options<P: AsRef<Path>>(
    path: P,
    bundle: &ModelBundle,
    options: &PipelineOptions,
) -> Result<DocumentOutline> {
    Ok(pipeline::process_file(path, bundle, options)?.outline)
}

/// Extract the outline of a PDF held in memory.
pub fn extract_outline_from_bytes(data: &[u8], bundle: &ModelBundle) -> Result<DocumentOutline> {
    let source = LopdfSource::from_bytes(data)?;
    let options = PipelineOptions::default();
    Ok(pipeline::process_source(&source, "document.pdf", bundle, &options)?.outline)
}

/// Extract the normalized spans of a PDF file.
///
/// # Example
///
/// ```no_run
/// let spans = sectionrank::spans_from_file("document.pdf").unwrap();
/// for span in spans.iter().take(5) {
///     println!("p{} {:?} {}", span.page, span.size, span.text);
/// }
/// ```
pub fn spans_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<TextSpan>> {
    let source = LopdfSource::open(path)?;
    extract_spans(&source)
}

/// Feature rows of a PDF file, for labelling and training.
pub fn feature_rows_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<FeatureRow>> {
    let spans = spans_from_file(path)?;
    Ok(features::feature_rows(&spans))
}

/// Rank the sections of every PDF in a directory against a query.
///
/// # Example
///
/// ```no_run
/// use sectionrank::{rank_directory, MiniLmEmbedder, ModelBundle, Query};
///
/// let bundle = ModelBundle::load("models").unwrap();
/// let embedder = MiniLmEmbedder::open("minilm").unwrap();
/// let query = Query::new("A travel planner", "Plan a 4-day trip");
/// let outcome = rank_directory("pdfs", &bundle, &query, &embedder).unwrap();
/// println!("{} sections", outcome.report.extracted_sections.len());
/// ```
pub fn rank_directory<P, E>(
    dir: P,
    bundle: &ModelBundle,
    query: &Query,
    embedder: &E,
) -> Result<RankOutcome>
where
    P: AsRef<Path>,
    E: Embedder + ?Sized,
{
    let pdfs = pipeline::collect_pdfs(dir)?;
    pipeline::rank_documents(
        &pdfs,
        bundle,
        query,
        embedder,
        &PipelineOptions::default(),
        &RankOptions::default(),
    )
}
