//! Per-document outline extraction and document batches.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::classify::{classify, ClassifiedSpan, ModelBundle};
use crate::error::{Error, Result};
use crate::extract::{extract_spans, LayoutSource, LopdfSource};
use crate::outline::{build_outline, DocumentOutline, TitlePolicy};
use crate::rank::{rank_sections, Embedder, Query, RankOptions, RankingReport};
use crate::sections::{flatten, Section};

/// How batch runs treat a document that cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Abort the batch on the first unreadable document
    Strict,
    /// Record the failure and continue with the next document
    #[default]
    Lenient,
}

/// Options for outline extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Handling of per-document failures in batches
    pub error_mode: ErrorMode,

    /// Process batch documents on the rayon thread pool
    pub parallel: bool,

    /// Title heuristics
    pub title_policy: TitlePolicy,

    /// Render hierarchical outlines rather than flat heading lists
    pub nested: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            parallel: true,
            title_policy: TitlePolicy::default(),
            nested: false,
        }
    }
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Abort batches on the first unreadable document.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Enable or disable parallel batch processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the title heuristics.
    pub fn with_title_policy(mut self, policy: TitlePolicy) -> Self {
        self.title_policy = policy;
        self
    }

    /// Choose nested (`true`) or flat (`false`) outline rendering.
    pub fn with_nested(mut self, nested: bool) -> Self {
        self.nested = nested;
        self
    }

    /// Render hierarchical outlines with paragraph text.
    pub fn nested(mut self) -> Self {
        self.nested = true;
        self
    }
}

/// Outline of one document, labeled spans included.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    /// Document identifier (file name)
    pub name: String,
    pub outline: DocumentOutline,
    pub spans: Vec<ClassifiedSpan>,
}

impl ProcessedDocument {
    /// Rankable sections of this document.
    pub fn sections(&self) -> Vec<Section> {
        flatten(&self.outline.outline, &self.name)
    }
}

/// A document that could not be processed.
#[derive(Debug)]
pub struct DocumentFailure {
    pub document: String,
    pub error: Error,
}

/// Result of a batch run: successes in input order plus isolated failures.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub documents: Vec<ProcessedDocument>,
    pub failures: Vec<DocumentFailure>,
}

impl BatchOutcome {
    /// Sections of all documents, document by document.
    pub fn sections(&self) -> Vec<Section> {
        self.documents.iter().flat_map(|d| d.sections()).collect()
    }
}

/// Ranking report plus the documents that were skipped.
#[derive(Debug)]
pub struct RankOutcome {
    pub report: RankingReport,
    pub failures: Vec<DocumentFailure>,
}

/// Build the outline of one document from any layout source.
pub fn process_source<S: LayoutSource + ?Sized>(
    source: &S,
    name: &str,
    bundle: &ModelBundle,
    options: &PipelineOptions,
) -> Result<ProcessedDocument> {
    let spans = extract_spans(source)?;
    let span_count = spans.len();
    let labeled = classify(spans, bundle)?;

    let outline = build_outline(&labeled);
    let title = options.title_policy.select(&labeled, &outline);
    log::debug!(
        "{}: {} pages, {} spans, {} headings",
        name,
        source.page_count(),
        span_count,
        outline.heading_count()
    );

    Ok(ProcessedDocument {
        name: name.to_string(),
        outline: DocumentOutline { title, outline },
        spans: labeled,
    })
}

/// Build the outline of one PDF file.
pub fn process_file(
    path: impl AsRef<Path>,
    bundle: &ModelBundle,
    options: &PipelineOptions,
) -> Result<ProcessedDocument> {
    let path = path.as_ref();
    let source = LopdfSource::open(path)?;
    process_source(&source, &document_name(path), bundle, options)
}

/// Build outlines for many PDF files.
///
/// Unreadable documents are collected as failures in lenient mode. Model
/// errors always end the batch.
pub fn process_batch<P>(paths: &[P], bundle: &ModelBundle, options: &PipelineOptions) -> Result<BatchOutcome>
where
    P: AsRef<Path> + Sync,
{
    run_batch(paths, options, |path| {
        let path = path.as_ref();
        (document_name(path), process_file(path, bundle, options))
    })
}

/// Build outlines for named in-memory layout sources.
pub fn process_sources<S>(
    sources: &[(String, S)],
    bundle: &ModelBundle,
    options: &PipelineOptions,
) -> Result<BatchOutcome>
where
    S: LayoutSource + Sync,
{
    run_batch(sources, options, |(name, source)| {
        (name.clone(), process_source(source, name, bundle, options))
    })
}

fn run_batch<T, F>(items: &[T], options: &PipelineOptions, run: F) -> Result<BatchOutcome>
where
    T: Sync,
    F: Fn(&T) -> (String, Result<ProcessedDocument>) + Sync + Send,
{
    let mut outcome = BatchOutcome::default();
    if options.parallel {
        let results: Vec<_> = items.par_iter().map(&run).collect();
        for (name, result) in results {
            record(&mut outcome, name, result, options.error_mode)?;
        }
    } else {
        for item in items {
            let (name, result) = run(item);
            record(&mut outcome, name, result, options.error_mode)?;
        }
    }

    log::info!(
        "Processed {} documents ({} failed)",
        outcome.documents.len(),
        outcome.failures.len()
    );
    Ok(outcome)
}

fn record(
    outcome: &mut BatchOutcome,
    name: String,
    result: Result<ProcessedDocument>,
    mode: ErrorMode,
) -> Result<()> {
    match result {
        Ok(doc) => outcome.documents.push(doc),
        Err(error) if error.is_fatal() || mode == ErrorMode::Strict => return Err(error),
        Err(error) => {
            log::warn!("Skipping {}: {}", name, error);
            outcome.failures.push(DocumentFailure {
                document: name,
                error,
            });
        }
    }
    Ok(())
}

/// Extract, merge and rank the sections of many PDF files.
pub fn rank_documents<P, E>(
    paths: &[P],
    bundle: &ModelBundle,
    query: &Query,
    embedder: &E,
    options: &PipelineOptions,
    rank_options: &RankOptions,
) -> Result<RankOutcome>
where
    P: AsRef<Path> + Sync,
    E: Embedder + ?Sized,
{
    let batch = process_batch(paths, bundle, options)?;
    let sections = batch.sections();
    log::info!("Ranking {} sections", sections.len());

    let ranked = rank_sections(sections, query, embedder)?;
    Ok(RankOutcome {
        report: RankingReport::build(&ranked, query, rank_options),
        failures: batch.failures,
    })
}

/// PDF files directly inside a directory, sorted by file name.
pub fn collect_pdfs(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut pdfs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if path.is_file() && is_pdf {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

/// File name used to identify a document in outputs.
pub fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
