//! Error types for sectionrank.

use std::io;
use thiserror::Error;

/// Result type alias for sectionrank operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting outlines or ranking sections.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure or content streams.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// A pretrained artifact is missing, unreadable or inconsistent.
    #[error("Model artifact error: {0}")]
    ModelArtifact(String),

    /// The case encoder was asked to encode a value outside its vocabulary.
    #[error("Unseen category for case encoder: {0:?}")]
    UnseenCategory(String),

    /// The label decoder produced a label the outline builder cannot interpret.
    #[error("Unexpected span label: {0:?}")]
    UnexpectedLabel(String),

    /// Embedding model failure (loading, tokenization or inference).
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Error during JSON rendering.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Whether this error must stop a whole batch run.
    ///
    /// Model artifacts are shared by every document, so a failure there can
    /// never be isolated to a single file.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ModelArtifact(_) | Error::UnseenCategory(_) | Error::UnexpectedLabel(_)
        )
    }

    /// Whether this error stems from reading a single PDF.
    pub fn is_extraction_failure(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::UnknownFormat
                | Error::UnsupportedVersion(_)
                | Error::PdfParse(_)
                | Error::Encrypted
                | Error::PageOutOfRange(_, _)
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Render(format!("JSON serialization error: {}", err))
    }
}

#[cfg(feature = "embeddings")]
impl From<candle_core::Error> for Error {
    fn from(err: candle_core::Error) -> Self {
        Error::Embedding(err.to_string())
    }
}

#[cfg(feature = "embeddings")]
impl From<tokenizers::Error> for Error {
    fn from(err: tokenizers::Error) -> Self {
        Error::Embedding(format!("tokenizer: {}", err))
    }
}

#[cfg(feature = "embeddings")]
impl From<hf_hub::api::sync::ApiError> for Error {
    fn from(err: hf_hub::api::sync::ApiError) -> Self {
        Error::Embedding(format!("model download: {}", err))
    }
}
