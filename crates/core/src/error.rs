//! Error types for the extraction pipeline.
//!
//! Every stage returns [`ReadaloudError`]. Callers that only need to know
//! *which* stage failed (for logging, or to collapse everything into one
//! client-facing message) use [`ReadaloudError::kind`].
//!
//! # Example
//!
//! ```rust
//! use readaloud_core::{ErrorKind, ReadaloudError};
//!
//! let err = ReadaloudError::NoContent;
//! assert_eq!(err.kind(), ErrorKind::Extraction);
//! assert!(err.to_string().starts_with("Article parse failed"));
//! ```

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for fetching, parsing and extracting articles.
#[derive(Error, Debug)]
pub enum ReadaloudError {
    /// HTTP transport errors from reqwest.
    ///
    /// DNS failures, refused or reset connections and body read failures
    /// all end up here. A non-2xx status is not an error on its own.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The fetch did not complete within the configured deadline.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The URL is not an absolute http(s) URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The byte stream could not be turned into a document tree.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// The byte stream is not text.
    #[error("Invalid character encoding")]
    InvalidEncoding,

    /// The best candidate scored below the readability threshold.
    #[error("Article parse failed: score {score:.1} below threshold {threshold:.1}")]
    NotReadable { score: f64, threshold: f64 },

    /// The document had no candidate elements at all.
    #[error("Article parse failed: no content candidates")]
    NoContent,

    /// A candidate was chosen but nothing survived cleanup.
    #[error("Article parse failed: empty article content")]
    EmptyArticle,

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Local I/O errors (reading files or stdin).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The insight service failed or replied without text.
    #[error("Insight request failed: {0}")]
    Insight(String),
}

/// Coarse classification of a [`ReadaloudError`], matching the pipeline stage
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fetch or transport failure.
    Network,
    /// Raw bytes could not be decoded into a document tree.
    Parse,
    /// A tree was built but no usable article was found.
    Extraction,
    /// Bad caller input (URL, file path).
    Input,
    /// Downstream insight service failure.
    Insight,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Network => "network",
            ErrorKind::Parse => "parse",
            ErrorKind::Extraction => "extraction",
            ErrorKind::Input => "input",
            ErrorKind::Insight => "insight",
        };
        f.write_str(name)
    }
}

impl ReadaloudError {
    /// Returns the stage classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReadaloudError::HttpError(_) | ReadaloudError::Timeout { .. } => ErrorKind::Network,
            ReadaloudError::HtmlParseError(_) | ReadaloudError::InvalidEncoding => ErrorKind::Parse,
            ReadaloudError::NotReadable { .. } | ReadaloudError::NoContent | ReadaloudError::EmptyArticle => {
                ErrorKind::Extraction
            }
            ReadaloudError::InvalidUrl(_) | ReadaloudError::FileNotFound(_) | ReadaloudError::Io(_) => {
                ErrorKind::Input
            }
            ReadaloudError::Insight(_) => ErrorKind::Insight,
        }
    }
}

/// Result type alias for ReadaloudError.
pub type Result<T> = std::result::Result<T, ReadaloudError>;
