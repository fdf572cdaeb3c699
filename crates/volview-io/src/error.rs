//! Error types for reader operations.
//!
//! A reader that cannot accept a resource reports it through [`IoError`];
//! format dispatch treats any error from `open` as "try the next format".

use std::io;
use thiserror::Error;

/// Reader error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Content not recognized by this reader.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Recognized but corrupted file.
    #[error("invalid file: {0}")]
    InvalidFile(String),

    /// Required data absent from an otherwise valid file.
    #[error("missing data: {0}")]
    MissingData(String),

    /// Dimension or size mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected size.
        expected: String,
        /// Actual size.
        actual: String,
    },

    /// Parse error (file name tokens, headers).
    #[error("parse error: {0}")]
    Parse(String),

    /// `load`/`field` called before a successful `open`.
    #[error("reader has no open resource")]
    NotOpen,

    /// Field index past the reader's field count.
    #[error("field index {index} out of range ({count} fields)")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Available fields.
        count: usize,
    },

    /// Reader compiled out.
    #[error("feature unavailable: {0}")]
    UnsupportedFeature(String),

    /// Loaded field violates a data model invariant.
    #[error("field invariant: {0}")]
    Field(#[from] volview_core::Error),
}

/// Result type for reader operations.
pub type IoResult<T> = Result<T, IoError>;
