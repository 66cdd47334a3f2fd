//! Error types for spreadsheet validation.
//!
//! This module provides the [`RpsError`] type for failures of the validator
//! itself (unreadable files, malformed templates, report sinks) and the
//! [`Result`] convenience type. Problems *in the metadata* are never errors:
//! they are reported as [`Finding`](crate::finding::Finding)s.

use thiserror::Error;

/// Error type for all validator library operations.
#[derive(Error, Debug)]
pub enum RpsError {
    /// The file extension is not one of `.csv`, `.xls`, `.xlsx`.
    #[error("Unsupported file extension: {0}")]
    UnsupportedFormat(String),

    /// The input bytes are not in an accepted character encoding; holds the
    /// detected charset label.
    #[error("Encoding error: charset={0}")]
    EncodingError(String),

    /// A CSV source could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A spreadsheet workbook could not be opened or read.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// The reference template is not well-formed XML.
    #[error("Template error: {0}")]
    Template(String),

    /// A findings report could not be serialized.
    #[error("Report error: {0}")]
    Report(String),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<calamine::Error> for RpsError {
    fn from(err: calamine::Error) -> Self {
        RpsError::Spreadsheet(err.to_string())
    }
}

impl From<quick_xml::Error> for RpsError {
    fn from(err: quick_xml::Error) -> Self {
        RpsError::Template(err.to_string())
    }
}

impl From<serde_json::Error> for RpsError {
    fn from(err: serde_json::Error) -> Self {
        RpsError::Report(err.to_string())
    }
}

/// Convenience type alias for [`std::result::Result`] with [`RpsError`].
pub type Result<T> = std::result::Result<T, RpsError>;
