/*!
 * Error types for the yattai application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or segmenting a TEI document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The input file could not be parsed as XML
    #[error("Failed to parse XML {path:?}: {detail}")]
    Malformed {
        /// Path of the offending file
        path: PathBuf,
        /// Parser diagnostic
        detail: String,
    },

    /// The document parsed but has no root element
    #[error("No root element in XML: {0:?}")]
    MissingRoot(PathBuf),

    /// The document parsed but contains no translatable segments
    #[error("No translatable segments found in {0:?}")]
    NoTranslatableContent(PathBuf),
}

/// Errors that can occur when talking to a translation provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error duplicating a translator for per-worker use
    #[error("Failed to clone translator: {0}")]
    CloneFailed(String),
}

/// Errors that can occur during a parallel translation run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A worker's translation call failed; partial results are discarded
    #[error("Translation failed: {0}")]
    TranslationFailed(String),
}

/// Errors that can occur while writing translated output
#[derive(Error, Debug)]
pub enum WriterError {
    /// Translations and segments disagree in length
    #[error("Translation count {actual} does not match segment count {expected}")]
    CountMismatch {
        /// Number of segments in the document
        expected: usize,
        /// Number of translations supplied
        actual: usize,
    },

    /// Writing or serializing the output failed
    #[error("Failed to write output {path:?}: {detail}")]
    Io {
        /// Target path
        path: PathBuf,
        /// Underlying failure
        detail: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from document reading or segmentation
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the translation pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Error from an output writer
    #[error("Writer error: {0}")]
    Writer(#[from] WriterError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
