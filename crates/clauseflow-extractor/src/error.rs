//! Error types for the extraction engines

use clauseflow_domain::{LineRange, LineRangeError};
use thiserror::Error;

/// Errors that can occur during a single engine stage
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The oracle could not be reached or rejected the request
    #[error("Oracle call failed: {0}")]
    OracleCallFailed(String),

    /// The oracle answered with something that is not a valid instance of the schema
    #[error("Unparseable oracle output: {0}")]
    OracleOutputUnparseable(String),

    /// The oracle did not answer in time
    #[error("Oracle call timed out after {0}s")]
    Timeout(u64),

    /// A caller asked for a range outside the document
    #[error(transparent)]
    InvalidRange(#[from] LineRangeError),

    /// The reference library could not be read
    #[error("Reference library error: {0}")]
    Library(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::OracleOutputUnparseable(e.to_string())
    }
}

/// Errors that abort a document's pipeline
///
/// Each variant names the stage that failed, so a failed extraction is
/// never mistaken for a document with zero clauses.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Pass 1 failed
    #[error("Segmentation failed: {0}")]
    Segmentation(#[source] ExtractorError),

    /// Pass 2 failed for one section
    #[error("Clause extraction failed for section '{section}' (lines {range}): {source}")]
    Extraction {
        /// Label of the failing section
        section: String,
        /// Lines of the failing section
        range: LineRange,
        /// Underlying failure
        #[source]
        source: ExtractorError,
    },

    /// An extraction task could not be joined
    #[error("Extraction task failed: {0}")]
    Task(String),
}

/// Errors raised while loading or saving a reference library
#[derive(Error, Debug)]
pub enum LibraryError {
    /// The TOML could not be parsed
    #[error("Failed to parse library: {0}")]
    Parse(String),

    /// The library could not be serialized
    #[error("Failed to serialize library: {0}")]
    Serialize(String),

    /// An entry id is not a valid UUID
    #[error("Invalid entry id: {0}")]
    InvalidId(String),
}
