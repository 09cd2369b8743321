//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Oracle backend error
    #[error("Oracle error: {0}")]
    Oracle(#[from] clauseflow_llm::LlmError),

    /// Engine error
    #[error(transparent)]
    Extractor(#[from] clauseflow_extractor::ExtractorError),

    /// Pipeline error
    #[error(transparent)]
    Pipeline(#[from] clauseflow_extractor::PipelineError),

    /// Reference library error
    #[error(transparent)]
    Library(#[from] clauseflow_extractor::LibraryError),

    /// Line range error
    #[error(transparent)]
    Range(#[from] clauseflow_domain::LineRangeError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not permitted
    #[error("Operation not permitted: {0}")]
    NotPermitted(String),
}
