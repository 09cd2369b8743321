//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::citation::{CustomerId, LibraryEntry};

/// A single structured-output request to a completion oracle
///
/// The oracle is untrusted: whatever it returns is parsed and validated
/// by the caller before any line number in it is believed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleRequest {
    /// System instructions
    pub system: String,

    /// User content: task instructions plus any numbered document text
    pub instructions: String,

    /// Name of the response schema, e.g. "clause_boundaries"
    pub schema_name: String,

    /// JSON schema the response must satisfy, as JSON text
    pub schema: String,

    /// Upper bound on response tokens, if the oracle supports one
    pub max_output_tokens: Option<u32>,
}

impl OracleRequest {
    /// Create a request with no output token cap
    pub fn new(
        system: impl Into<String>,
        instructions: impl Into<String>,
        schema_name: impl Into<String>,
        schema: impl Into<String>,
    ) -> Self {
        Self {
            system: system.into(),
            instructions: instructions.into(),
            schema_name: schema_name.into(),
            schema: schema.into(),
            max_output_tokens: None,
        }
    }

    /// Set the output token cap
    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }
}

/// Trait for a completion service that answers with schema-conforming JSON
///
/// Implemented by the infrastructure layer (clauseflow-llm)
pub trait CompletionOracle {
    /// Error type for oracle operations
    type Error;

    /// Send one request and return the raw JSON text of the response
    fn complete(&self, request: &OracleRequest) -> Result<String, Self::Error>;
}

/// Trait for looking up a customer's specification library
///
/// Implemented by the application layer (clauseflow-extractor)
pub trait ReferenceLibrary {
    /// Error type for library lookups
    type Error;

    /// All entries registered for `customer`, in library order
    fn entries_for_customer(&self, customer: &CustomerId)
        -> Result<Vec<LibraryEntry>, Self::Error>;
}
