//! ClauseFlow Extractor
//!
//! Builds a non-destructive structural index of contracts and purchase
//! orders using a completion oracle that answers in a declared JSON schema.
//!
//! # Overview
//!
//! The oracle never returns document text. Every answer is a set of line
//! ranges over the numbered rendering of the input, and all text is sliced
//! back out of the untouched original through
//! [`IndexedDocument::extract`](clauseflow_domain::IndexedDocument::extract).
//! Oracle answers are treated as untrusted: ranges are checked, bounded
//! repairs are applied, and anything larger is surfaced as a warning.
//!
//! # Architecture
//!
//! ```text
//! Text → IndexedDocument → Segmenter (+ repair) → ClauseExtractor (windows + stitch)
//!      → validate → scope → Reconciler → DocumentIndex
//! ```
//!
//! # Key Features
//!
//! - **Segmentation**: one call partitions the document; [`repair`] closes small gaps
//! - **Chunked extraction**: oversized sections are windowed and [`stitch`]ed
//! - **Reconciliation**: cited spec identifiers resolved against a customer library
//! - **Reference processing**: spec books split into library entries
//! - **Bounded concurrency**: sections extracted in parallel, merged in order
//!
//! # Example Usage
//!
//! ```no_run
//! use clauseflow_extractor::{ExtractorConfig, InMemoryLibrary, Pipeline};
//! use clauseflow_domain::CustomerId;
//! use clauseflow_llm::OllamaOracle;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let oracle = OllamaOracle::default_endpoint("llama3.1")?;
//! let pipeline = Pipeline::new(oracle, ExtractorConfig::default())?;
//!
//! let library = InMemoryLibrary::from_toml(&std::fs::read_to_string("library.toml")?)?;
//! let text = std::fs::read_to_string("po-1234.txt")?;
//! let index = pipeline
//!     .run_reconciled(text, &CustomerId::new("acme"), &library)
//!     .await?;
//!
//! for clause in &index.clauses {
//!     println!("{} {}", clause.boundary.range, index.clause_text(clause)?);
//! }
//! for warning in &index.warnings {
//!     println!("warning: {}", warning);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod chunking;
mod clauses;
mod config;
mod error;
mod library;
mod oracle;
mod parser;
mod pipeline;
mod prompt;
mod reconcile;
mod reference;
pub mod schema;
mod segmenter;
mod types;


pub use chunking::{stitch, WindowPlanner};
pub use clauses::{validate, ClauseExtractor, CLAUSE_GAP_WARNING_LINES};
pub use config::ExtractorConfig;
pub use error::{ExtractorError, LibraryError, PipelineError};
pub use library::InMemoryLibrary;
pub use oracle::OracleAdapter;
pub use pipeline::Pipeline;
pub use reconcile::{match_citation, normalize_identifier, normalize_version, Reconciler};
pub use reference::{ProcessedSpec, ReferenceProcessor, SpecBookSplit};
pub use segmenter::{repair, Segmenter, EDGE_REPAIR_MAX_LINES, GAP_REPAIR_MAX_LINES};
pub use types::{
    DocumentIndex, IndexMetadata, IndexMode, ReconciliationStatus, ScopedClause,
};
