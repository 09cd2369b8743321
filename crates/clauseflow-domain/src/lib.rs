//! ClauseFlow Domain Layer
//!
//! This crate contains the core data model for ClauseFlow's non-destructive
//! document index. It performs no I/O and defines the value objects and trait
//! interfaces that the oracle, extraction and CLI layers depend upon.
//!
//! ## Key Concepts
//!
//! - **IndexedDocument**: the untouched original text plus a line-numbered rendering
//! - **LineRange**: the only handle to document content that crosses component boundaries
//! - **SectionBoundary / ClauseBoundary**: typed line ranges produced by the oracle
//! - **DetectedCitation / LibraryEntry / ReconciledLink**: reference reconciliation
//! - **Warning**: non-fatal findings surfaced to callers, never silently dropped
//!
//! ## Architecture
//!
//! - No I/O and no knowledge of any completion service
//! - Text is never copied into boundaries; it is sliced out of the
//!   `IndexedDocument` on demand
//! - Trait definitions for the oracle and the reference library

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod citation;
pub mod clause;
pub mod document;
pub mod range;
pub mod reference;
pub mod section;
pub mod traits;
pub mod warning;

// Re-exports for convenience
pub use citation::{
    CustomerId, DetectedCitation, LibraryEntry, LibraryEntryId, MatchOutcome, ReconciledLink,
};
pub use clause::{ChunkKind, ClauseBoundary, ClauseScope};
pub use document::IndexedDocument;
pub use range::{LineRange, LineRangeError};
pub use reference::{ReferenceMetadata, RequirementBoundary, SpecBoundary};
pub use section::{LineItemMetadata, SectionBoundary, SectionKind};
pub use warning::Warning;
