//! Reference document module - customer specification books
//!
//! A reference document is a customer's own specification (quality manual,
//! process spec). Processing one yields the metadata that becomes a
//! [`crate::LibraryEntry`] plus the requirement structure inside it.

use crate::range::LineRange;

/// Identity of a reference document, as read from its first pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMetadata {
    /// Spec identifier, e.g. "SDC-Q-401"
    pub identifier: String,

    /// Revision, e.g. "Rev C"
    pub version: Option<String>,

    /// Document title
    pub title: Option<String>,
}

/// A numbered requirement inside a reference document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementBoundary {
    /// Lines covered by the requirement
    pub range: LineRange,

    /// Requirement number like "4.2.1"
    pub number: Option<String>,

    /// Requirement title
    pub title: Option<String>,
}

/// One specification inside a spec book (a file bundling several specs)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecBoundary {
    /// Lines covered by this spec
    pub range: LineRange,

    /// Spec identifier
    pub identifier: String,

    /// Revision
    pub version: Option<String>,

    /// Title
    pub title: Option<String>,
}

impl SpecBoundary {
    /// Metadata for the bundled spec
    pub fn metadata(&self) -> ReferenceMetadata {
        ReferenceMetadata {
            identifier: self.identifier.clone(),
            version: self.version.clone(),
            title: self.title.clone(),
        }
    }
}
