//! Clause module - clause boundaries inside a section

use crate::range::LineRange;
use crate::section::{SectionBoundary, SectionKind};

/// Kind of an extracted chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkKind {
    /// A numbered contractual obligation or requirement
    Clause,

    /// Addresses, contacts, dates, PO details
    Administrative,

    /// Divider lines and decorative headers
    Boilerplate,

    /// A section header line such as "SECTION 2: QUALITY REQUIREMENTS"
    Header,

    /// Signature or acceptance block
    Signature,
}

impl ChunkKind {
    /// All kinds, in declaration order
    pub const ALL: [ChunkKind; 5] = [
        ChunkKind::Clause,
        ChunkKind::Administrative,
        ChunkKind::Boilerplate,
        ChunkKind::Header,
        ChunkKind::Signature,
    ];

    /// Wire name used in oracle schemas and output
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkKind::Clause => "clause",
            ChunkKind::Administrative => "administrative",
            ChunkKind::Boilerplate => "boilerplate",
            ChunkKind::Header => "header",
            ChunkKind::Signature => "signature",
        }
    }

    /// Parse a kind from its wire name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "clause" => Some(ChunkKind::Clause),
            "administrative" => Some(ChunkKind::Administrative),
            "boilerplate" => Some(ChunkKind::Boilerplate),
            "header" => Some(ChunkKind::Header),
            "signature" => Some(ChunkKind::Signature),
            _ => None,
        }
    }
}

/// A clause identified by line numbers (no text copying)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseBoundary {
    /// Lines covered by the clause
    pub range: LineRange,

    /// Chunk kind
    pub kind: ChunkKind,

    /// Clause number like "1.3" or "7.2.1"
    pub number: Option<String>,

    /// Clause title if present
    pub title: Option<String>,
}

impl ClauseBoundary {
    /// Create an unnumbered, untitled boundary
    pub fn new(range: LineRange, kind: ChunkKind) -> Self {
        Self {
            range,
            kind,
            number: None,
            title: None,
        }
    }

    /// Set the clause number
    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    /// Human-readable label for warnings: the clause number, or "unnamed"
    pub fn label(&self) -> &str {
        self.number.as_deref().unwrap_or("unnamed")
    }
}

/// Which part of the purchase order a clause applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseScope {
    /// Applies to the entire order (terms-and-conditions sections)
    PoWide,

    /// Applies to one line item (line-item sections)
    LineSpecific {
        /// The line item, when the section named it
        line_item: Option<u32>,
    },

    /// No scope can be derived (other sections, single-pass extraction)
    Unscoped,
}

impl ClauseScope {
    /// Scope implied by the section a clause was extracted from
    pub fn for_section(section: &SectionBoundary) -> Self {
        match section.kind {
            SectionKind::Terms => ClauseScope::PoWide,
            SectionKind::LineItem => ClauseScope::LineSpecific {
                line_item: section.line_item_index(),
            },
            _ => ClauseScope::Unscoped,
        }
    }

    /// Short name for output
    pub fn as_str(&self) -> &'static str {
        match self {
            ClauseScope::PoWide => "po_wide",
            ClauseScope::LineSpecific { .. } => "line_specific",
            ClauseScope::Unscoped => "unscoped",
        }
    }
}
