//! Section module - top-level partition of a contract document

use crate::range::LineRange;

/// Kind of a document section
///
/// Sections partition the whole document:
/// - Header: preamble, parties, dates and the line-items table
/// - Terms: a named terms-and-conditions section (PO-wide clauses)
/// - LineItem: a section dedicated to one PO line item (line-specific clauses)
/// - Signature: signature and acceptance blocks
/// - Attachment: attachments, appendices, exhibits
/// - Other: anything else
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Document preamble including the line-items table
    Header,

    /// Terms and conditions
    Terms,

    /// Per-line-item section
    LineItem,

    /// Signature block
    Signature,

    /// Attachment or appendix
    Attachment,

    /// Uncategorized
    Other,
}

impl SectionKind {
    /// All kinds, in declaration order
    pub const ALL: [SectionKind; 6] = [
        SectionKind::Header,
        SectionKind::Terms,
        SectionKind::LineItem,
        SectionKind::Signature,
        SectionKind::Attachment,
        SectionKind::Other,
    ];

    /// Wire name used in oracle schemas and output
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Header => "header",
            SectionKind::Terms => "terms_and_conditions",
            SectionKind::LineItem => "line_item",
            SectionKind::Signature => "signature",
            SectionKind::Attachment => "attachment",
            SectionKind::Other => "other",
        }
    }

    /// Parse a kind from its wire name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "header" => Some(SectionKind::Header),
            "terms_and_conditions" | "terms" => Some(SectionKind::Terms),
            "line_item" => Some(SectionKind::LineItem),
            "signature" => Some(SectionKind::Signature),
            "attachment" => Some(SectionKind::Attachment),
            "other" => Some(SectionKind::Other),
            _ => None,
        }
    }

    /// Whether clauses are extracted from sections of this kind
    pub fn carries_clauses(&self) -> bool {
        matches!(self, SectionKind::Terms | SectionKind::LineItem)
    }
}

/// A section of the document identified by line numbers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionBoundary {
    /// Lines covered by the section
    pub range: LineRange,

    /// Section kind
    pub kind: SectionKind,

    /// Title as it appears in the document, e.g. "SECTION 2: QUALITY REQUIREMENTS"
    pub title: Option<String>,

    /// Section number if present, e.g. "2" or "A"
    pub number: Option<String>,

    /// PO line item this section belongs to (line-item sections only)
    pub line_item: Option<u32>,
}

impl SectionBoundary {
    /// Create an untitled section
    pub fn new(range: LineRange, kind: SectionKind) -> Self {
        Self {
            range,
            kind,
            title: None,
            number: None,
            line_item: None,
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Human-readable label for warnings: the title, or the kind name
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(self.kind.as_str())
    }

    /// Line item index, meaningful only for line-item sections
    pub fn line_item_index(&self) -> Option<u32> {
        match self.kind {
            SectionKind::LineItem => self.line_item,
            _ => None,
        }
    }
}

/// One row of the PO line-items table found in a header section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemMetadata {
    /// PO line item number (1, 2, 3, ...)
    pub line_number: u32,

    /// Part or item number
    pub part_number: Option<String>,

    /// Item description
    pub description: Option<String>,

    /// Quantity ordered, unit included when present
    pub quantity: Option<String>,

    /// Quality or inspection level
    pub quality_level: Option<String>,

    /// Document lines describing this item, when the oracle located them
    pub range: Option<LineRange>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in SectionKind::ALL {
            assert_eq!(SectionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(SectionKind::parse("TERMS_AND_CONDITIONS"), Some(SectionKind::Terms));
        assert_eq!(SectionKind::parse("appendix"), None);
    }

    #[test]
    fn test_label_falls_back_to_kind() {
        let section = SectionBoundary::new(LineRange::new(1, 5), SectionKind::Header);
        assert_eq!(section.label(), "header");

        let titled = section.with_title("PURCHASE ORDER");
        assert_eq!(titled.label(), "PURCHASE ORDER");
    }

    #[test]
    fn test_line_item_index_only_for_line_item_kind() {
        let mut section = SectionBoundary::new(LineRange::new(1, 5), SectionKind::Terms);
        section.line_item = Some(2);
        assert_eq!(section.line_item_index(), None);

        section.kind = SectionKind::LineItem;
        assert_eq!(section.line_item_index(), Some(2));
    }

    #[test]
    fn test_carries_clauses() {
        assert!(SectionKind::Terms.carries_clauses());
        assert!(SectionKind::LineItem.carries_clauses());
        assert!(!SectionKind::Header.carries_clauses());
        assert!(!SectionKind::Attachment.carries_clauses());
    }
}
