//! Oracle payloads and pipeline result types

use crate::error::ExtractorError;
use clauseflow_domain::{
    ChunkKind, ClauseBoundary, ClauseScope, IndexedDocument, LineItemMetadata, LineRange,
    LineRangeError, ReconciledLink, ReferenceMetadata, RequirementBoundary, SectionBoundary,
    SectionKind, SpecBoundary, Warning,
};
use serde::Deserialize;
use std::sync::Arc;

/// Convert an oracle line number; negatives become 0 and fail bounds checks later
fn line(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}

fn range(start: i64, end: i64) -> LineRange {
    LineRange::new(line(start), line(end))
}

// --- Oracle output payloads ---

#[derive(Debug, Deserialize)]
pub(crate) struct SegmentationOutput {
    pub sections: Vec<SectionDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SectionDto {
    pub start_line: i64,
    pub end_line: i64,
    pub section_type: String,
    #[serde(default)]
    pub section_title: Option<String>,
    #[serde(default)]
    pub section_number: Option<String>,
    #[serde(default)]
    pub line_item_number: Option<i64>,
}

impl TryFrom<SectionDto> for SectionBoundary {
    type Error = ExtractorError;

    fn try_from(dto: SectionDto) -> Result<Self, Self::Error> {
        let kind = SectionKind::parse(&dto.section_type).ok_or_else(|| {
            ExtractorError::OracleOutputUnparseable(format!(
                "unknown section type '{}'",
                dto.section_type
            ))
        })?;
        Ok(SectionBoundary {
            range: range(dto.start_line, dto.end_line),
            kind,
            title: dto.section_title,
            number: dto.section_number,
            line_item: dto.line_item_number.and_then(|n| u32::try_from(n).ok()),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LineItemsOutput {
    pub line_items: Vec<LineItemDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LineItemDto {
    pub line_number: i64,
    #[serde(default)]
    pub part_number: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub quality_level: Option<String>,
    #[serde(default)]
    pub start_line: Option<i64>,
    #[serde(default)]
    pub end_line: Option<i64>,
}

impl TryFrom<LineItemDto> for LineItemMetadata {
    type Error = ExtractorError;

    fn try_from(dto: LineItemDto) -> Result<Self, Self::Error> {
        let line_number = u32::try_from(dto.line_number).map_err(|_| {
            ExtractorError::OracleOutputUnparseable(format!(
                "invalid line item number {}",
                dto.line_number
            ))
        })?;
        Ok(LineItemMetadata {
            line_number,
            part_number: dto.part_number,
            description: dto.description,
            quantity: dto.quantity,
            quality_level: dto.quality_level,
            range: match (dto.start_line, dto.end_line) {
                (Some(start), Some(end)) => Some(range(start, end)),
                _ => None,
            },
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClausesOutput {
    pub clauses: Vec<ClauseDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClauseDto {
    pub start_line: i64,
    pub end_line: i64,
    #[serde(default)]
    pub clause_number: Option<String>,
    #[serde(default)]
    pub clause_title: Option<String>,
    pub chunk_type: String,
}

impl TryFrom<ClauseDto> for ClauseBoundary {
    type Error = ExtractorError;

    fn try_from(dto: ClauseDto) -> Result<Self, Self::Error> {
        let kind = ChunkKind::parse(&dto.chunk_type).ok_or_else(|| {
            ExtractorError::OracleOutputUnparseable(format!(
                "unknown chunk type '{}'",
                dto.chunk_type
            ))
        })?;
        Ok(ClauseBoundary {
            range: range(dto.start_line, dto.end_line),
            kind,
            number: dto.clause_number,
            title: dto.clause_title,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CitationsOutput {
    pub references: Vec<CitationDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CitationDto {
    pub clause_start_line: i64,
    pub clause_end_line: i64,
    pub spec_identifier: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

impl CitationDto {
    pub fn range(&self) -> LineRange {
        range(self.clause_start_line, self.clause_end_line)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReferenceMetadataOutput {
    #[serde(default)]
    pub doc_identifier: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl ReferenceMetadataOutput {
    /// Metadata, if the oracle found an identifier
    pub fn into_metadata(self) -> Option<ReferenceMetadata> {
        let identifier = self.doc_identifier.filter(|id| !id.trim().is_empty())?;
        Some(ReferenceMetadata {
            identifier,
            version: self.version,
            title: self.title,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RequirementsOutput {
    pub requirements: Vec<RequirementDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RequirementDto {
    #[serde(default)]
    pub requirement_number: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub start_line: i64,
    pub end_line: i64,
}

impl From<RequirementDto> for RequirementBoundary {
    fn from(dto: RequirementDto) -> Self {
        RequirementBoundary {
            range: range(dto.start_line, dto.end_line),
            number: dto.requirement_number,
            title: dto.title,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SpecBookOutput {
    pub is_multi_spec: bool,
    #[serde(default)]
    pub specs: Vec<SpecDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SpecDto {
    pub doc_identifier: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub start_line: i64,
    pub end_line: i64,
}

impl From<SpecDto> for SpecBoundary {
    fn from(dto: SpecDto) -> Self {
        SpecBoundary {
            range: range(dto.start_line, dto.end_line),
            identifier: dto.doc_identifier,
            version: dto.version,
            title: dto.title,
        }
    }
}

// --- Pipeline results ---

/// A validated clause together with the scope its section implies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedClause {
    /// The clause boundary
    pub boundary: ClauseBoundary,

    /// PO-wide, line-specific or unscoped
    pub scope: ClauseScope,

    /// Index into [`DocumentIndex::sections`] of the owning section
    pub section: Option<usize>,
}

/// Outcome of the reconciliation stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationStatus {
    /// No customer library was supplied
    Skipped,

    /// Citations were detected and matched
    Completed,

    /// Detection or library lookup failed; clauses are unaffected
    Failed(String),
}

/// How the clause pass was run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    /// Segmentation, then clause extraction per terms and line-item section
    Sectioned,

    /// Clause extraction over the whole document without segmentation
    SinglePass,
}

/// Metadata about an indexing run
#[derive(Debug, Clone)]
pub struct IndexMetadata {
    /// Model label from the configuration
    pub model_name: String,

    /// Mode the clause pass ran in
    pub mode: IndexMode,

    /// Lines in the indexed document
    pub total_lines: usize,

    /// Wall-clock duration of the run
    pub processing_time_ms: u64,
}

/// The structural index of one document
#[derive(Debug, Clone)]
pub struct DocumentIndex {
    /// The indexed original
    pub document: Arc<IndexedDocument>,

    /// Repaired section partition (empty in single-pass mode)
    pub sections: Vec<SectionBoundary>,

    /// Line items found in header sections
    pub line_items: Vec<LineItemMetadata>,

    /// Validated clauses in section order
    pub clauses: Vec<ScopedClause>,

    /// Citations resolved against the customer library
    pub links: Vec<ReconciledLink>,

    /// Outcome of the reconciliation stage
    pub reconciliation: ReconciliationStatus,

    /// Every non-fatal finding, in the order it was produced
    pub warnings: Vec<Warning>,

    /// Metadata about the run
    pub metadata: IndexMetadata,
}

impl DocumentIndex {
    /// Original text of a clause
    pub fn clause_text(&self, clause: &ScopedClause) -> Result<&str, LineRangeError> {
        self.document.extract(clause.boundary.range)
    }

    /// Original text of a section
    pub fn section_text(&self, section: &SectionBoundary) -> Result<&str, LineRangeError> {
        self.document.extract(section.range)
    }

    /// Clauses belonging to the section at `index`
    pub fn clauses_in_section(&self, index: usize) -> impl Iterator<Item = &ScopedClause> {
        self.clauses
            .iter()
            .filter(move |clause| clause.section == Some(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_dto_conversion() {
        let dto: SectionDto = serde_json::from_str(
            r#"{"start_line": 12, "end_line": 40, "section_type": "terms_and_conditions",
                "section_title": "SECTION 1: GENERAL", "section_number": "1", "line_item_number": null}"#,
        )
        .unwrap();
        let section = SectionBoundary::try_from(dto).unwrap();
        assert_eq!(section.range, LineRange::new(12, 40));
        assert_eq!(section.kind, SectionKind::Terms);
        assert_eq!(section.number.as_deref(), Some("1"));
    }

    #[test]
    fn test_unknown_kinds_are_unparseable() {
        let dto: SectionDto =
            serde_json::from_str(r#"{"start_line": 1, "end_line": 2, "section_type": "preface"}"#)
                .unwrap();
        assert!(matches!(
            SectionBoundary::try_from(dto),
            Err(ExtractorError::OracleOutputUnparseable(_))
        ));

        let dto: ClauseDto =
            serde_json::from_str(r#"{"start_line": 1, "end_line": 2, "chunk_type": "prose"}"#)
                .unwrap();
        assert!(ClauseBoundary::try_from(dto).is_err());
    }

    #[test]
    fn test_negative_lines_become_zero() {
        let dto: ClauseDto = serde_json::from_str(
            r#"{"start_line": -3, "end_line": 4, "chunk_type": "clause"}"#,
        )
        .unwrap();
        let clause = ClauseBoundary::try_from(dto).unwrap();
        assert_eq!(clause.range, LineRange::new(0, 4));
        assert!(clause.range.check(10).is_err());
    }

    #[test]
    fn test_line_item_partial_range_is_dropped() {
        let dto: LineItemDto =
            serde_json::from_str(r#"{"line_number": 2, "start_line": 14, "end_line": null}"#)
                .unwrap();
        let item = LineItemMetadata::try_from(dto).unwrap();
        assert_eq!(item.line_number, 2);
        assert_eq!(item.range, None);
    }

    #[test]
    fn test_metadata_requires_identifier() {
        let out: ReferenceMetadataOutput =
            serde_json::from_str(r#"{"doc_identifier": " ", "version": "Rev A", "title": null}"#)
                .unwrap();
        assert!(out.into_metadata().is_none());
    }
}
