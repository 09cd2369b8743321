//! Segmentation engine - pass 1 of the two-pass pipeline
//!
//! One oracle call partitions the document into sections; [`repair`] then
//! closes small gaps, removes overlaps and reports everything it could not
//! fix.

use crate::error::ExtractorError;
use crate::oracle::OracleAdapter;
use crate::prompt;
use crate::types::{LineItemsOutput, SegmentationOutput};
use clauseflow_domain::range::uncovered;
use clauseflow_domain::traits::CompletionOracle;
use clauseflow_domain::{IndexedDocument, LineItemMetadata, SectionBoundary, Warning};
use std::fmt::Display;
use tracing::{debug, info, warn};

/// Largest gap at either end of the document that repair will close
pub const EDGE_REPAIR_MAX_LINES: usize = 5;

/// Largest gap between adjacent sections that repair will close
pub const GAP_REPAIR_MAX_LINES: usize = 3;

/// Runs segmentation and line-item extraction against an oracle
pub struct Segmenter<O> {
    adapter: OracleAdapter<O>,
}

impl<O> Clone for Segmenter<O> {
    fn clone(&self) -> Self {
        Self {
            adapter: self.adapter.clone(),
        }
    }
}

impl<O> Segmenter<O>
where
    O: CompletionOracle + Send + Sync + 'static,
    O::Error: Display,
{
    /// Create a segmenter
    pub fn new(adapter: OracleAdapter<O>) -> Self {
        Self { adapter }
    }

    /// Partition `doc` into sections and repair the result
    ///
    /// # Errors
    /// Fails if the oracle call fails or its output does not parse.
    pub async fn segment(
        &self,
        doc: &IndexedDocument,
    ) -> Result<(Vec<SectionBoundary>, Vec<Warning>), ExtractorError> {
        info!(total_lines = doc.total_lines(), "Segmenting document");

        let output: SegmentationOutput = self.adapter.call(prompt::segmentation(doc)).await?;
        let candidates = output
            .sections
            .into_iter()
            .map(SectionBoundary::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(candidates = candidates.len(), "Oracle proposed sections");
        let (sections, warnings) = repair(candidates, doc.total_lines());
        info!(
            sections = sections.len(),
            warnings = warnings.len(),
            "Segmentation complete"
        );
        Ok((sections, warnings))
    }

    /// Read the PO line-items table from a header section
    ///
    /// Items whose line range falls outside the document keep their metadata
    /// but lose the range.
    ///
    /// # Errors
    /// Fails if the section range is invalid or the oracle call fails.
    pub async fn extract_line_items(
        &self,
        doc: &IndexedDocument,
        section: &SectionBoundary,
    ) -> Result<Vec<LineItemMetadata>, ExtractorError> {
        let rendered = doc.render_range(section.range)?;
        let output: LineItemsOutput = self
            .adapter
            .call(prompt::line_items(&rendered, section.range))
            .await?;

        let mut items = Vec::with_capacity(output.line_items.len());
        for dto in output.line_items {
            let mut item = LineItemMetadata::try_from(dto)?;
            if let Some(range) = item.range {
                if range.check(doc.total_lines()).is_err() {
                    debug!(line_number = item.line_number, %range, "Dropping invalid line item range");
                    item.range = None;
                }
            }
            items.push(item);
        }
        debug!(items = items.len(), section = section.label(), "Extracted line items");
        Ok(items)
    }
}

/// Repair a candidate section list into a partition of `[1, total_lines]`
///
/// Repairs are bounded: edge gaps up to [`EDGE_REPAIR_MAX_LINES`] and inner
/// gaps up to [`GAP_REPAIR_MAX_LINES`] are closed, overlaps are always
/// removed by shrinking the earlier section. Anything larger is reported,
/// and every line left uncovered appears in an [`Warning::Uncovered`].
///
/// # Examples
///
/// ```
/// use clauseflow_domain::{LineRange, SectionBoundary, SectionKind};
/// use clauseflow_extractor::repair;
///
/// let sections = vec![
///     SectionBoundary::new(LineRange::new(1, 10), SectionKind::Header),
///     SectionBoundary::new(LineRange::new(14, 30), SectionKind::Terms),
/// ];
/// let (repaired, warnings) = repair(sections, 30);
/// assert_eq!(repaired[0].range, LineRange::new(1, 13));
/// assert_eq!(warnings.len(), 1);
/// ```
pub fn repair(
    candidates: Vec<SectionBoundary>,
    total_lines: usize,
) -> (Vec<SectionBoundary>, Vec<Warning>) {
    let mut warnings = Vec::new();

    let mut sections = Vec::with_capacity(candidates.len());
    for section in candidates {
        if section.range.check(total_lines).is_ok() {
            sections.push(section);
        } else {
            warn!(section = section.label(), range = %section.range, "Discarding out-of-bounds section");
            warnings.push(Warning::OutOfBounds {
                label: section.label().to_string(),
                range: section.range,
                total_lines,
            });
        }
    }

    if sections.is_empty() {
        warnings.push(Warning::discrepancy("No sections found"));
        warnings.push(Warning::Uncovered {
            ranges: uncovered(&[], total_lines),
        });
        return (sections, warnings);
    }

    sections.sort_by_key(|s| s.range.start);

    let first = &mut sections[0];
    if first.range.start != 1 {
        let gap = first.range.start - 1;
        if gap <= EDGE_REPAIR_MAX_LINES {
            warnings.push(Warning::repaired(format!(
                "extended first section '{}' to start at line 1 (was {})",
                first.label(),
                first.range.start
            )));
            first.range.start = 1;
        } else {
            warnings.push(Warning::discrepancy(format!(
                "First section starts at line {}, expected line 1",
                first.range.start
            )));
        }
    }

    let mut i = 0;
    while i + 1 < sections.len() {
        let next_start = sections[i + 1].range.start;
        let current = &sections[i];

        if next_start > current.range.end + 1 {
            let gap = next_start - current.range.end - 1;
            if gap <= GAP_REPAIR_MAX_LINES {
                warnings.push(Warning::repaired(format!(
                    "extended section '{}' end_line from {} to {} to fill {}-line gap",
                    current.label(),
                    current.range.end,
                    next_start - 1,
                    gap
                )));
                sections[i].range.end = next_start - 1;
            } else {
                warnings.push(Warning::discrepancy(format!(
                    "Gap of {} lines between '{}' (ends line {}) and '{}' (starts line {})",
                    gap,
                    current.label(),
                    current.range.end,
                    sections[i + 1].label(),
                    next_start
                )));
            }
        } else if current.range.end >= next_start {
            let overlap = current.range.end - next_start + 1;
            if next_start <= current.range.start {
                warnings.push(Warning::discrepancy(format!(
                    "Section '{}' (lines {}) starts on the same line as '{}' and was dropped",
                    current.label(),
                    current.range,
                    sections[i + 1].label()
                )));
                // The successor starts where the dropped section did, so the
                // predecessor's check still holds
                sections.remove(i);
                continue;
            }
            warnings.push(Warning::repaired(format!(
                "shrunk section '{}' end_line from {} to {} to remove {}-line overlap",
                current.label(),
                current.range.end,
                next_start - 1,
                overlap
            )));
            sections[i].range.end = next_start - 1;
        }
        i += 1;
    }

    if let Some(last) = sections.last_mut() {
        if last.range.end < total_lines {
            let diff = total_lines - last.range.end;
            if diff <= EDGE_REPAIR_MAX_LINES {
                warnings.push(Warning::repaired(format!(
                    "extended last section '{}' to end at line {} (was {})",
                    last.label(),
                    total_lines,
                    last.range.end
                )));
                last.range.end = total_lines;
            } else {
                warnings.push(Warning::discrepancy(format!(
                    "Last section ends at line {}, document has {} lines",
                    last.range.end, total_lines
                )));
            }
        }
    }

    let ranges: Vec<_> = sections.iter().map(|s| s.range).collect();
    let gaps = uncovered(&ranges, total_lines);
    if !gaps.is_empty() {
        warnings.push(Warning::Uncovered { ranges: gaps });
    }

    (sections, warnings)
}
