//! Chunked extraction engine - clause boundaries for a line range

use crate::chunking::{stitch, WindowPlanner};
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::oracle::OracleAdapter;
use crate::prompt::ClausePromptBuilder;
use crate::types::ClausesOutput;
use clauseflow_domain::traits::CompletionOracle;
use clauseflow_domain::{ClauseBoundary, IndexedDocument, LineRange, SectionBoundary, Warning};
use std::fmt::Display;
use tracing::{debug, info, warn};

/// Unaccounted lines between adjacent clauses above which a gap is reported
pub const CLAUSE_GAP_WARNING_LINES: usize = 10;

/// Extracts clause boundaries, windowing ranges too large for one call
pub struct ClauseExtractor<O> {
    adapter: OracleAdapter<O>,
    planner: WindowPlanner,
}

impl<O> Clone for ClauseExtractor<O> {
    fn clone(&self) -> Self {
        Self {
            adapter: self.adapter.clone(),
            planner: self.planner,
        }
    }
}

impl<O> ClauseExtractor<O>
where
    O: CompletionOracle + Send + Sync + 'static,
    O::Error: Display,
{
    /// Create an extractor sized by `config`
    pub fn new(adapter: OracleAdapter<O>, config: &ExtractorConfig) -> Self {
        Self {
            adapter,
            planner: WindowPlanner::new(config.max_lines_per_call(), config.chunk_overlap_lines),
        }
    }

    /// Clause boundaries for `range`, biased by the owning section if given
    ///
    /// Windows are extracted one after another, each showing the oracle only
    /// its own lines with their original numbers, and then stitched. The
    /// result is not validated; see [`validate`].
    ///
    /// # Errors
    /// Fails if `range` is not inside the document or any window's call
    /// fails. A failed window fails the whole range.
    pub async fn extract_clauses(
        &self,
        doc: &IndexedDocument,
        range: LineRange,
        section: Option<&SectionBoundary>,
    ) -> Result<Vec<ClauseBoundary>, ExtractorError> {
        range.check(doc.total_lines())?;
        let windows = self.planner.plan(range);
        let label = section.map(|s| s.label()).unwrap_or("document");

        if windows.len() > 1 {
            info!(
                section = label,
                %range,
                windows = windows.len(),
                "Range exceeds one call, extracting in windows"
            );
        }

        let mut per_window = Vec::with_capacity(windows.len());
        for window in windows {
            let rendered = doc.render_range(window)?;
            let mut builder = ClausePromptBuilder::new(&rendered, window);
            if let Some(section) = section {
                builder = builder.with_section(section);
            }

            let output: ClausesOutput = self.adapter.call(builder.build()).await?;
            let boundaries = output
                .clauses
                .into_iter()
                .map(ClauseBoundary::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            debug!(section = label, %window, clauses = boundaries.len(), "Window extracted");
            per_window.push((window, boundaries));
        }

        let clauses = stitch(per_window);
        info!(section = label, clauses = clauses.len(), "Clause extraction complete");
        Ok(clauses)
    }
}

/// Drop boundaries outside the document and report overlaps and large gaps
///
/// Valid boundaries keep their input order. Overlaps and gaps of more than
/// [`CLAUSE_GAP_WARNING_LINES`] unaccounted lines are reported but left as
/// they are.
///
/// # Examples
///
/// ```
/// use clauseflow_domain::{ChunkKind, ClauseBoundary, LineRange};
/// use clauseflow_extractor::validate;
///
/// let clauses = vec![
///     ClauseBoundary::new(LineRange::new(1, 4), ChunkKind::Clause),
///     ClauseBoundary::new(LineRange::new(5, 3), ChunkKind::Clause),
/// ];
/// let (valid, warnings) = validate(clauses, 20);
/// assert_eq!(valid.len(), 1);
/// assert_eq!(warnings.len(), 1);
/// ```
pub fn validate(
    boundaries: Vec<ClauseBoundary>,
    total_lines: usize,
) -> (Vec<ClauseBoundary>, Vec<Warning>) {
    let mut warnings = Vec::new();
    let mut valid = Vec::with_capacity(boundaries.len());

    for boundary in boundaries {
        if boundary.range.check(total_lines).is_ok() {
            valid.push(boundary);
        } else {
            warn!(clause = boundary.label(), range = %boundary.range, "Discarding invalid clause range");
            warnings.push(Warning::OutOfBounds {
                label: boundary.label().to_string(),
                range: boundary.range,
                total_lines,
            });
        }
    }

    let mut sorted: Vec<&ClauseBoundary> = valid.iter().collect();
    sorted.sort_by_key(|b| b.range.start);

    for pair in sorted.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        if current.range.end >= next.range.start {
            warnings.push(Warning::discrepancy(format!(
                "Overlap: {} (lines {}) overlaps with {} (lines {})",
                current.label(),
                current.range,
                next.label(),
                next.range
            )));
        } else {
            let gap = next.range.start - current.range.end - 1;
            if gap > CLAUSE_GAP_WARNING_LINES {
                warnings.push(Warning::discrepancy(format!(
                    "Gap of {} lines between {} (ends line {}) and {} (starts line {})",
                    gap,
                    current.label(),
                    current.range.end,
                    next.label(),
                    next.range.start
                )));
            }
        }
    }

    (valid, warnings)
}
