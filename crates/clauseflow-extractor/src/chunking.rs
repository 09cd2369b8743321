//! Window planning and stitching for ranges too large for one oracle call

use clauseflow_domain::{ClauseBoundary, LineRange};
use tracing::debug;

/// Splits a line range into overlapping windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlanner {
    window_lines: usize,
    overlap_lines: usize,
}

impl WindowPlanner {
    /// Create a planner; the overlap is clamped below the window size
    pub fn new(window_lines: usize, overlap_lines: usize) -> Self {
        let window_lines = window_lines.max(1);
        Self {
            window_lines,
            overlap_lines: overlap_lines.min(window_lines - 1),
        }
    }

    /// Plan the windows covering `range`
    ///
    /// A range that fits in one window is returned unchanged. Otherwise each
    /// window after the first starts `overlap` lines before the previous
    /// window's end, and the last window ends exactly at `range.end`.
    ///
    /// # Examples
    ///
    /// ```
    /// use clauseflow_domain::LineRange;
    /// use clauseflow_extractor::WindowPlanner;
    ///
    /// let windows = WindowPlanner::new(40, 10).plan(LineRange::new(1, 100));
    /// assert_eq!(
    ///     windows,
    ///     vec![LineRange::new(1, 40), LineRange::new(31, 70), LineRange::new(61, 100)]
    /// );
    /// ```
    pub fn plan(&self, range: LineRange) -> Vec<LineRange> {
        if range.len() <= self.window_lines {
            return vec![range];
        }

        let mut windows = Vec::new();
        let mut start = range.start;
        loop {
            let end = (start + self.window_lines - 1).min(range.end);
            windows.push(LineRange::new(start, end));
            if end >= range.end {
                break;
            }
            start = end - self.overlap_lines + 1;
        }
        windows
    }
}

/// Merge per-window boundary lists into one ordered list
///
/// For every window after the first, with the previous window ending at
/// line `E`:
/// - boundaries ending at or before `E` were already seen and are dropped
/// - boundaries starting after `E` are new and kept
/// - a boundary starting at or before `E` and ending after it continues a
///   retained boundary cut at `E`; that boundary keeps its start and
///   metadata and takes the later end. With no such boundary it is kept.
///
/// Only boundaries lying inside the window that reported them take part in
/// these rules. Anything else (inverted, out of the document, or outside its
/// window) is passed through unmerged so that [`validate`](crate::validate)
/// reports it; it never alters a boundary from an earlier window.
///
/// The result is sorted by start line. It is a heuristic: it reproduces an
/// unwindowed extraction when each window reports clauses cut at its edges.
pub fn stitch(windows: Vec<(LineRange, Vec<ClauseBoundary>)>) -> Vec<ClauseBoundary> {
    let mut retained: Vec<ClauseBoundary> = Vec::new();
    let mut previous_end: Option<usize> = None;

    for (window, boundaries) in windows {
        match previous_end {
            None => retained.extend(boundaries),
            Some(edge) => {
                for boundary in boundaries {
                    if !within(window, boundary.range) {
                        debug!(%window, range = %boundary.range, "Passing through boundary outside its window");
                        retained.push(boundary);
                        continue;
                    }
                    if boundary.range.end <= edge {
                        continue;
                    }
                    if boundary.range.start > edge {
                        retained.push(boundary);
                        continue;
                    }

                    let cut = retained
                        .iter_mut()
                        .filter(|r| r.range.end == edge && r.range.start <= boundary.range.start)
                        .max_by_key(|r| r.range.start);
                    match cut {
                        Some(cut) => {
                            debug!(
                                clause = cut.label(),
                                from = edge,
                                to = boundary.range.end,
                                "Extending clause cut at window edge"
                            );
                            cut.range.end = boundary.range.end;
                        }
                        None => retained.push(boundary),
                    }
                }
            }
        }
        previous_end = Some(window.end);
    }

    retained.sort_by_key(|b| b.range.start);
    retained
}

fn within(window: LineRange, range: LineRange) -> bool {
    range.start <= range.end && window.contains(range.start) && window.contains(range.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate;
    use clauseflow_domain::{ChunkKind, Warning};

    fn clause(start: usize, end: usize, number: &str) -> ClauseBoundary {
        ClauseBoundary::new(LineRange::new(start, end), ChunkKind::Clause).with_number(number)
    }

    #[test]
    fn test_small_range_is_one_window() {
        let planner = WindowPlanner::new(50, 10);
        assert_eq!(
            planner.plan(LineRange::new(20, 69)),
            vec![LineRange::new(20, 69)]
        );
    }

    #[test]
    fn test_windows_cover_range_with_overlap() {
        let windows = WindowPlanner::new(40, 10).plan(LineRange::new(11, 120));
        assert_eq!(windows.first().map(|w| w.start), Some(11));
        assert_eq!(windows.last().map(|w| w.end), Some(120));
        for pair in windows.windows(2) {
            assert_eq!(pair[1].start, pair[0].end - 10 + 1);
            assert!(pair[0].len() == 40);
        }
    }

    #[test]
    fn test_overlap_is_clamped() {
        let windows = WindowPlanner::new(5, 9).plan(LineRange::new(1, 12));
        assert_eq!(windows.last().map(|w| w.end), Some(12));
        for pair in windows.windows(2) {
            assert!(pair[1].start > pair[0].start);
        }
    }

    #[test]
    fn test_stitch_drops_overlap_duplicates() {
        let stitched = stitch(vec![
            (LineRange::new(1, 40), vec![clause(1, 20, "1.1"), clause(21, 40, "1.2")]),
            (LineRange::new(31, 70), vec![clause(31, 40, "1.2"), clause(41, 70, "1.3")]),
        ]);
        assert_eq!(
            stitched,
            vec![clause(1, 20, "1.1"), clause(21, 40, "1.2"), clause(41, 70, "1.3")]
        );
    }

    #[test]
    fn test_stitch_extends_clause_cut_at_edge() {
        let stitched = stitch(vec![
            (LineRange::new(1, 40), vec![clause(1, 30, "1.1"), clause(31, 40, "1.2")]),
            (LineRange::new(31, 70), vec![clause(31, 45, "(1.2)"), clause(46, 70, "1.3")]),
        ]);
        assert_eq!(
            stitched,
            vec![clause(1, 30, "1.1"), clause(31, 45, "1.2"), clause(46, 70, "1.3")]
        );
    }

    #[test]
    fn test_stitch_keeps_straddler_without_cut_clause() {
        let stitched = stitch(vec![
            (LineRange::new(1, 40), vec![clause(1, 38, "1.1")]),
            (LineRange::new(31, 70), vec![clause(35, 50, "1.2")]),
        ]);
        assert_eq!(stitched, vec![clause(1, 38, "1.1"), clause(35, 50, "1.2")]);
    }

    #[test]
    fn test_stitch_keeps_cut_clause_when_continuation_overruns_document() {
        let stitched = stitch(vec![
            (LineRange::new(1, 40), vec![clause(1, 30, "1.1"), clause(31, 40, "1.2")]),
            (LineRange::new(31, 70), vec![clause(35, 999, "1.2"), clause(41, 70, "1.3")]),
        ]);
        assert!(stitched.contains(&clause(31, 40, "1.2")));

        let (valid, warnings) = validate(stitched, 70);
        assert_eq!(
            valid,
            vec![clause(1, 30, "1.1"), clause(31, 40, "1.2"), clause(41, 70, "1.3")]
        );
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            Warning::OutOfBounds { range, .. } if *range == LineRange::new(35, 999)
        ));
    }

    #[test]
    fn test_stitch_surfaces_invalid_boundaries_from_later_windows() {
        let stitched = stitch(vec![
            (LineRange::new(1, 40), vec![clause(1, 40, "1.1")]),
            (
                LineRange::new(31, 70),
                vec![clause(0, 0, "bogus"), clause(38, 33, "inverted"), clause(41, 70, "1.2")],
            ),
        ]);

        let (valid, warnings) = validate(stitched, 70);
        assert_eq!(valid, vec![clause(1, 40, "1.1"), clause(41, 70, "1.2")]);
        let out_of_bounds: Vec<LineRange> = warnings
            .iter()
            .filter_map(|w| match w {
                Warning::OutOfBounds { range, .. } => Some(*range),
                _ => None,
            })
            .collect();
        assert_eq!(out_of_bounds, vec![LineRange::new(0, 0), LineRange::new(38, 33)]);
    }
}
