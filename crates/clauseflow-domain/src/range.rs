//! Line range module - the addressing primitive for non-destructive extraction

use std::fmt;

/// A closed interval of 1-indexed line numbers: `[start, end]`
///
/// A range is only a reference to document content, never a copy of it.
/// Ranges arrive from an untrusted oracle, so a `LineRange` may hold values
/// that fall outside a document; use [`LineRange::check`] before trusting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineRange {
    /// First line (1-indexed, inclusive)
    pub start: usize,

    /// Last line (1-indexed, inclusive)
    pub end: usize,
}

impl LineRange {
    /// Create a new range without validating it
    ///
    /// # Examples
    ///
    /// ```
    /// use clauseflow_domain::LineRange;
    ///
    /// let range = LineRange::new(3, 7);
    /// assert_eq!(range.len(), 5);
    /// ```
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of lines covered (0 for an inverted range)
    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    /// Whether the range covers no lines
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `line` falls inside the range
    pub fn contains(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }

    /// Whether the two ranges share at least one line
    pub fn overlaps(&self, other: &LineRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Lines shared by both ranges, if any
    pub fn intersect(&self, other: &LineRange) -> Option<LineRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then(|| LineRange::new(start, end))
    }

    /// Check the range against a document of `total_lines` lines
    ///
    /// # Errors
    /// Returns [`LineRangeError::OutOfBounds`] if `start < 1`,
    /// `end > total_lines` or `start > end`.
    ///
    /// # Examples
    ///
    /// ```
    /// use clauseflow_domain::LineRange;
    ///
    /// assert!(LineRange::new(1, 10).check(10).is_ok());
    /// assert!(LineRange::new(0, 3).check(10).is_err());
    /// assert!(LineRange::new(5, 3).check(10).is_err());
    /// assert!(LineRange::new(8, 11).check(10).is_err());
    /// ```
    pub fn check(&self, total_lines: usize) -> Result<(), LineRangeError> {
        if self.start < 1 || self.end > total_lines || self.start > self.end {
            return Err(LineRangeError::OutOfBounds {
                start: self.start,
                end: self.end,
                total_lines,
            });
        }
        Ok(())
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Errors raised when a range does not address a valid region of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRangeError {
    /// The range violates `1 <= start <= end <= total_lines`
    OutOfBounds {
        /// Requested first line
        start: usize,
        /// Requested last line
        end: usize,
        /// Lines in the document
        total_lines: usize,
    },
}

impl fmt::Display for LineRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineRangeError::OutOfBounds {
                start,
                end,
                total_lines,
            } => write!(
                f,
                "Invalid line range: {}-{} (document has {} lines)",
                start, end, total_lines
            ),
        }
    }
}

impl std::error::Error for LineRangeError {}

/// Lines of `[1, total_lines]` not covered by any of `ranges`, as maximal runs
///
/// Ranges may be unsorted, overlapping or partly out of bounds; only the
/// in-bounds part of each contributes to coverage.
///
/// # Examples
///
/// ```
/// use clauseflow_domain::range::uncovered;
/// use clauseflow_domain::LineRange;
///
/// let gaps = uncovered(&[LineRange::new(1, 3), LineRange::new(6, 8)], 10);
/// assert_eq!(gaps, vec![LineRange::new(4, 5), LineRange::new(9, 10)]);
/// ```
pub fn uncovered(ranges: &[LineRange], total_lines: usize) -> Vec<LineRange> {
    let document = LineRange::new(1, total_lines);
    let mut clipped: Vec<LineRange> = ranges
        .iter()
        .filter_map(|r| r.intersect(&document))
        .collect();
    clipped.sort();

    let mut gaps = Vec::new();
    let mut next_uncovered = 1;
    for range in clipped {
        if range.start > next_uncovered {
            gaps.push(LineRange::new(next_uncovered, range.start - 1));
        }
        next_uncovered = next_uncovered.max(range.end + 1);
    }
    if next_uncovered <= total_lines {
        gaps.push(LineRange::new(next_uncovered, total_lines));
    }
    gaps
}
