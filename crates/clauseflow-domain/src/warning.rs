//! Warning module - non-fatal findings attached to every result

use std::fmt;

use crate::range::LineRange;

/// A non-fatal finding produced while indexing a document
///
/// Every anomaly the engines notice is reported as a warning; nothing is
/// dropped without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A boundary was adjusted to close a small gap or remove an overlap
    Repaired {
        /// What was changed
        detail: String,
    },

    /// Something was suspicious but left as the oracle reported it
    Discrepancy {
        /// What was observed
        detail: String,
    },

    /// Lines of the document that no section covers
    Uncovered {
        /// Maximal runs of uncovered lines
        ranges: Vec<LineRange>,
    },

    /// A boundary pointed outside the document and was discarded
    OutOfBounds {
        /// Section title or clause number of the discarded boundary
        label: String,
        /// The offending range
        range: LineRange,
        /// Lines in the document
        total_lines: usize,
    },
}

impl Warning {
    /// Create a repair warning
    pub fn repaired(detail: impl Into<String>) -> Self {
        Warning::Repaired {
            detail: detail.into(),
        }
    }

    /// Create a discrepancy warning
    pub fn discrepancy(detail: impl Into<String>) -> Self {
        Warning::Discrepancy {
            detail: detail.into(),
        }
    }

    /// Short kind name for output
    pub fn kind(&self) -> &'static str {
        match self {
            Warning::Repaired { .. } => "repaired",
            Warning::Discrepancy { .. } => "discrepancy",
            Warning::Uncovered { .. } => "uncovered",
            Warning::OutOfBounds { .. } => "out_of_bounds",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Repaired { detail } => write!(f, "Repaired: {}", detail),
            Warning::Discrepancy { detail } => write!(f, "{}", detail),
            Warning::Uncovered { ranges } => {
                let runs: Vec<String> = ranges.iter().map(|r| r.to_string()).collect();
                write!(f, "Lines not covered by any section: {}", runs.join(", "))
            }
            Warning::OutOfBounds {
                label,
                range,
                total_lines,
            } => write!(
                f,
                "'{}' has invalid range {} (document has {} lines); discarded",
                label, range, total_lines
            ),
        }
    }
}
