//! Line indexer - makes a raw document addressable by line number
//!
//! The oracle only ever sees the numbered rendering and only ever answers
//! with line numbers. Text leaves this module exclusively through
//! [`IndexedDocument::extract`], which slices the untouched original.

use crate::range::{LineRange, LineRangeError};

/// An immutable, line-addressable document
///
/// Stores the original text once, along with the byte offset of every line
/// start, so extraction is a borrow of the original rather than a rebuild.
///
/// # Examples
///
/// ```
/// use clauseflow_domain::{IndexedDocument, LineRange};
///
/// let doc = IndexedDocument::build("PURCHASE ORDER\n\n1.1 Terms apply.");
/// assert_eq!(doc.total_lines(), 3);
/// assert_eq!(doc.rendered_line(3).unwrap(), "[3] 1.1 Terms apply.");
/// assert_eq!(doc.extract(LineRange::new(1, 2)).unwrap(), "PURCHASE ORDER\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedDocument {
    text: String,
    line_starts: Vec<usize>,
    width: usize,
}

impl IndexedDocument {
    /// Index raw text, splitting on `\n`
    ///
    /// Never fails: empty text yields a single empty line, and a trailing
    /// newline yields a trailing empty line. Carriage returns stay part of
    /// their line so extraction reproduces the input byte for byte.
    pub fn build(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(idx, _)| idx + 1));
        let width = line_starts.len().to_string().len();

        Self {
            text,
            line_starts,
            width,
        }
    }

    /// Number of lines in the document (always at least 1)
    pub fn total_lines(&self) -> usize {
        self.line_starts.len()
    }

    /// Range covering the whole document
    pub fn full_range(&self) -> LineRange {
        LineRange::new(1, self.total_lines())
    }

    /// The untouched original text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Zero-padding width used in the numbered rendering
    pub fn number_width(&self) -> usize {
        self.width
    }

    /// Original text of a single line, without its newline
    pub fn line(&self, number: usize) -> Option<&str> {
        if number == 0 || number > self.total_lines() {
            return None;
        }
        Some(&self.text[self.line_starts[number - 1]..self.line_end(number)])
    }

    /// Iterate over the original lines in order
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    /// Extract the exact original text covered by `range`
    ///
    /// The result is a slice of the original input: lines joined by the
    /// newlines that separated them, blank lines and whitespace intact.
    ///
    /// # Errors
    /// Returns [`LineRangeError::OutOfBounds`] if the range does not lie
    /// within `[1, total_lines]` or is inverted.
    pub fn extract(&self, range: LineRange) -> Result<&str, LineRangeError> {
        range.check(self.total_lines())?;
        let start = self.line_starts[range.start - 1];
        let end = self.line_end(range.end);
        Ok(&self.text[start..end])
    }

    /// Numbered rendering of one line: `[NNN] original`
    pub fn rendered_line(&self, number: usize) -> Option<String> {
        self.line(number)
            .map(|line| format!("[{:0width$}] {}", number, line, width = self.width))
    }

    /// Numbered rendering of a sub-range, keeping original line numbers
    ///
    /// # Errors
    /// Returns [`LineRangeError::OutOfBounds`] for an invalid range.
    pub fn render_range(&self, range: LineRange) -> Result<String, LineRangeError> {
        range.check(self.total_lines())?;
        let rendered: Vec<String> = (range.start..=range.end)
            .filter_map(|number| self.rendered_line(number))
            .collect();
        Ok(rendered.join("\n"))
    }

    /// Numbered rendering of the whole document
    pub fn render(&self) -> String {
        self.lines()
            .enumerate()
            .map(|(idx, line)| format!("[{:0width$}] {}", idx + 1, line, width = self.width))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Remove the `[NNN] ` prefix from a rendered line
    ///
    /// Returns `None` if the line does not carry a number prefix.
    ///
    /// # Examples
    ///
    /// ```
    /// use clauseflow_domain::IndexedDocument;
    ///
    /// assert_eq!(IndexedDocument::strip_prefix("[007]   indented"), Some("  indented"));
    /// assert_eq!(IndexedDocument::strip_prefix("no prefix"), None);
    /// ```
    pub fn strip_prefix(rendered: &str) -> Option<&str> {
        let rest = rendered.strip_prefix('[')?;
        let close = rest.find("] ")?;
        if close == 0 || !rest[..close].bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(&rest[close + 2..])
    }

    /// Byte offset just past the last character of `number` (excluding `\n`)
    fn line_end(&self, number: usize) -> usize {
        if number < self.total_lines() {
            self.line_starts[number] - 1
        } else {
            self.text.len()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: &str = "PURCHASE ORDER 4500012345\nSupplier: Acme\n\nSECTION 1: GENERAL\n1.1 Order of precedence.\n   (a) this PO\n";

    #[test]
    fn test_empty_text_is_one_empty_line() {
        let doc = IndexedDocument::build("");
        assert_eq!(doc.total_lines(), 1);
        assert_eq!(doc.extract(LineRange::new(1, 1)).unwrap(), "");
        assert_eq!(doc.render(), "[1] ");
    }

    #[test]
    fn test_trailing_newline_adds_empty_line() {
        let doc = IndexedDocument::build(SAMPLE);
        assert_eq!(doc.total_lines(), 7);
        assert_eq!(doc.line(7), Some(""));
    }

    #[test]
    fn test_extract_preserves_blank_lines_and_indent() {
        let doc = IndexedDocument::build(SAMPLE);
        assert_eq!(
            doc.extract(LineRange::new(2, 4)).unwrap(),
            "Supplier: Acme\n\nSECTION 1: GENERAL"
        );
        assert_eq!(doc.extract(LineRange::new(6, 6)).unwrap(), "   (a) this PO");
    }

    #[test]
    fn test_extract_rejects_invalid_ranges() {
        let doc = IndexedDocument::build(SAMPLE);
        assert!(doc.extract(LineRange::new(0, 2)).is_err());
        assert!(doc.extract(LineRange::new(3, 2)).is_err());
        assert!(doc.extract(LineRange::new(5, 8)).is_err());
    }

    #[test]
    fn test_carriage_returns_survive() {
        let doc = IndexedDocument::build("a\r\nb\r\nc");
        assert_eq!(doc.extract(LineRange::new(1, 2)).unwrap(), "a\r\nb\r");
    }

    #[test]
    fn test_rendering_pads_to_total_width() {
        let text = (1..=12).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        let doc = IndexedDocument::build(text);
        assert_eq!(doc.number_width(), 2);
        assert_eq!(doc.rendered_line(3).unwrap(), "[03] line 3");
        assert_eq!(
            doc.render_range(LineRange::new(11, 12)).unwrap(),
            "[11] line 11\n[12] line 12"
        );
    }

    #[test]
    fn test_render_matches_rendered_lines() {
        let doc = IndexedDocument::build(SAMPLE);
        let by_line: Vec<String> = (1..=doc.total_lines())
            .map(|n| doc.rendered_line(n).unwrap())
            .collect();
        assert_eq!(doc.render(), by_line.join("\n"));
    }

    #[test]
    fn test_strip_prefix_rejects_non_numeric() {
        assert_eq!(IndexedDocument::strip_prefix("[ab] text"), None);
        assert_eq!(IndexedDocument::strip_prefix("[] text"), None);
        assert_eq!(IndexedDocument::strip_prefix("[12] "), Some(""));
    }

    proptest! {
        #[test]
        fn prop_extract_is_literal_slice(
            lines in prop::collection::vec("[ a-zA-Z0-9.\\t\\r]{0,12}", 1..40),
            a in 0usize..40,
            b in 0usize..40,
        ) {
            let text = lines.join("\n");
            let doc = IndexedDocument::build(text.clone());
            let n = doc.total_lines();
            prop_assert_eq!(n, lines.len());

            let start = a % n + 1;
            let end = start + b % (n - start + 1);
            let range = LineRange::new(start, end);

            let expected = lines[start - 1..end].join("\n");
            let first = doc.extract(range).unwrap();
            prop_assert_eq!(first, expected.as_str());
            prop_assert_eq!(doc.extract(range).unwrap(), first);
            prop_assert!(text.contains(first));
        }

        #[test]
        fn prop_rendered_line_strips_to_original(
            lines in prop::collection::vec("[ a-zA-Z0-9\\[\\]]{0,12}", 1..30),
        ) {
            let doc = IndexedDocument::build(lines.join("\n"));
            for number in 1..=doc.total_lines() {
                let rendered = doc.rendered_line(number).unwrap();
                prop_assert_eq!(
                    IndexedDocument::strip_prefix(&rendered),
                    Some(lines[number - 1].as_str())
                );
            }
        }
    }
}
