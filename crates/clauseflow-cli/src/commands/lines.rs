//! Lines command implementation.

use super::read_document;
use crate::cli::LinesArgs;
use crate::error::{CliError, Result};
use clauseflow_domain::{IndexedDocument, LineRange};

/// Execute the lines command.
pub fn execute_lines(args: LinesArgs) -> Result<()> {
    let doc = IndexedDocument::build(read_document(&args.file)?);
    let range = match args.range.as_deref() {
        Some(raw) => parse_range(raw)?,
        None => doc.full_range(),
    };
    println!("{}", render(&doc, range, args.numbered)?);
    Ok(())
}

fn render(doc: &IndexedDocument, range: LineRange, numbered: bool) -> Result<String> {
    if numbered {
        Ok(doc.render_range(range)?)
    } else {
        Ok(doc.extract(range)?.to_string())
    }
}

/// Parse `START-END`, or a single line number.
pub(crate) fn parse_range(raw: &str) -> Result<LineRange> {
    let number = |s: &str| {
        s.trim()
            .parse::<usize>()
            .map_err(|_| CliError::InvalidInput(format!("Invalid line range '{}'", raw)))
    };
    match raw.split_once('-') {
        Some((start, end)) => Ok(LineRange::new(number(start)?, number(end)?)),
        None => {
            let line = number(raw)?;
            Ok(LineRange::new(line, line))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("3-7").unwrap(), LineRange::new(3, 7));
        assert_eq!(parse_range(" 12 ").unwrap(), LineRange::new(12, 12));
        assert!(parse_range("a-7").is_err());
        assert!(parse_range("3-").is_err());
    }

    #[test]
    fn test_render_keeps_original_text() {
        let doc = IndexedDocument::build("TERMS\n\n  1. Ship FOB origin.\n2. Net 30.");
        assert_eq!(
            render(&doc, LineRange::new(2, 3), false).unwrap(),
            "\n  1. Ship FOB origin."
        );
        assert_eq!(
            render(&doc, LineRange::new(3, 3), true).unwrap(),
            "[3]   1. Ship FOB origin."
        );
    }

    #[test]
    fn test_out_of_range_is_an_error() {
        let doc = IndexedDocument::build("one\ntwo");
        assert!(matches!(
            render(&doc, LineRange::new(2, 5), false),
            Err(CliError::Range(_))
        ));
    }
}
