//! Segment command implementation.

use super::{build_pipeline, read_document};
use crate::cli::SegmentArgs;
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::output::Formatter;
use clauseflow_domain::{IndexedDocument, SectionKind, Warning};

/// Execute the segment command.
pub async fn execute_segment(args: SegmentArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let doc = IndexedDocument::build(read_document(&args.file)?);
    let pipeline = build_pipeline(config, &args.engine)?;

    let (sections, mut warnings) = pipeline.segmenter().segment(&doc).await?;

    let mut line_items = Vec::new();
    if args.line_items {
        for section in sections.iter().filter(|s| s.kind == SectionKind::Header) {
            match pipeline.segmenter().extract_line_items(&doc, section).await {
                Ok(items) => line_items.extend(items),
                Err(e) => warnings.push(Warning::discrepancy(format!(
                    "Line item extraction failed for '{}' (lines {}): {}",
                    section.label(),
                    section.range,
                    e
                ))),
            }
        }
    }

    println!(
        "{}",
        formatter.format_sections(&doc, &sections, &line_items, &warnings)?
    );
    if formatter.format() != OutputFormat::Json && !warnings.is_empty() {
        eprintln!("{}", formatter.format_warnings(&warnings));
    }
    Ok(())
}
