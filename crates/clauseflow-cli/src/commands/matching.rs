//! Match command implementation.

use super::load_library;
use crate::cli::MatchArgs;
use crate::error::Result;
use crate::output::Formatter;
use clauseflow_domain::traits::ReferenceLibrary;
use clauseflow_domain::{CustomerId, DetectedCitation, LibraryEntry, LineRange, ReconciledLink};
use clauseflow_extractor::match_citation;

/// Execute the match command.
pub fn execute_match(args: MatchArgs, formatter: &Formatter) -> Result<()> {
    let library = load_library(&args.library)?;
    let customer = CustomerId::new(args.customer);
    let entries = match library.entries_for_customer(&customer) {
        Ok(entries) => entries,
        Err(never) => match never {},
    };

    let link = lookup(args.identifier, args.version, &entries);
    println!("{}", formatter.format_match(&link, &entries)?);
    Ok(())
}

/// Match a citation typed on the command line; it has no clause range.
fn lookup(identifier: String, version: Option<String>, entries: &[LibraryEntry]) -> ReconciledLink {
    let citation = DetectedCitation {
        range: LineRange::new(1, 1),
        identifier,
        version,
        context: None,
    };
    match_citation(citation, entries)
}
