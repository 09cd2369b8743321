//! Reference reconciliation engine
//!
//! Finds citations of external specifications inside extracted clauses and
//! resolves each against a customer's reference library. Matching is purely
//! textual over normalized identifiers and versions.

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::oracle::OracleAdapter;
use crate::prompt::{self, truncate_chars, TRUNCATION_MARKER};
use crate::types::CitationsOutput;
use clauseflow_domain::traits::{CompletionOracle, ReferenceLibrary};
use clauseflow_domain::{
    ClauseBoundary, CustomerId, DetectedCitation, IndexedDocument, LibraryEntry, MatchOutcome,
    ReconciledLink, Warning,
};
use std::fmt::Display;
use tracing::{debug, info, warn};

/// Canonical form of a spec identifier
///
/// Uppercased, trimmed, with spaces, hyphens and underscores removed.
///
/// # Examples
///
/// ```
/// use clauseflow_extractor::normalize_identifier;
///
/// assert_eq!(normalize_identifier("SPXQC-17"), normalize_identifier("spx qc_17"));
/// ```
pub fn normalize_identifier(identifier: &str) -> String {
    identifier
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .collect()
}

/// Canonical form of a version: lowercased, all whitespace removed
pub fn normalize_version(version: &str) -> String {
    version
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Resolve one citation against a customer's entries
///
/// A citation without a version matches the first entry sharing its
/// identifier. A versioned citation matches the first entry whose version
/// agrees, and is partial against the first sharing entry otherwise.
pub fn match_citation(citation: DetectedCitation, entries: &[LibraryEntry]) -> ReconciledLink {
    let identifier = normalize_identifier(&citation.identifier);
    if identifier.is_empty() {
        return ReconciledLink {
            citation,
            outcome: MatchOutcome::Unresolved,
        };
    }

    let sharing: Vec<&LibraryEntry> = entries
        .iter()
        .filter(|entry| normalize_identifier(&entry.identifier) == identifier)
        .collect();

    let outcome = match (sharing.first(), &citation.version) {
        (None, _) => MatchOutcome::Unresolved,
        (Some(first), None) => MatchOutcome::Matched(first.id),
        (Some(first), Some(version)) => {
            let wanted = normalize_version(version);
            sharing
                .iter()
                .find(|entry| {
                    entry
                        .version
                        .as_deref()
                        .map_or(false, |v| normalize_version(v) == wanted)
                })
                .map(|entry| MatchOutcome::Matched(entry.id))
                .unwrap_or(MatchOutcome::Partial(first.id))
        }
    };

    ReconciledLink { citation, outcome }
}

/// Concatenate clause texts as `[Lines a-b] number title` blocks, cut to budget
///
/// Returns the text and whether it was truncated.
pub(crate) fn clause_blocks(
    doc: &IndexedDocument,
    clauses: &[ClauseBoundary],
    budget_chars: usize,
) -> Result<(String, bool), ExtractorError> {
    let mut text = String::new();
    for clause in clauses {
        let mut heading = format!("[Lines {}-{}]", clause.range.start, clause.range.end);
        for part in [&clause.number, &clause.title].into_iter().flatten() {
            heading.push(' ');
            heading.push_str(part);
        }
        text.push_str(&heading);
        text.push('\n');
        text.push_str(doc.extract(clause.range)?);
        text.push_str("\n\n");
    }

    let (kept, truncated) = truncate_chars(&text, budget_chars);
    if truncated {
        Ok((format!("{}{}", kept, TRUNCATION_MARKER), true))
    } else {
        Ok((text, false))
    }
}

/// Detects citations and reconciles them against a reference library
pub struct Reconciler<O> {
    adapter: OracleAdapter<O>,
    budget_chars: usize,
}

impl<O> Clone for Reconciler<O> {
    fn clone(&self) -> Self {
        Self {
            adapter: self.adapter.clone(),
            budget_chars: self.budget_chars,
        }
    }
}

impl<O> Reconciler<O>
where
    O: CompletionOracle + Send + Sync + 'static,
    O::Error: Display,
{
    /// Create a reconciler using the citation budget from `config`
    pub fn new(adapter: OracleAdapter<O>, config: &ExtractorConfig) -> Self {
        Self {
            adapter,
            budget_chars: config.citation_text_budget_chars,
        }
    }

    /// Find citations of external specs in `clauses`
    ///
    /// Each detected range is resolved to an extracted clause, first by
    /// exact range and then by start line. Citations pointing at no clause
    /// are dropped with a discrepancy warning.
    ///
    /// # Errors
    /// Fails if a clause range is invalid or the oracle call fails.
    pub async fn detect(
        &self,
        doc: &IndexedDocument,
        clauses: &[ClauseBoundary],
    ) -> Result<(Vec<DetectedCitation>, Vec<Warning>), ExtractorError> {
        if clauses.is_empty() {
            debug!("No clauses, skipping citation detection");
            return Ok((Vec::new(), Vec::new()));
        }

        let (text, truncated) = clause_blocks(doc, clauses, self.budget_chars)?;
        if truncated {
            warn!(budget = self.budget_chars, "Clause text truncated for citation detection");
        }

        let output: CitationsOutput = self.adapter.call(prompt::citations(&text)).await?;
        let mut citations = Vec::with_capacity(output.references.len());
        let mut warnings = Vec::new();

        for dto in output.references {
            let reported = dto.range();
            let clause = clauses
                .iter()
                .find(|c| c.range == reported)
                .or_else(|| clauses.iter().find(|c| c.range.start == reported.start));

            match clause {
                Some(clause) => citations.push(DetectedCitation {
                    range: clause.range,
                    identifier: dto.spec_identifier,
                    version: dto.version,
                    context: dto.context,
                }),
                None => warnings.push(Warning::discrepancy(format!(
                    "Citation of {} at lines {} matches no extracted clause; dropped",
                    dto.spec_identifier, reported
                ))),
            }
        }

        info!(citations = citations.len(), dropped = warnings.len(), "Citation detection complete");
        Ok((citations, warnings))
    }

    /// Detect citations and match them against `customer`'s library entries
    ///
    /// The library is read once per call.
    ///
    /// # Errors
    /// Fails if detection fails or the library cannot be read.
    pub async fn reconcile<L>(
        &self,
        doc: &IndexedDocument,
        clauses: &[ClauseBoundary],
        customer: &CustomerId,
        library: &L,
    ) -> Result<(Vec<ReconciledLink>, Vec<Warning>), ExtractorError>
    where
        L: ReferenceLibrary + ?Sized,
        L::Error: Display,
    {
        let entries = library
            .entries_for_customer(customer)
            .map_err(|e| ExtractorError::Library(e.to_string()))?;
        debug!(customer = %customer, entries = entries.len(), "Loaded reference library");

        let (citations, warnings) = self.detect(doc, clauses).await?;
        let links: Vec<ReconciledLink> = citations
            .into_iter()
            .map(|citation| match_citation(citation, &entries))
            .collect();

        let matched = links
            .iter()
            .filter(|l| matches!(l.outcome, MatchOutcome::Matched(_)))
            .count();
        info!(links = links.len(), matched, "Reconciliation complete");
        Ok((links, warnings))
    }
}
