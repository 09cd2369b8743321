//! Reference-document processing
//!
//! Turns a customer's specification document into library entries: detect
//! whether the file bundles several specs, read each spec's identity, and
//! mark out its numbered requirements.

use crate::clauses::validate;
use crate::error::ExtractorError;
use crate::oracle::OracleAdapter;
use crate::prompt;
use crate::types::{ReferenceMetadataOutput, RequirementsOutput, SpecBookOutput};
use clauseflow_domain::traits::CompletionOracle;
use clauseflow_domain::{
    ChunkKind, ClauseBoundary, CustomerId, IndexedDocument, LibraryEntry, LineRange,
    ReferenceMetadata, RequirementBoundary, SpecBoundary, Warning,
};
use std::fmt::Display;
use tracing::{debug, info, warn};

/// Outcome of spec-book detection
#[derive(Debug, Clone, Default)]
pub struct SpecBookSplit {
    /// Bundled specs with valid ranges, in document order
    pub specs: Vec<SpecBoundary>,

    /// Specs dropped for invalid ranges
    pub warnings: Vec<Warning>,
}

impl SpecBookSplit {
    /// Whether the document holds more than one spec
    pub fn is_multi_spec(&self) -> bool {
        self.specs.len() > 1
    }
}

/// One spec ready to enter a library
#[derive(Debug, Clone)]
pub struct ProcessedSpec {
    /// Lines of the parent document covered by this spec
    pub range: LineRange,

    /// Library entry describing the spec
    pub entry: LibraryEntry,

    /// Requirements, numbered against the parent document
    pub requirements: Vec<RequirementBoundary>,
}

/// Runs the reference-document oracle calls
pub struct ReferenceProcessor<O> {
    adapter: OracleAdapter<O>,
}

impl<O> Clone for ReferenceProcessor<O> {
    fn clone(&self) -> Self {
        Self {
            adapter: self.adapter.clone(),
        }
    }
}

impl<O> ReferenceProcessor<O>
where
    O: CompletionOracle + Send + Sync + 'static,
    O::Error: Display,
{
    /// Create a processor
    pub fn new(adapter: OracleAdapter<O>) -> Self {
        Self { adapter }
    }

    /// Check whether `doc` bundles several specs, looking at its start
    pub async fn detect_spec_book(&self, doc: &IndexedDocument) -> Result<SpecBookSplit, ExtractorError> {
        let output: SpecBookOutput = self.adapter.call(prompt::spec_book(doc)).await?;
        if !output.is_multi_spec {
            return Ok(SpecBookSplit::default());
        }

        let mut split = SpecBookSplit::default();
        for spec in output.specs.into_iter().map(SpecBoundary::from) {
            if spec.range.check(doc.total_lines()).is_ok() {
                split.specs.push(spec);
            } else {
                warn!(spec = %spec.identifier, range = %spec.range, "Discarding invalid spec range");
                split.warnings.push(Warning::OutOfBounds {
                    label: spec.identifier.clone(),
                    range: spec.range,
                    total_lines: doc.total_lines(),
                });
            }
        }
        split.specs.sort_by_key(|s| s.range.start);
        debug!(specs = split.specs.len(), "Spec book detection complete");
        Ok(split)
    }

    /// Identifier, version and title from the first page, if any identifier is found
    pub async fn describe(&self, doc: &IndexedDocument) -> Result<Option<ReferenceMetadata>, ExtractorError> {
        let output: ReferenceMetadataOutput =
            self.adapter.call(prompt::reference_metadata(doc)).await?;
        Ok(output.into_metadata())
    }

    /// Requirement boundaries, validated against the document
    pub async fn extract_requirements(
        &self,
        doc: &IndexedDocument,
    ) -> Result<(Vec<RequirementBoundary>, Vec<Warning>), ExtractorError> {
        let output: RequirementsOutput = self.adapter.call(prompt::requirements(doc)).await?;

        let as_clauses = output
            .requirements
            .into_iter()
            .map(RequirementBoundary::from)
            .map(|r| ClauseBoundary {
                range: r.range,
                kind: ChunkKind::Clause,
                number: r.number,
                title: r.title,
            })
            .collect();
        let (valid, warnings) = validate(as_clauses, doc.total_lines());

        let requirements = valid
            .into_iter()
            .map(|c| RequirementBoundary {
                range: c.range,
                number: c.number,
                title: c.title,
            })
            .collect();
        Ok((requirements, warnings))
    }

    /// Turn `doc` into library entries for `customer`
    ///
    /// A spec book yields one entry per bundled spec, each processed as its
    /// own document. A spec whose identifier cannot be read takes
    /// `fallback_identifier`.
    ///
    /// # Errors
    /// Fails if any oracle call fails.
    pub async fn process(
        &self,
        doc: &IndexedDocument,
        customer: &CustomerId,
        fallback_identifier: &str,
    ) -> Result<(Vec<ProcessedSpec>, Vec<Warning>), ExtractorError> {
        let mut split = self.detect_spec_book(doc).await?;
        let mut warnings = std::mem::take(&mut split.warnings);

        if !split.is_multi_spec() {
            info!("Processing single reference spec");
            let (spec, spec_warnings) = self
                .process_single(doc, doc.full_range(), None, customer, fallback_identifier)
                .await?;
            warnings.extend(spec_warnings);
            return Ok((vec![spec], warnings));
        }

        info!(specs = split.specs.len(), "Processing spec book");
        let mut specs = Vec::with_capacity(split.specs.len());
        for boundary in &split.specs {
            let child = IndexedDocument::build(doc.extract(boundary.range)?);
            let (spec, spec_warnings) = self
                .process_single(&child, boundary.range, Some(boundary.metadata()), customer, fallback_identifier)
                .await?;
            warnings.extend(spec_warnings);
            specs.push(spec);
        }
        Ok((specs, warnings))
    }

    async fn process_single(
        &self,
        doc: &IndexedDocument,
        range: LineRange,
        known: Option<ReferenceMetadata>,
        customer: &CustomerId,
        fallback_identifier: &str,
    ) -> Result<(ProcessedSpec, Vec<Warning>), ExtractorError> {
        let metadata = match known {
            Some(known) if known.title.is_some() => Some(known),
            Some(known) => {
                let read = self.describe(doc).await?;
                Some(ReferenceMetadata {
                    version: known.version.or_else(|| read.as_ref().and_then(|m| m.version.clone())),
                    title: read.and_then(|m| m.title),
                    identifier: known.identifier,
                })
            }
            None => self.describe(doc).await?,
        };

        let mut entry = match &metadata {
            Some(m) => LibraryEntry::new(customer.clone(), m.identifier.clone()),
            None => {
                warn!(fallback = fallback_identifier, "No identifier found, using fallback");
                LibraryEntry::new(customer.clone(), fallback_identifier)
            }
        };
        if let Some(m) = metadata {
            entry.version = m.version;
            entry.title = m.title;
        }

        let (mut requirements, warnings) = self.extract_requirements(doc).await?;
        let offset = range.start - 1;
        for requirement in &mut requirements {
            requirement.range = LineRange::new(
                requirement.range.start + offset,
                requirement.range.end + offset,
            );
        }

        debug!(
            identifier = %entry.identifier,
            requirements = requirements.len(),
            "Reference spec processed"
        );
        Ok((
            ProcessedSpec {
                range,
                entry,
                requirements,
            },
            warnings,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use crate::schema;
    use clauseflow_llm::MockOracle;
    use std::sync::Arc;

    fn processor(oracle: &MockOracle) -> ReferenceProcessor<MockOracle> {
        ReferenceProcessor::new(OracleAdapter::new(
            Arc::new(oracle.clone()),
            &ExtractorConfig::default(),
        ))
    }

    fn book() -> IndexedDocument {
        IndexedDocument::build(
            "SPXQC-17 SOURCE INSPECTION\n1. Scope\nInspect at source.\n\
             SPXQC-40 FIRST ARTICLE\n1. Scope\nFAI per AS9102.",
        )
    }

    #[tokio::test]
    async fn test_single_spec_uses_metadata() {
        let oracle = MockOracle::default();
        oracle.add_response(schema::SPEC_BOOK, r#"{"is_multi_spec": false, "specs": []}"#);
        oracle.add_response(
            schema::REFERENCE_METADATA,
            r#"{"doc_identifier": "AS9100", "version": "Rev D", "title": "Quality Management Systems"}"#,
        );
        oracle.add_response(
            schema::REQUIREMENTS,
            r#"{"requirements": [
                {"requirement_number": "1", "title": "Scope", "start_line": 2, "end_line": 3},
                {"requirement_number": "9", "title": null, "start_line": 5, "end_line": 40}]}"#,
        );

        let (specs, warnings) = processor(&oracle)
            .process(&book(), &CustomerId::new("acme"), "as9100.txt")
            .await
            .unwrap();

        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].entry.identifier, "AS9100");
        assert_eq!(specs[0].entry.version.as_deref(), Some("Rev D"));
        assert_eq!(specs[0].requirements.len(), 1);
        assert!(matches!(warnings[0], Warning::OutOfBounds { .. }));
    }

    #[tokio::test]
    async fn test_missing_identifier_uses_fallback() {
        let oracle = MockOracle::default();
        oracle.add_response(schema::SPEC_BOOK, r#"{"is_multi_spec": false, "specs": []}"#);
        oracle.add_response(
            schema::REFERENCE_METADATA,
            r#"{"doc_identifier": null, "version": null, "title": null}"#,
        );
        oracle.add_response(schema::REQUIREMENTS, r#"{"requirements": []}"#);

        let (specs, _) = processor(&oracle)
            .process(&book(), &CustomerId::new("acme"), "quality-manual")
            .await
            .unwrap();
        assert_eq!(specs[0].entry.identifier, "quality-manual");
    }

    #[tokio::test]
    async fn test_spec_book_requirements_use_parent_numbering() {
        let oracle = MockOracle::default();
        oracle.add_response(
            schema::SPEC_BOOK,
            r#"{"is_multi_spec": true, "specs": [
                {"doc_identifier": "SPXQC-40", "version": null, "title": "FIRST ARTICLE", "start_line": 4, "end_line": 6},
                {"doc_identifier": "SPXQC-17", "version": null, "title": "SOURCE INSPECTION", "start_line": 1, "end_line": 3}]}"#,
        );
        oracle.add_response(
            schema::REQUIREMENTS,
            r#"{"requirements": [{"requirement_number": "1", "title": "Scope", "start_line": 2, "end_line": 3}]}"#,
        );

        let (specs, warnings) = processor(&oracle)
            .process(&book(), &CustomerId::new("acme"), "book")
            .await
            .unwrap();

        assert!(warnings.is_empty());
        let identifiers: Vec<_> = specs.iter().map(|s| s.entry.identifier.as_str()).collect();
        assert_eq!(identifiers, vec!["SPXQC-17", "SPXQC-40"]);
        assert_eq!(specs[1].range, LineRange::new(4, 6));
        assert_eq!(specs[1].requirements[0].range, LineRange::new(5, 6));
        assert!(oracle
            .requests()
            .iter()
            .all(|r| r.schema_name != schema::REFERENCE_METADATA));
    }

    #[tokio::test]
    async fn test_single_listed_spec_is_not_a_book() {
        let oracle = MockOracle::default();
        oracle.add_response(
            schema::SPEC_BOOK,
            r#"{"is_multi_spec": true, "specs": [
                {"doc_identifier": "SPXQC-17", "version": null, "title": null, "start_line": 1, "end_line": 6}]}"#,
        );
        let split = processor(&oracle).detect_spec_book(&book()).await.unwrap();
        assert!(!split.is_multi_spec());
    }
}
