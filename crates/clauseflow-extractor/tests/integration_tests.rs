//! Integration tests for clauseflow-extractor
//!
//! These tests exercise the public engines the way a caller composes them.

use clauseflow_domain::traits::ReferenceLibrary;
use clauseflow_domain::{
    ChunkKind, ClauseBoundary, CustomerId, IndexedDocument, LineRange, MatchOutcome,
    SectionBoundary, SectionKind, Warning,
};
use clauseflow_extractor::{
    match_citation, normalize_identifier, repair, schema, validate, ExtractorConfig,
    InMemoryLibrary, OracleAdapter, ReferenceProcessor,
};
use clauseflow_llm::MockOracle;
use std::sync::Arc;

fn section(start: usize, end: usize, kind: SectionKind) -> SectionBoundary {
    SectionBoundary::new(LineRange::new(start, end), kind)
}

#[test]
fn test_gap_of_four_is_reported_not_repaired() {
    let (sections, warnings) = repair(
        vec![
            section(1, 10, SectionKind::Header),
            section(15, 30, SectionKind::Terms),
        ],
        30,
    );

    assert_eq!(sections[0].range, LineRange::new(1, 10));
    assert_eq!(sections[1].range, LineRange::new(15, 30));
    assert!(warnings
        .iter()
        .any(|w| w.to_string().starts_with("Gap of 4 lines")));
    assert!(warnings.contains(&Warning::Uncovered {
        ranges: vec![LineRange::new(11, 14)]
    }));
}

#[test]
fn test_gap_of_three_is_repaired() {
    let (sections, warnings) = repair(
        vec![
            section(1, 10, SectionKind::Header),
            section(14, 30, SectionKind::Terms),
        ],
        30,
    );

    assert_eq!(sections[0].range, LineRange::new(1, 13));
    assert_eq!(sections[1].range, LineRange::new(14, 30));
    assert!(warnings
        .iter()
        .all(|w| matches!(w, Warning::Repaired { .. })));
}

#[test]
fn test_inverted_clause_never_reaches_valid() {
    let (valid, warnings) = validate(
        vec![ClauseBoundary::new(LineRange::new(5, 3), ChunkKind::Clause)],
        10,
    );
    assert!(valid.is_empty());
    assert!(matches!(warnings[0], Warning::OutOfBounds { .. }));
}

#[test]
fn test_library_file_drives_matching() {
    let library = InMemoryLibrary::from_toml(
        r#"
[[entries]]
customer = "acme"
identifier = "SDC-Q-100"
version = "Rev C"
"#,
    )
    .unwrap();
    let entries = library
        .entries_for_customer(&CustomerId::new("acme"))
        .unwrap();

    let cite = |identifier: &str, version: &str| clauseflow_domain::DetectedCitation {
        range: LineRange::new(1, 1),
        identifier: identifier.to_string(),
        version: Some(version.to_string()),
        context: None,
    };

    assert!(matches!(
        match_citation(cite("sdc q 100", "rev c"), &entries).outcome,
        MatchOutcome::Matched(_)
    ));
    assert!(matches!(
        match_citation(cite("SDC-Q-100", "Rev D"), &entries).outcome,
        MatchOutcome::Partial(_)
    ));
    assert_eq!(
        match_citation(cite("SDC-Q-999", "Rev C"), &entries).outcome,
        MatchOutcome::Unresolved
    );
    assert_eq!(normalize_identifier("SPXQC-17"), normalize_identifier("spx qc_17"));
}

#[tokio::test]
async fn test_reference_entries_feed_a_library() {
    let oracle = MockOracle::default();
    oracle.add_response(schema::SPEC_BOOK, r#"{"is_multi_spec": false, "specs": []}"#);
    oracle.add_response(
        schema::REFERENCE_METADATA,
        r#"{"doc_identifier": "SPXQC-17", "version": null, "title": "SOURCE INSPECTION"}"#,
    );
    oracle.add_response(
        schema::REQUIREMENTS,
        r#"{"requirements": [{"requirement_number": "1.0", "title": "Scope", "start_line": 2, "end_line": 3}]}"#,
    );
    let processor = ReferenceProcessor::new(OracleAdapter::new(
        Arc::new(oracle),
        &ExtractorConfig::default(),
    ));

    let doc = IndexedDocument::build("SPXQC-17 SOURCE INSPECTION\n1.0 Scope\nSource inspection applies.");
    let acme = CustomerId::new("acme");
    let (specs, warnings) = processor.process(&doc, &acme, "spxqc-17.txt").await.unwrap();
    assert!(warnings.is_empty());

    let mut library = InMemoryLibrary::new();
    for spec in specs {
        library.add(spec.entry);
    }
    let saved = library.to_toml().unwrap();
    let reloaded = InMemoryLibrary::from_toml(&saved).unwrap();
    let entries = reloaded.entries_for_customer(&acme).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].identifier, "SPXQC-17");
    assert_eq!(entries[0].title.as_deref(), Some("SOURCE INSPECTION"));
}
