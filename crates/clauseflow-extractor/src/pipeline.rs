//! Pipeline composing the engines over one document

use crate::clauses::{validate, ClauseExtractor};
use crate::config::ExtractorConfig;
use crate::error::{ExtractorError, PipelineError};
use crate::library::InMemoryLibrary;
use crate::oracle::OracleAdapter;
use crate::reconcile::Reconciler;
use crate::reference::ReferenceProcessor;
use crate::segmenter::Segmenter;
use crate::types::{
    DocumentIndex, IndexMetadata, IndexMode, ReconciliationStatus, ScopedClause,
};
use clauseflow_domain::traits::{CompletionOracle, ReferenceLibrary};
use clauseflow_domain::{
    ClauseBoundary, ClauseScope, CustomerId, IndexedDocument, LineItemMetadata, SectionBoundary,
    SectionKind, Warning,
};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Builds a [`DocumentIndex`] from raw text
///
/// Stages run in order: segmentation and repair, line items for header
/// sections, clause extraction per terms and line-item section, validation,
/// scope assignment and optional reconciliation. Section extraction runs
/// concurrently up to `max_concurrent_sections`; results are merged in
/// section order.
pub struct Pipeline<O> {
    config: ExtractorConfig,
    segmenter: Segmenter<O>,
    clauses: ClauseExtractor<O>,
    reconciler: Reconciler<O>,
    references: ReferenceProcessor<O>,
}

impl<O> Pipeline<O>
where
    O: CompletionOracle + Send + Sync + 'static,
    O::Error: Display,
{
    /// Create a pipeline
    ///
    /// # Errors
    /// Returns [`ExtractorError::Config`] if `config` does not validate.
    pub fn new(oracle: O, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        let adapter = OracleAdapter::new(Arc::new(oracle), &config);
        Ok(Self {
            segmenter: Segmenter::new(adapter.clone()),
            clauses: ClauseExtractor::new(adapter.clone(), &config),
            reconciler: Reconciler::new(adapter.clone(), &config),
            references: ReferenceProcessor::new(adapter),
            config,
        })
    }

    /// The configuration in use
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Segmentation engine
    pub fn segmenter(&self) -> &Segmenter<O> {
        &self.segmenter
    }

    /// Chunked clause extraction engine
    pub fn clause_extractor(&self) -> &ClauseExtractor<O> {
        &self.clauses
    }

    /// Reconciliation engine
    pub fn reconciler(&self) -> &Reconciler<O> {
        &self.reconciler
    }

    /// Reference-document processor
    pub fn reference_processor(&self) -> &ReferenceProcessor<O> {
        &self.references
    }

    /// Index `text` by sections, without reconciliation
    pub async fn run(&self, text: impl Into<String>) -> Result<DocumentIndex, PipelineError> {
        self.index(text.into(), IndexMode::Sectioned, None::<(&CustomerId, &InMemoryLibrary)>)
            .await
    }

    /// Index `text` by sections and reconcile citations against `library`
    pub async fn run_reconciled<L>(
        &self,
        text: impl Into<String>,
        customer: &CustomerId,
        library: &L,
    ) -> Result<DocumentIndex, PipelineError>
    where
        L: ReferenceLibrary,
        L::Error: Display,
    {
        self.index(text.into(), IndexMode::Sectioned, Some((customer, library)))
            .await
    }

    /// Index `text` with one clause pass over the whole document
    pub async fn run_single_pass(&self, text: impl Into<String>) -> Result<DocumentIndex, PipelineError> {
        self.index(text.into(), IndexMode::SinglePass, None::<(&CustomerId, &InMemoryLibrary)>)
            .await
    }

    /// Single-pass indexing followed by reconciliation
    pub async fn run_single_pass_reconciled<L>(
        &self,
        text: impl Into<String>,
        customer: &CustomerId,
        library: &L,
    ) -> Result<DocumentIndex, PipelineError>
    where
        L: ReferenceLibrary,
        L::Error: Display,
    {
        self.index(text.into(), IndexMode::SinglePass, Some((customer, library)))
            .await
    }

    async fn index<L>(
        &self,
        text: String,
        mode: IndexMode,
        reconciliation: Option<(&CustomerId, &L)>,
    ) -> Result<DocumentIndex, PipelineError>
    where
        L: ReferenceLibrary,
        L::Error: Display,
    {
        let started = Instant::now();
        let document = Arc::new(IndexedDocument::build(text));
        let mut warnings = Vec::new();
        info!(total_lines = document.total_lines(), ?mode, "Indexing document");

        let (sections, line_items, clauses) = match mode {
            IndexMode::Sectioned => self.sectioned(&document, &mut warnings).await?,
            IndexMode::SinglePass => {
                let clauses = self.single_pass(&document, &mut warnings).await?;
                (Vec::new(), Vec::new(), clauses)
            }
        };

        let (links, reconciliation) = match reconciliation {
            None => (Vec::new(), ReconciliationStatus::Skipped),
            Some((customer, library)) => {
                let boundaries: Vec<ClauseBoundary> =
                    clauses.iter().map(|c| c.boundary.clone()).collect();
                match self
                    .reconciler
                    .reconcile(&document, &boundaries, customer, library)
                    .await
                {
                    Ok((links, reconcile_warnings)) => {
                        warnings.extend(reconcile_warnings);
                        (links, ReconciliationStatus::Completed)
                    }
                    Err(e) => {
                        warn!(error = %e, "Reconciliation failed, keeping extracted clauses");
                        (Vec::new(), ReconciliationStatus::Failed(e.to_string()))
                    }
                }
            }
        };

        let metadata = IndexMetadata {
            model_name: self.config.model_name.clone(),
            mode,
            total_lines: document.total_lines(),
            processing_time_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            sections = sections.len(),
            clauses = clauses.len(),
            links = links.len(),
            warnings = warnings.len(),
            elapsed_ms = metadata.processing_time_ms,
            "Indexing complete"
        );

        Ok(DocumentIndex {
            document,
            sections,
            line_items,
            clauses,
            links,
            reconciliation,
            warnings,
            metadata,
        })
    }

    async fn sectioned(
        &self,
        document: &Arc<IndexedDocument>,
        warnings: &mut Vec<Warning>,
    ) -> Result<(Vec<SectionBoundary>, Vec<LineItemMetadata>, Vec<ScopedClause>), PipelineError> {
        let (sections, segment_warnings) = self
            .segmenter
            .segment(document)
            .await
            .map_err(PipelineError::Segmentation)?;
        warnings.extend(segment_warnings);

        let mut line_items = Vec::new();
        for section in sections.iter().filter(|s| s.kind == SectionKind::Header) {
            match self.segmenter.extract_line_items(document, section).await {
                Ok(items) => line_items.extend(items),
                Err(e) => {
                    warn!(section = section.label(), error = %e, "Line item extraction failed");
                    warnings.push(Warning::discrepancy(format!(
                        "Line item extraction failed for '{}' (lines {}): {}",
                        section.label(),
                        section.range,
                        e
                    )));
                }
            }
        }

        let mut clauses = Vec::new();
        for (index, boundaries) in self.extract_sections(document, &sections).await? {
            let (valid, clause_warnings) = validate(boundaries, document.total_lines());
            warnings.extend(clause_warnings);
            let scope = ClauseScope::for_section(&sections[index]);
            clauses.extend(valid.into_iter().map(|boundary| ScopedClause {
                boundary,
                scope,
                section: Some(index),
            }));
        }

        Ok((sections, line_items, clauses))
    }

    /// Extract every clause-bearing section, returning results in section order
    async fn extract_sections(
        &self,
        document: &Arc<IndexedDocument>,
        sections: &[SectionBoundary],
    ) -> Result<Vec<(usize, Vec<ClauseBoundary>)>, PipelineError> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_sections));
        let mut tasks = JoinSet::new();

        for (index, section) in sections.iter().enumerate() {
            if !section.kind.carries_clauses() {
                continue;
            }
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| PipelineError::Task(e.to_string()))?;
            let extractor = self.clauses.clone();
            let document = Arc::clone(document);
            let section = section.clone();

            debug!(index, section = section.label(), range = %section.range, "Spawning clause extraction");
            tasks.spawn(async move {
                let result = extractor
                    .extract_clauses(&document, section.range, Some(&section))
                    .await;
                drop(permit);
                (index, result)
            });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            results.push(joined.map_err(|e| PipelineError::Task(e.to_string()))?);
        }
        results.sort_by_key(|(index, _)| *index);

        let mut per_section = Vec::with_capacity(results.len());
        for (index, result) in results {
            match result {
                Ok(clauses) => per_section.push((index, clauses)),
                Err(source) => {
                    let section = &sections[index];
                    return Err(PipelineError::Extraction {
                        section: section.label().to_string(),
                        range: section.range,
                        source,
                    });
                }
            }
        }
        Ok(per_section)
    }

    async fn single_pass(
        &self,
        document: &IndexedDocument,
        warnings: &mut Vec<Warning>,
    ) -> Result<Vec<ScopedClause>, PipelineError> {
        let range = document.full_range();
        let boundaries = self
            .clauses
            .extract_clauses(document, range, None)
            .await
            .map_err(|source| PipelineError::Extraction {
                section: "document".to_string(),
                range,
                source,
            })?;

        let (valid, clause_warnings) = validate(boundaries, document.total_lines());
        warnings.extend(clause_warnings);
        Ok(valid
            .into_iter()
            .map(|boundary| ScopedClause {
                boundary,
                scope: ClauseScope::Unscoped,
                section: None,
            })
            .collect())
    }
}
