//! Output formatting for the CLI.

use crate::config::{Config, OutputFormat, Profile};
use crate::error::Result;
use clauseflow_domain::{
    IndexedDocument, LibraryEntry, LineItemMetadata, LineRange, MatchOutcome, ReconciledLink,
    SectionBoundary, Warning,
};
use clauseflow_extractor::{DocumentIndex, IndexMode, ProcessedSpec, ReconciliationStatus, ScopedClause};
use colored::*;
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// The selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a complete document index.
    pub fn format_index(&self, index: &DocumentIndex, include_text: bool) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_index_json(index, include_text),
            OutputFormat::Table => self.format_index_table(index, include_text),
            OutputFormat::Quiet => Ok(index
                .clauses
                .iter()
                .map(|c| range_text(c.boundary.range))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_index_json(&self, index: &DocumentIndex, include_text: bool) -> Result<String> {
        let mut clauses = Vec::with_capacity(index.clauses.len());
        for clause in &index.clauses {
            let mut value = clause_json(clause);
            if include_text {
                value["text"] = Value::String(index.clause_text(clause)?.to_string());
            }
            clauses.push(value);
        }

        let reconciliation = match &index.reconciliation {
            ReconciliationStatus::Skipped => json!({ "status": "skipped" }),
            ReconciliationStatus::Completed => json!({ "status": "completed" }),
            ReconciliationStatus::Failed(reason) => json!({ "status": "failed", "reason": reason }),
        };

        let output = json!({
            "metadata": {
                "model_name": index.metadata.model_name,
                "mode": mode_name(index.metadata.mode),
                "total_lines": index.metadata.total_lines,
                "processing_time_ms": index.metadata.processing_time_ms,
            },
            "sections": index.sections.iter().map(section_json).collect::<Vec<_>>(),
            "line_items": index.line_items.iter().map(line_item_json).collect::<Vec<_>>(),
            "clauses": clauses,
            "links": index.links.iter().map(link_json).collect::<Vec<_>>(),
            "reconciliation": reconciliation,
            "warnings": warnings_json(&index.warnings),
        });
        Ok(serde_json::to_string_pretty(&output)?)
    }

    fn format_index_table(&self, index: &DocumentIndex, include_text: bool) -> Result<String> {
        let mut parts = Vec::new();

        if !index.sections.is_empty() {
            parts.push(self.heading("Sections"));
            parts.push(sections_table(&index.sections));
        }

        if !index.line_items.is_empty() {
            parts.push(self.heading("Line items"));
            parts.push(line_items_table(&index.line_items));
        }

        parts.push(self.heading("Clauses"));
        if index.clauses.is_empty() {
            parts.push(self.colorize("No clauses found.", "yellow"));
        } else {
            let mut builder = Builder::default();
            let mut header = vec!["Lines", "Kind", "Number", "Title", "Scope"];
            if include_text {
                header.push("Text");
            }
            builder.push_record(header);
            for clause in &index.clauses {
                let mut row = vec![
                    range_text(clause.boundary.range),
                    clause.boundary.kind.as_str().to_string(),
                    clause.boundary.number.clone().unwrap_or_default(),
                    clause.boundary.title.clone().unwrap_or_default(),
                    scope_text(clause),
                ];
                if include_text {
                    row.push(index.clause_text(clause)?.to_string());
                }
                builder.push_record(row);
            }
            parts.push(styled(builder));
        }

        match &index.reconciliation {
            ReconciliationStatus::Skipped => {}
            ReconciliationStatus::Completed => {
                parts.push(self.heading("References"));
                parts.push(self.format_links_table(&index.links));
            }
            ReconciliationStatus::Failed(reason) => {
                parts.push(self.error(&format!("Reconciliation failed: {}", reason)));
            }
        }

        parts.push(self.info(&format!(
            "{} lines, {} sections, {} clauses, {} ms ({})",
            index.metadata.total_lines,
            index.sections.len(),
            index.clauses.len(),
            index.metadata.processing_time_ms,
            mode_name(index.metadata.mode)
        )));

        Ok(parts.join("\n"))
    }

    /// Format a section partition with optional line items.
    pub fn format_sections(
        &self,
        doc: &IndexedDocument,
        sections: &[SectionBoundary],
        line_items: &[LineItemMetadata],
        warnings: &[Warning],
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let output = json!({
                    "total_lines": doc.total_lines(),
                    "sections": sections.iter().map(section_json).collect::<Vec<_>>(),
                    "line_items": line_items.iter().map(line_item_json).collect::<Vec<_>>(),
                    "warnings": warnings_json(warnings),
                });
                Ok(serde_json::to_string_pretty(&output)?)
            }
            OutputFormat::Table => {
                if sections.is_empty() {
                    return Ok(self.colorize("No sections found.", "yellow"));
                }
                let mut parts = vec![sections_table(sections)];
                if !line_items.is_empty() {
                    parts.push(line_items_table(line_items));
                }
                Ok(parts.join("\n"))
            }
            OutputFormat::Quiet => Ok(sections
                .iter()
                .map(|s| format!("{} {}", range_text(s.range), s.kind.as_str()))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Format the outcome of matching one citation.
    pub fn format_match(&self, link: &ReconciledLink, entries: &[LibraryEntry]) -> Result<String> {
        let entry = link
            .outcome
            .entry()
            .and_then(|id| entries.iter().find(|e| e.id == id));

        match self.format {
            OutputFormat::Json => {
                let mut value = link_json(link);
                if let Some(entry) = entry {
                    value["library_entry"] = entry_json(entry);
                }
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Table => {
                let outcome = self.outcome_text(&link.outcome);
                Ok(match entry {
                    Some(entry) => format!(
                        "{} {} -> {} {}",
                        outcome,
                        link.citation.identifier,
                        entry.identifier,
                        entry.version.as_deref().unwrap_or("(no version)")
                    ),
                    None => format!("{} {}", outcome, link.citation.identifier),
                })
            }
            OutputFormat::Quiet => Ok(link.outcome.as_str().to_string()),
        }
    }

    /// Format processed reference specs.
    pub fn format_specs(&self, specs: &[ProcessedSpec]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let output: Vec<Value> = specs
                    .iter()
                    .map(|spec| {
                        json!({
                            "start_line": spec.range.start,
                            "end_line": spec.range.end,
                            "entry": entry_json(&spec.entry),
                            "requirements": spec.requirements.iter().map(|r| json!({
                                "start_line": r.range.start,
                                "end_line": r.range.end,
                                "number": r.number,
                                "title": r.title,
                            })).collect::<Vec<_>>(),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&output)?)
            }
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Lines", "Identifier", "Version", "Title", "Requirements"]);
                for spec in specs {
                    builder.push_record([
                        range_text(spec.range),
                        spec.entry.identifier.clone(),
                        spec.entry.version.clone().unwrap_or_default(),
                        spec.entry.title.clone().unwrap_or_default(),
                        spec.requirements.len().to_string(),
                    ]);
                }
                Ok(styled(builder))
            }
            OutputFormat::Quiet => Ok(specs
                .iter()
                .map(|s| s.entry.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Format the configured oracle profiles, marking the active one.
    pub fn format_profiles(&self, config: &Config) -> Result<String> {
        let mut names: Vec<&String> = config.profiles.keys().collect();
        names.sort();

        match self.format {
            OutputFormat::Json => {
                let output: Vec<Value> = names
                    .iter()
                    .map(|name| {
                        let mut value = profile_json(&config.profiles[*name]);
                        value["name"] = json!(name);
                        value["active"] = json!(*name == &config.active_profile);
                        value
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&output)?)
            }
            OutputFormat::Table => {
                if names.is_empty() {
                    return Ok(self.info("No profiles configured"));
                }
                let mut builder = Builder::default();
                builder.push_record(["", "Name", "Provider", "Model", "Endpoint", "API key"]);
                for name in names {
                    let profile = &config.profiles[name];
                    let active = name == &config.active_profile;
                    builder.push_record([
                        if active { "*".to_string() } else { String::new() },
                        name.clone(),
                        profile.provider.as_str().to_string(),
                        profile.model.clone(),
                        profile.endpoint.clone().unwrap_or_else(|| "(default)".to_string()),
                        profile.api_key_env.as_ref().map(|v| format!("${}", v)).unwrap_or_default(),
                    ]);
                }
                Ok(styled(builder))
            }
            OutputFormat::Quiet => Ok(names
                .iter()
                .map(|name| name.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Format one profile.
    pub fn format_profile(&self, name: &str, profile: &Profile) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let mut value = profile_json(profile);
                value["name"] = json!(name);
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Table => {
                let mut lines = vec![
                    format!("Active profile: {}", self.colorize(name, "green")),
                    format!("  Provider: {}", profile.provider.as_str()),
                    format!("  Model: {}", profile.model),
                ];
                if let Some(endpoint) = &profile.endpoint {
                    lines.push(format!("  Endpoint: {}", endpoint));
                }
                if let Some(key_env) = &profile.api_key_env {
                    lines.push(format!("  API key from: ${}", key_env));
                }
                Ok(lines.join("\n"))
            }
            OutputFormat::Quiet => Ok(name.to_string()),
        }
    }

    /// Format warnings for the terminal, one per line.
    pub fn format_warnings(&self, warnings: &[Warning]) -> String {
        warnings
            .iter()
            .map(|w| self.warning(&w.to_string()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_links_table(&self, links: &[ReconciledLink]) -> String {
        if links.is_empty() {
            return self.colorize("No references found.", "yellow");
        }
        let mut builder = Builder::default();
        builder.push_record(["Lines", "Identifier", "Version", "Outcome", "Context"]);
        for link in links {
            builder.push_record([
                range_text(link.citation.range),
                link.citation.identifier.clone(),
                link.citation.version.clone().unwrap_or_default(),
                self.outcome_text(&link.outcome),
                link.citation.context.clone().unwrap_or_default(),
            ]);
        }
        styled(builder)
    }

    fn outcome_text(&self, outcome: &MatchOutcome) -> String {
        let color = match outcome {
            MatchOutcome::Matched(_) => "green",
            MatchOutcome::Partial(_) => "yellow",
            MatchOutcome::Unresolved => "red",
        };
        self.colorize(outcome.as_str(), color)
    }

    fn heading(&self, text: &str) -> String {
        self.colorize(text, "cyan")
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn styled(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn sections_table(sections: &[SectionBoundary]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["#", "Lines", "Kind", "Number", "Title"]);
    for (index, section) in sections.iter().enumerate() {
        builder.push_record([
            index.to_string(),
            range_text(section.range),
            section.kind.as_str().to_string(),
            section.number.clone().unwrap_or_default(),
            section.title.clone().unwrap_or_default(),
        ]);
    }
    styled(builder)
}

fn line_items_table(items: &[LineItemMetadata]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Line", "Part", "Description", "Qty", "Quality", "Lines"]);
    for item in items {
        builder.push_record([
            item.line_number.to_string(),
            item.part_number.clone().unwrap_or_default(),
            item.description.clone().unwrap_or_default(),
            item.quantity.clone().unwrap_or_default(),
            item.quality_level.clone().unwrap_or_default(),
            item.range.map(range_text).unwrap_or_default(),
        ]);
    }
    styled(builder)
}

fn range_text(range: LineRange) -> String {
    format!("{}-{}", range.start, range.end)
}

fn mode_name(mode: IndexMode) -> &'static str {
    match mode {
        IndexMode::Sectioned => "sectioned",
        IndexMode::SinglePass => "single_pass",
    }
}

fn scope_text(clause: &ScopedClause) -> String {
    match clause.scope {
        clauseflow_domain::ClauseScope::LineSpecific { line_item: Some(n) } => {
            format!("line item {}", n)
        }
        scope => scope.as_str().to_string(),
    }
}

fn section_json(section: &SectionBoundary) -> Value {
    json!({
        "start_line": section.range.start,
        "end_line": section.range.end,
        "kind": section.kind.as_str(),
        "title": section.title,
        "number": section.number,
        "line_item": section.line_item_index(),
    })
}

fn line_item_json(item: &LineItemMetadata) -> Value {
    json!({
        "line_number": item.line_number,
        "part_number": item.part_number,
        "description": item.description,
        "quantity": item.quantity,
        "quality_level": item.quality_level,
        "start_line": item.range.map(|r| r.start),
        "end_line": item.range.map(|r| r.end),
    })
}

fn clause_json(clause: &ScopedClause) -> Value {
    let line_item = match clause.scope {
        clauseflow_domain::ClauseScope::LineSpecific { line_item } => line_item,
        _ => None,
    };
    json!({
        "start_line": clause.boundary.range.start,
        "end_line": clause.boundary.range.end,
        "kind": clause.boundary.kind.as_str(),
        "number": clause.boundary.number,
        "title": clause.boundary.title,
        "scope": clause.scope.as_str(),
        "line_item": line_item,
        "section": clause.section,
    })
}

fn link_json(link: &ReconciledLink) -> Value {
    json!({
        "start_line": link.citation.range.start,
        "end_line": link.citation.range.end,
        "identifier": link.citation.identifier,
        "version": link.citation.version,
        "context": link.citation.context,
        "outcome": link.outcome.as_str(),
        "entry_id": link.outcome.entry().map(|id| id.to_string()),
    })
}

fn entry_json(entry: &LibraryEntry) -> Value {
    json!({
        "id": entry.id.to_string(),
        "customer": entry.customer.as_str(),
        "identifier": entry.identifier,
        "version": entry.version,
        "title": entry.title,
    })
}

fn profile_json(profile: &Profile) -> Value {
    json!({
        "provider": profile.provider.as_str(),
        "model": profile.model,
        "endpoint": profile.endpoint,
        "api_key_env": profile.api_key_env,
    })
}

fn warnings_json(warnings: &[Warning]) -> Vec<Value> {
    warnings
        .iter()
        .map(|w| json!({ "kind": w.kind(), "message": w.to_string() }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clauseflow_domain::{ChunkKind, ClauseBoundary, ClauseScope, CustomerId, DetectedCitation, SectionKind};
    use clauseflow_extractor::IndexMetadata;
    use std::sync::Arc;

    fn create_test_index() -> DocumentIndex {
        let document = Arc::new(IndexedDocument::build(
            "PURCHASE ORDER\nTERMS\n1. Quality per SDC-Q-100 Rev C.\n2. Ship FOB origin.",
        ));
        let clause = ScopedClause {
            boundary: ClauseBoundary::new(LineRange::new(3, 3), ChunkKind::Clause).with_number("1."),
            scope: ClauseScope::PoWide,
            section: Some(1),
        };
        DocumentIndex {
            document,
            sections: vec![
                SectionBoundary::new(LineRange::new(1, 1), SectionKind::Header),
                SectionBoundary::new(LineRange::new(2, 4), SectionKind::Terms).with_title("TERMS"),
            ],
            line_items: Vec::new(),
            clauses: vec![clause],
            links: vec![ReconciledLink {
                citation: DetectedCitation {
                    range: LineRange::new(3, 3),
                    identifier: "SDC-Q-100".to_string(),
                    version: Some("Rev C".to_string()),
                    context: None,
                },
                outcome: MatchOutcome::Unresolved,
            }],
            reconciliation: ReconciliationStatus::Completed,
            warnings: vec![Warning::discrepancy("Gap of 12 lines")],
            metadata: IndexMetadata {
                model_name: "test".to_string(),
                mode: IndexMode::Sectioned,
                total_lines: 4,
                processing_time_ms: 7,
            },
        }
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_index(&create_test_index(), true).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["clauses"][0]["scope"], "po_wide");
        assert_eq!(value["clauses"][0]["text"], "1. Quality per SDC-Q-100 Rev C.");
        assert_eq!(value["links"][0]["outcome"], "unresolved");
        assert_eq!(value["reconciliation"]["status"], "completed");
        assert_eq!(value["warnings"][0]["kind"], "discrepancy");
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_index(&create_test_index(), false).unwrap();
        assert_eq!(output, "3-3");
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_index(&create_test_index(), false).unwrap();
        assert!(output.contains("Sections"));
        assert!(output.contains("terms_and_conditions"));
        assert!(output.contains("SDC-Q-100"));
        assert!(output.contains("4 lines, 2 sections, 1 clauses"));
    }

    #[test]
    fn test_match_format_names_entry() {
        let entry = LibraryEntry::new(CustomerId::new("acme"), "SDC-Q-100").with_version("Rev C");
        let link = ReconciledLink {
            citation: DetectedCitation {
                range: LineRange::new(1, 1),
                identifier: "sdc q 100".to_string(),
                version: Some("rev d".to_string()),
                context: None,
            },
            outcome: MatchOutcome::Partial(entry.id),
        };
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_match(&link, &[entry]).unwrap();
        assert_eq!(output, "partial sdc q 100 -> SDC-Q-100 Rev C");
    }

    #[test]
    fn test_profiles_mark_active() {
        let config = Config::default();
        let table = Formatter::new(OutputFormat::Table, false)
            .format_profiles(&config)
            .unwrap();
        assert!(table.contains("llama3.1"));
        assert!(table.contains("(default)"));

        let json = Formatter::new(OutputFormat::Json, false)
            .format_profiles(&config)
            .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["name"], "default");
        assert_eq!(value[0]["active"], true);
        assert_eq!(value[0]["provider"], "ollama");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let msg = formatter.success("test");
        assert_eq!(msg, "✓ test");
    }
}
