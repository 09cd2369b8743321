//! Prompt engineering for every oracle call
//!
//! Each builder returns a complete [`OracleRequest`]: system text, task
//! instructions with the numbered document text, and the declared schema.

use crate::schema;
use clauseflow_domain::traits::OracleRequest;
use clauseflow_domain::{IndexedDocument, LineRange, SectionBoundary, SectionKind};

/// Characters of the rendering shown when checking for a spec book
pub const SPEC_BOOK_PREVIEW_CHARS: usize = 8_000;

/// Characters of the rendering shown when reading reference metadata
pub const METADATA_PREVIEW_CHARS: usize = 3_000;

/// Marker appended to text cut at a character budget
pub const TRUNCATION_MARKER: &str = "\n... (truncated)";

/// First `max_chars` characters of `text`, and whether anything was cut
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => (&text[..cut], true),
        None => (text, false),
    }
}

fn request(system: &str, instructions: String, schema_name: &str, schema: serde_json::Value) -> OracleRequest {
    OracleRequest::new(system, instructions, schema_name, schema.to_string())
}

/// Pass 1: partition the whole document into sections
pub fn segmentation(doc: &IndexedDocument) -> OracleRequest {
    let instructions = format!(
        "{}\n\nDocument ({} total lines):\n---\n{}\n---",
        SEGMENTATION_INSTRUCTIONS,
        doc.total_lines(),
        doc.render()
    );
    request(
        STRUCTURE_SYSTEM,
        instructions,
        schema::SEGMENTATION,
        schema::segmentation(),
    )
}

/// Line-items table of a header section
pub fn line_items(rendered_section: &str, range: LineRange) -> OracleRequest {
    let instructions = format!(
        "{}\n\nHeader section (lines {}-{}):\n---\n{}\n---",
        LINE_ITEM_INSTRUCTIONS, range.start, range.end, rendered_section
    );
    request(
        LINE_ITEM_SYSTEM,
        instructions,
        schema::LINE_ITEMS,
        schema::line_items(),
    )
}

/// Builds clause-boundary prompts, optionally biased by the owning section
pub struct ClausePromptBuilder<'a> {
    rendered: &'a str,
    range: LineRange,
    section: Option<&'a SectionBoundary>,
}

impl<'a> ClausePromptBuilder<'a> {
    /// Create a builder over a numbered rendering of `range`
    pub fn new(rendered: &'a str, range: LineRange) -> Self {
        Self {
            rendered,
            range,
            section: None,
        }
    }

    /// Describe the section the lines belong to
    pub fn with_section(mut self, section: &'a SectionBoundary) -> Self {
        self.section = Some(section);
        self
    }

    /// Build the complete request
    pub fn build(&self) -> OracleRequest {
        let mut instructions = String::new();

        match self.section {
            Some(section) => {
                instructions.push_str(&format!(
                    "You are analyzing a specific section of a contract/purchase order document to identify discrete clauses.\n\nThe text below is from a {} section",
                    section.kind.as_str()
                ));
                if let Some(title) = &section.title {
                    instructions.push_str(&format!(" titled '{}'", title));
                }
                instructions.push_str(".\n");
                if let Some(scope) = scope_instruction(section.kind) {
                    instructions.push_str(scope);
                    instructions.push('\n');
                }
                instructions.push('\n');
            }
            None => instructions.push_str(
                "You are analyzing a contract/purchase order document to identify discrete clauses and sections.\n\n",
            ),
        }

        instructions.push_str(CLAUSE_INSTRUCTIONS);
        instructions.push_str(&format!(
            "\n\nSection text (lines {}-{}):\n---\n{}\n---",
            self.range.start, self.range.end, self.rendered
        ));

        request(STRUCTURE_SYSTEM, instructions, schema::CLAUSES, schema::clauses())
    }
}

fn scope_instruction(kind: SectionKind) -> Option<&'static str> {
    match kind {
        SectionKind::Terms => {
            Some("All clauses in this section apply PO-wide (to the entire purchase order).")
        }
        SectionKind::LineItem => {
            Some("All clauses in this section apply to a specific line item.")
        }
        _ => None,
    }
}

/// Citation detection over clause blocks already cut to budget
pub fn citations(clauses_text: &str) -> OracleRequest {
    let instructions = format!("{}\n\nClauses:\n---\n{}\n---", CITATION_INSTRUCTIONS, clauses_text);
    request(
        "You identify references to external specifications and standards in purchase order clauses.",
        instructions,
        schema::CITATIONS,
        schema::citations(),
    )
}

/// Spec-book detection over the start of a reference document
pub fn spec_book(doc: &IndexedDocument) -> OracleRequest {
    let rendered = doc.render();
    let (preview, _) = truncate_chars(&rendered, SPEC_BOOK_PREVIEW_CHARS);
    let instructions = format!("{}\n\nDocument:\n---\n{}\n---", SPEC_BOOK_INSTRUCTIONS, preview);
    request(
        "You analyze reference documents to determine if they contain a single specification or multiple specifications bundled together.",
        instructions,
        schema::SPEC_BOOK,
        schema::spec_book(),
    )
}

/// Metadata of a reference document from its first page
pub fn reference_metadata(doc: &IndexedDocument) -> OracleRequest {
    let rendered = doc.render();
    let (preview, _) = truncate_chars(&rendered, METADATA_PREVIEW_CHARS);
    let instructions = format!(
        "{}\n\nDocument (first {} chars):\n---\n{}\n---",
        METADATA_INSTRUCTIONS, METADATA_PREVIEW_CHARS, preview
    );
    request(
        "You extract metadata from reference specifications and standards documents.",
        instructions,
        schema::REFERENCE_METADATA,
        schema::reference_metadata(),
    )
}

/// Requirement boundaries of a whole reference document
pub fn requirements(doc: &IndexedDocument) -> OracleRequest {
    let instructions = format!(
        "{}\n\nDocument:\n---\n{}\n---",
        REQUIREMENT_INSTRUCTIONS,
        doc.render()
    );
    request(
        "You analyze reference specifications to identify individual requirements and their boundaries.",
        instructions,
        schema::REQUIREMENTS,
        schema::requirements(),
    )
}

const STRUCTURE_SYSTEM: &str = "You are an expert at analyzing legal and contractual documents. You identify document structure precisely using line numbers.";

const LINE_ITEM_SYSTEM: &str = "You are an expert at reading purchase orders and extracting structured data from line item tables.";

const SEGMENTATION_INSTRUCTIONS: &str = r#"You are analyzing a contract/purchase order document to identify its major sections.

The document has been pre-processed with line numbers in the format [NNN] at the start of each line.

Your task is to identify the major SECTIONS of this document by their line number boundaries.

SECTION TYPES:
- "header" = The document preamble: PO number, dates, addresses, supplier info, AND the line items table (parts, quantities, prices). This is typically everything before the first named terms section.
- "terms_and_conditions" = Named sections containing contractual clauses/requirements (e.g., "SECTION 1: GENERAL PROVISIONS", "SECTION 2: QUALITY REQUIREMENTS"). Each named section should be its own entry.
- "line_item" = ONLY use this if the document has per-line-item sections with their own dedicated clauses (rare). Do NOT use this for the line items table in the header.
- "signature" = Signature blocks, acceptance/acknowledgment sections
- "attachment" = Attachments, appendices, exhibits, technical data packages
- "other" = Anything that doesn't fit the above categories

CRITICAL RULES:
1. Every line in the document must belong to exactly ONE section: no gaps, no overlaps
2. Sections must cover line 1 through the last line contiguously
3. Each named T&C section (SECTION 1, SECTION 2, etc.) should be its own entry
4. The header section includes everything from the start through the line items table, up to (but not including) the first T&C section
5. Include section headers (like "SECTION 2: QUALITY REQUIREMENTS") as the first line of their section, not as a separate entry
6. Attachments at the end should each be their own section if they are clearly separated

GUIDELINES:
- Look for clear section breaks: "SECTION N:", "PART N:", divider lines (====), etc.
- Provide the section_title as it appears in the document
- Provide the section_number if present (e.g., "1", "2", "A")"#;

const LINE_ITEM_INSTRUCTIONS: &str = r#"You are analyzing the header/preamble section of a purchase order to extract line item details.

The text below is from the header section of a PO, which contains a table of line items (parts being ordered).

Your task is to extract each line item with its details:
- line_number: The PO line item number (1, 2, 3, etc.)
- part_number: The part number or item number
- description: Description of the item
- quantity: Quantity ordered (include unit if present, e.g., "50 EA", "100 units")
- quality_level: Quality level, inspection level, or quality class if specified
- start_line: The document line number where this line item starts
- end_line: The document line number where this line item ends

If the line items span multiple lines each, include all lines for that item in the start_line/end_line range.
If quality_level is not explicitly stated, leave it null."#;

const CLAUSE_INSTRUCTIONS: &str = r#"The document has been pre-processed with line numbers in the format [NNN] at the start of each line.
The line numbers are from the ORIGINAL document. Use them exactly as shown.

Your task is to identify where clauses BEGIN and END by their line numbers.

CRITICAL RULES:
1. DO NOT reproduce any text from the document
2. ONLY return line number references
3. A clause includes its header/title line AND all body text until the next clause begins
4. Include subsections with their parent (e.g., if 1.1 has paragraphs (a), (b), (c), include them all in 1.1)

CHUNK TYPES:
- "clause" = A numbered contractual obligation or requirement (e.g., "1.1 ORDER OF PRECEDENCE", "2.3 SOURCE INSPECTION")
- "administrative" = Header info, addresses, contacts, dates, line items, PO details
- "boilerplate" = Divider lines (====), decorative headers
- "header" = Section headers like "SECTION 2: QUALITY REQUIREMENTS" (the header line itself, not the clauses within)
- "signature" = Signature blocks, acceptance sections

GUIDELINES:
- Each numbered clause (1.1, 1.2, 2.1, etc.) should be its own entry
- Section headers (SECTION 1: GENERAL PROVISIONS) are separate "header" entries
- Make sure clause ranges don't overlap
- Every line in the provided text must belong to some clause entry
- A clause cut off at the last line shown ends at that line"#;

const CITATION_INSTRUCTIONS: &str = r#"You are analyzing clauses from a purchase order to identify references to external specifications, standards, or documents.

Look for patterns like:
- Spec identifiers: "SPXQC-17", "AS9100 Rev D", "MIL-STD-1520"
- Document references: "per SPX-00000874 v57.0", "in accordance with SPXQC-40"
- Standard callouts: "AS9102", "ISO 9001:2015"

For each reference found, return:
- The clause's start/end lines, exactly as shown in its [Lines a-b] marker
- The spec identifier (normalized, e.g. "SPXQC-17" not "spxqc17")
- The version if specified
- Brief context of how it's referenced

DO NOT flag generic references like "this PO" or "the contract".
Only flag specific external document/spec identifiers."#;

const SPEC_BOOK_INSTRUCTIONS: &str = r#"Analyze this document and determine if it contains ONE specification or MULTIPLE separate specifications bundled into a book.

A multi-spec book typically has:
- A table of contents listing multiple specs
- Clear boundaries between different spec documents
- Each spec has its own identifier (e.g., SPXQC-17, SPXQC-40)

If it's a single spec, set is_multi_spec=false and leave specs empty.
If it's multiple specs, set is_multi_spec=true and identify each spec's boundaries."#;

const METADATA_INSTRUCTIONS: &str = r#"Extract the document identifier, version, and title from this reference specification.

Examples:
- doc_identifier: "SPXQC-17", version: null, title: "SOURCE INSPECTION"
- doc_identifier: "AS9100", version: "Rev D", title: "Quality Management Systems"
- doc_identifier: "SPX-00000874", version: "v57.0", title: null"#;

const REQUIREMENT_INSTRUCTIONS: &str = r#"Identify each discrete requirement in this reference specification.

Each requirement typically has:
- A number (e.g., 4.2.1, REQ-17, paragraph 3.a)
- A title (optional)
- Body text describing the requirement

Return the start and end line numbers for each requirement.
Include all sub-requirements within their parent's range."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segmentation_prompt_carries_rendering() {
        let doc = IndexedDocument::build("PO 1\nSECTION 1: GENERAL");
        let request = segmentation(&doc);
        assert_eq!(request.schema_name, schema::SEGMENTATION);
        assert!(request.instructions.contains("Document (2 total lines)"));
        assert!(request.instructions.contains("[2] SECTION 1: GENERAL"));
    }

    #[test]
    fn test_clause_prompt_scope_instructions() {
        let mut section = SectionBoundary::new(LineRange::new(4, 9), SectionKind::Terms)
            .with_title("SECTION 1: GENERAL");
        let terms = ClausePromptBuilder::new("[4] x", section.range)
            .with_section(&section)
            .build();
        assert!(terms.instructions.contains("terms_and_conditions section titled 'SECTION 1: GENERAL'"));
        assert!(terms.instructions.contains("apply PO-wide"));
        assert!(terms.instructions.contains("Section text (lines 4-9)"));

        section.kind = SectionKind::LineItem;
        let item = ClausePromptBuilder::new("[4] x", section.range)
            .with_section(&section)
            .build();
        assert!(item.instructions.contains("specific line item"));

        let bare = ClausePromptBuilder::new("[4] x", section.range).build();
        assert!(!bare.instructions.contains("PO-wide"));
        assert_eq!(bare.schema_name, schema::CLAUSES);
    }

    #[test]
    fn test_truncate_counts_characters() {
        let text = "ab\u{e9}cd";
        let (cut, truncated) = truncate_chars(text, 3);
        assert_eq!(cut, "ab\u{e9}");
        assert!(truncated);

        let (exact, truncated) = truncate_chars(text, 5);
        assert_eq!(exact, text);
        assert!(!truncated);

        let accents = "\u{e9}\u{e8}\u{ea}\u{eb}";
        assert_eq!(truncate_chars(accents, 2), ("\u{e9}\u{e8}", true));

        let (whole, truncated) = truncate_chars(text, 100);
        assert_eq!(whole, text);
        assert!(!truncated);
    }

    #[test]
    fn test_metadata_prompt_is_previewed() {
        let text = "x".repeat(10_000);
        let doc = IndexedDocument::build(text);
        let request = reference_metadata(&doc);
        assert!(request.instructions.len() < 4_000);
    }
}
