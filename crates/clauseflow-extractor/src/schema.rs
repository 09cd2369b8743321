//! JSON schemas declared to the oracle for each structured-output call
//!
//! Schemas follow strict structured-output rules: every property is listed
//! in `required`, optional values are nullable, and no extra properties are
//! allowed.

use serde_json::{json, Value};

/// Schema name for document segmentation
pub const SEGMENTATION: &str = "document_segmentation";
/// Schema name for line-item extraction
pub const LINE_ITEMS: &str = "line_items";
/// Schema name for clause boundaries
pub const CLAUSES: &str = "clause_boundaries";
/// Schema name for citation detection
pub const CITATIONS: &str = "citations";
/// Schema name for reference metadata
pub const REFERENCE_METADATA: &str = "reference_metadata";
/// Schema name for requirement boundaries
pub const REQUIREMENTS: &str = "requirement_boundaries";
/// Schema name for spec-book detection
pub const SPEC_BOOK: &str = "spec_book_split";

fn nullable_string(description: &str) -> Value {
    json!({ "type": ["string", "null"], "description": description })
}

fn nullable_integer(description: &str) -> Value {
    json!({ "type": ["integer", "null"], "description": description })
}

fn integer(description: &str) -> Value {
    json!({ "type": "integer", "description": description })
}

fn object(properties: Value) -> Value {
    let required: Vec<String> = properties
        .as_object()
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn list_of(key: &str, description: &str, item: Value) -> Value {
    object(json!({
        key: { "type": "array", "description": description, "items": item }
    }))
}

/// Sections covering every line of the document
pub fn segmentation() -> Value {
    list_of(
        "sections",
        "List of all identified sections, covering every line in the document",
        object(json!({
            "start_line": integer("First line of the section (1-indexed, inclusive)"),
            "end_line": integer("Last line of the section (1-indexed, inclusive)"),
            "section_type": {
                "type": "string",
                "enum": ["header", "line_item", "terms_and_conditions", "signature", "attachment", "other"],
                "description": "Type of section"
            },
            "section_title": nullable_string("Title of the section if present, e.g. 'SECTION 2: QUALITY REQUIREMENTS'"),
            "section_number": nullable_string("Section number if present, e.g. '2' or 'A'"),
            "line_item_number": nullable_integer("For line_item sections only: which PO line item number this section belongs to"),
        })),
    )
}

/// Rows of the PO line-items table
pub fn line_items() -> Value {
    list_of(
        "line_items",
        "List of all line items found in the section",
        object(json!({
            "line_number": integer("PO line item number (1, 2, 3, etc.)"),
            "part_number": nullable_string("Part number / item number"),
            "description": nullable_string("Description of the line item"),
            "quantity": nullable_string("Quantity ordered (include unit if present)"),
            "quality_level": nullable_string("Quality level or inspection level if specified"),
            "start_line": nullable_integer("Document line where this line item starts"),
            "end_line": nullable_integer("Document line where this line item ends"),
        })),
    )
}

/// Clause boundaries within the supplied lines
pub fn clauses() -> Value {
    list_of(
        "clauses",
        "List of all identified clause references",
        object(json!({
            "start_line": integer("First line of the clause (1-indexed, inclusive)"),
            "end_line": integer("Last line of the clause (1-indexed, inclusive)"),
            "clause_number": nullable_string("Clause number like '1.3' or '7.2.1', or null if none"),
            "clause_title": nullable_string("Title of the clause if present, or null"),
            "chunk_type": {
                "type": "string",
                "enum": ["clause", "administrative", "boilerplate", "header", "signature"],
                "description": "clause (numbered requirement), administrative (header info), boilerplate (dividers), header (section titles), signature (signature blocks)"
            },
        })),
    )
}

/// External specification citations found in clauses
pub fn citations() -> Value {
    list_of(
        "references",
        "List of all detected external spec references",
        object(json!({
            "clause_start_line": integer("Start line of the clause containing this reference"),
            "clause_end_line": integer("End line of the clause containing this reference"),
            "spec_identifier": { "type": "string", "description": "Detected spec identifier like 'SPXQC-17' or 'AS9100'" },
            "version": nullable_string("Detected version like 'Rev D' or 'v57.0'"),
            "context": nullable_string("Brief context of how the spec is referenced"),
        })),
    )
}

/// Identifier, version and title of a reference document
pub fn reference_metadata() -> Value {
    object(json!({
        "doc_identifier": nullable_string("Document identifier like 'SPXQC-17' or 'AS9100'"),
        "version": nullable_string("Version like 'v57.0' or 'Rev D'"),
        "title": nullable_string("Full title of the document/specification"),
    }))
}

/// Requirement boundaries within a reference document
pub fn requirements() -> Value {
    list_of(
        "requirements",
        "List of all identified requirements",
        object(json!({
            "requirement_number": nullable_string("Requirement number like '4.2.1' or 'REQ-17'"),
            "title": nullable_string("Title of the requirement"),
            "start_line": integer("First line of the requirement (1-indexed, inclusive)"),
            "end_line": integer("Last line of the requirement (1-indexed, inclusive)"),
        })),
    )
}

/// Whether a reference document bundles several specifications
pub fn spec_book() -> Value {
    object(json!({
        "is_multi_spec": { "type": "boolean", "description": "True if this document contains multiple separate specifications" },
        "specs": {
            "type": "array",
            "description": "If multi-spec, the boundaries of each spec",
            "items": object(json!({
                "doc_identifier": { "type": "string", "description": "Identifier for this spec" },
                "version": nullable_string("Version if present"),
                "title": nullable_string("Title of this spec"),
                "start_line": integer("First line of this spec (1-indexed)"),
                "end_line": integer("Last line of this spec (1-indexed)"),
            })),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_strict(schema: &Value) {
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["additionalProperties"], false);
        let props = schema["properties"].as_object().unwrap();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(props.len(), required.len());
        for key in props.keys() {
            assert!(required.contains(&key.as_str()), "{} not required", key);
            if let Some(items) = props[key].get("items") {
                assert_strict(items);
            }
        }
    }

    #[test]
    fn test_all_schemas_are_strict() {
        for schema in [
            segmentation(),
            line_items(),
            clauses(),
            citations(),
            reference_metadata(),
            requirements(),
            spec_book(),
        ] {
            assert_strict(&schema);
        }
    }

    #[test]
    fn test_clause_kinds_in_schema() {
        let schema = clauses();
        let kinds = &schema["properties"]["clauses"]["items"]["properties"]["chunk_type"]["enum"];
        assert_eq!(kinds.as_array().unwrap().len(), 5);
    }
}
