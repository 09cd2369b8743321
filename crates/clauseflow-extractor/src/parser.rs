//! Parse oracle output into typed payloads

use crate::error::ExtractorError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse an oracle response into the payload type `T`
///
/// Empty, `null` and non-object responses are rejected before
/// deserialization so the error says what was actually wrong.
pub(crate) fn parse_output<T: DeserializeOwned>(response: &str) -> Result<T, ExtractorError> {
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(json_str).map_err(|e| {
        ExtractorError::OracleOutputUnparseable(format!("JSON parse error: {}", e))
    })?;

    if json.is_null() {
        return Err(ExtractorError::OracleOutputUnparseable(
            "Oracle returned null".to_string(),
        ));
    }
    if !json.is_object() {
        return Err(ExtractorError::OracleOutputUnparseable(
            "Expected JSON object".to_string(),
        ));
    }

    Ok(serde_json::from_value(json)?)
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> Result<&str, ExtractorError> {
    let trimmed = response.trim();

    if trimmed.is_empty() {
        return Err(ExtractorError::OracleOutputUnparseable(
            "Empty response".to_string(),
        ));
    }

    if let Some(fenced) = trimmed.strip_prefix("```") {
        // Drop the opening fence line (```json or ```) and the closing fence
        let body = match fenced.find('\n') {
            Some(idx) => &fenced[idx + 1..],
            None => {
                return Err(ExtractorError::OracleOutputUnparseable(
                    "Empty code block".to_string(),
                ))
            }
        };
        let body = body.trim_end();
        Ok(body.strip_suffix("```").unwrap_or(body).trim())
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClausesOutput;

    #[test]
    fn test_parse_valid_json() {
        let response = r#"{"clauses": [
            {"start_line": 3, "end_line": 9, "clause_number": "1.1",
             "clause_title": "ORDER OF PRECEDENCE", "chunk_type": "clause"}
        ]}"#;

        let parsed: ClausesOutput = parse_output(response).unwrap();
        assert_eq!(parsed.clauses.len(), 1);
        assert_eq!(parsed.clauses[0].clause_number.as_deref(), Some("1.1"));
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let response = "```json\n{\"clauses\": []}\n```";
        let parsed: ClausesOutput = parse_output(response).unwrap();
        assert!(parsed.clauses.is_empty());
    }

    #[test]
    fn test_parse_invalid_json() {
        let result: Result<ClausesOutput, _> = parse_output("This is not JSON");
        assert!(matches!(
            result,
            Err(ExtractorError::OracleOutputUnparseable(_))
        ));
    }

    #[test]
    fn test_parse_null_and_empty() {
        let null: Result<ClausesOutput, _> = parse_output("null");
        assert!(null.unwrap_err().to_string().contains("null"));

        let empty: Result<ClausesOutput, _> = parse_output("   ");
        assert!(empty.unwrap_err().to_string().contains("Empty response"));
    }

    #[test]
    fn test_parse_json_not_object() {
        let result: Result<ClausesOutput, _> = parse_output("[]");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_missing_required_field() {
        let response = r#"{"clauses": [{"start_line": 3, "chunk_type": "clause"}]}"#;
        let result: Result<ClausesOutput, _> = parse_output(response);
        assert!(matches!(
            result,
            Err(ExtractorError::OracleOutputUnparseable(_))
        ));
    }

    #[test]
    fn test_extract_json_from_plain_json() {
        let json = r#"{"key": "value"}"#;
        assert_eq!(extract_json(json).unwrap(), json);
    }

    #[test]
    fn test_extract_json_from_markdown_without_language() {
        let response = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_json(response).unwrap(), r#"{"key": "value"}"#);
    }

    #[test]
    fn test_extract_json_unterminated_fence() {
        assert!(extract_json("```").is_err());
    }
}
