//! Configuration for the extraction engines

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration threaded into every engine
///
/// The number of document lines sent in one oracle call is derived from the
/// context budget unless `max_lines_per_call` overrides it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Model label recorded in index metadata
    pub model_name: String,

    /// Tokens of document text one oracle call may carry
    pub context_budget_tokens: usize,

    /// Conservative token estimate per document line
    pub tokens_per_line: usize,

    /// Explicit cap on lines per call, overriding the derived value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lines_per_call: Option<usize>,

    /// Lines shared by consecutive windows of an oversized range
    pub chunk_overlap_lines: usize,

    /// Character budget for clause text sent to citation detection
    pub citation_text_budget_chars: usize,

    /// Maximum time for a single oracle call (seconds)
    pub oracle_timeout_secs: u64,

    /// Output token cap passed to the oracle
    pub max_output_tokens: u32,

    /// Sections extracted concurrently
    pub max_concurrent_sections: usize,
}

impl ExtractorConfig {
    /// Lines per oracle call
    pub fn max_lines_per_call(&self) -> usize {
        self.max_lines_per_call
            .unwrap_or_else(|| self.context_budget_tokens / self.tokens_per_line.max(1))
    }

    /// Get the oracle timeout as a Duration
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.context_budget_tokens == 0 {
            return Err("context_budget_tokens must be greater than 0".to_string());
        }
        if self.tokens_per_line == 0 {
            return Err("tokens_per_line must be greater than 0".to_string());
        }
        let max_lines = self.max_lines_per_call();
        if max_lines == 0 {
            return Err("max_lines_per_call must be greater than 0".to_string());
        }
        if self.chunk_overlap_lines >= max_lines {
            return Err(format!(
                "chunk_overlap_lines ({}) must be less than max_lines_per_call ({})",
                self.chunk_overlap_lines, max_lines
            ));
        }
        if self.citation_text_budget_chars == 0 {
            return Err("citation_text_budget_chars must be greater than 0".to_string());
        }
        if self.oracle_timeout_secs == 0 {
            return Err("oracle_timeout_secs must be greater than 0".to_string());
        }
        if self.max_output_tokens == 0 {
            return Err("max_output_tokens must be greater than 0".to_string());
        }
        if self.max_concurrent_sections == 0 {
            return Err("max_concurrent_sections must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Balanced settings sized for a 128K-context model
    fn default() -> Self {
        Self {
            model_name: "gpt-4o".to_string(),
            context_budget_tokens: 100_000,
            tokens_per_line: 15,
            max_lines_per_call: None,
            chunk_overlap_lines: 50,
            citation_text_budget_chars: 50_000,
            oracle_timeout_secs: 120,
            max_output_tokens: 16_384,
            max_concurrent_sections: 4,
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: smaller windows, shorter timeouts, more parallelism
    pub fn aggressive() -> Self {
        Self {
            context_budget_tokens: 32_000,
            chunk_overlap_lines: 30,
            citation_text_budget_chars: 20_000,
            oracle_timeout_secs: 60,
            max_output_tokens: 8_192,
            max_concurrent_sections: 8,
            ..Self::default()
        }
    }

    /// Lenient preset: larger windows and overlap, longer timeouts
    pub fn lenient() -> Self {
        Self {
            context_budget_tokens: 200_000,
            chunk_overlap_lines: 100,
            citation_text_budget_chars: 100_000,
            oracle_timeout_secs: 300,
            max_output_tokens: 32_768,
            max_concurrent_sections: 2,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string; missing keys take defaults
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_lines_per_call(), 6666);
    }

    #[test]
    fn test_aggressive_config_is_valid() {
        assert!(ExtractorConfig::aggressive().validate().is_ok());
    }

    #[test]
    fn test_lenient_config_is_valid() {
        assert!(ExtractorConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_override_max_lines() {
        let config = ExtractorConfig {
            max_lines_per_call: Some(40),
            chunk_overlap_lines: 10,
            ..ExtractorConfig::default()
        };
        assert_eq!(config.max_lines_per_call(), 40);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_window() {
        let config = ExtractorConfig {
            max_lines_per_call: Some(40),
            chunk_overlap_lines: 40,
            ..ExtractorConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.contains("chunk_overlap_lines"));
    }

    #[test]
    fn test_invalid_zero_values() {
        let mut config = ExtractorConfig::default();
        config.tokens_per_line = 0;
        assert!(config.validate().is_err());

        let mut config = ExtractorConfig::default();
        config.max_concurrent_sections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExtractorConfig::from_toml("chunk_overlap_lines = 20\n").unwrap();
        assert_eq!(config.chunk_overlap_lines, 20);
        assert_eq!(config.context_budget_tokens, 100_000);
        assert_eq!(config.max_lines_per_call, None);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig {
            max_lines_per_call: Some(500),
            ..ExtractorConfig::lenient()
        };
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }
}
