//! Boundary oracle adapter - one schema-constrained call, parsed or failed

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_output;
use clauseflow_domain::traits::{CompletionOracle, OracleRequest};
use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Wraps a [`CompletionOracle`] so engines can await typed results
///
/// The oracle trait is synchronous, so each call runs on the blocking pool
/// under the configured timeout. A call yields a fully parsed payload or an
/// error; partial results never escape.
pub struct OracleAdapter<O> {
    oracle: Arc<O>,
    timeout: Duration,
    max_output_tokens: u32,
}

impl<O> Clone for OracleAdapter<O> {
    fn clone(&self) -> Self {
        Self {
            oracle: Arc::clone(&self.oracle),
            timeout: self.timeout,
            max_output_tokens: self.max_output_tokens,
        }
    }
}

impl<O> OracleAdapter<O>
where
    O: CompletionOracle + Send + Sync + 'static,
    O::Error: Display,
{
    /// Create an adapter using the timeout and token cap from `config`
    pub fn new(oracle: Arc<O>, config: &ExtractorConfig) -> Self {
        Self {
            oracle,
            timeout: config.oracle_timeout(),
            max_output_tokens: config.max_output_tokens,
        }
    }

    /// The wrapped oracle
    pub fn oracle(&self) -> &Arc<O> {
        &self.oracle
    }

    /// Send `request` and parse the answer as `T`
    ///
    /// # Errors
    /// - [`ExtractorError::OracleCallFailed`] if the oracle errors
    /// - [`ExtractorError::Timeout`] if no answer arrives in time
    /// - [`ExtractorError::OracleOutputUnparseable`] if the answer does not parse as `T`
    pub async fn call<T: DeserializeOwned>(
        &self,
        mut request: OracleRequest,
    ) -> Result<T, ExtractorError> {
        if request.max_output_tokens.is_none() {
            request.max_output_tokens = Some(self.max_output_tokens);
        }
        let schema_name = request.schema_name.clone();
        debug!(
            schema = %schema_name,
            prompt_chars = request.instructions.len(),
            "Calling oracle"
        );

        let oracle = Arc::clone(&self.oracle);
        let task = tokio::task::spawn_blocking(move || {
            oracle
                .complete(&request)
                .map_err(|e| ExtractorError::OracleCallFailed(e.to_string()))
        });

        let raw = timeout(self.timeout, task)
            .await
            .map_err(|_| ExtractorError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| ExtractorError::OracleCallFailed(format!("Task join error: {}", e)))??;

        debug!(schema = %schema_name, response_chars = raw.len(), "Oracle answered");
        parse_output(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClausesOutput;
    use clauseflow_llm::MockOracle;

    fn request() -> OracleRequest {
        OracleRequest::new("system", "find clauses", "clause_boundaries", "{}")
    }

    #[tokio::test]
    async fn test_call_parses_payload_and_sets_token_cap() {
        let oracle = MockOracle::new(r#"{"clauses": []}"#);
        let adapter = OracleAdapter::new(Arc::new(oracle.clone()), &ExtractorConfig::default());

        let parsed: ClausesOutput = adapter.call(request()).await.unwrap();
        assert!(parsed.clauses.is_empty());
        assert_eq!(oracle.requests()[0].max_output_tokens, Some(16_384));
    }

    #[tokio::test]
    async fn test_call_maps_oracle_failure() {
        let oracle = MockOracle::default();
        oracle.push_error("connection refused");
        let adapter = OracleAdapter::new(Arc::new(oracle), &ExtractorConfig::default());

        let result: Result<ClausesOutput, _> = adapter.call(request()).await;
        match result {
            Err(ExtractorError::OracleCallFailed(msg)) => assert!(msg.contains("connection refused")),
            other => panic!("Expected OracleCallFailed, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_call_rejects_schema_mismatch() {
        let oracle = MockOracle::new(r#"{"sections": []}"#);
        let adapter = OracleAdapter::new(Arc::new(oracle), &ExtractorConfig::default());

        let result: Result<ClausesOutput, _> = adapter.call(request()).await;
        assert!(matches!(
            result,
            Err(ExtractorError::OracleOutputUnparseable(_))
        ));
    }

    struct SlowOracle;

    impl CompletionOracle for SlowOracle {
        type Error = String;

        fn complete(&self, _request: &OracleRequest) -> Result<String, Self::Error> {
            std::thread::sleep(Duration::from_millis(1_500));
            Ok(r#"{"clauses": []}"#.to_string())
        }
    }

    #[tokio::test]
    async fn test_call_times_out() {
        let config = ExtractorConfig {
            oracle_timeout_secs: 1,
            ..ExtractorConfig::default()
        };
        let adapter = OracleAdapter::new(Arc::new(SlowOracle), &config);

        let result: Result<ClausesOutput, _> = adapter.call(request()).await;
        assert!(matches!(result, Err(ExtractorError::Timeout(1))));
    }
}
