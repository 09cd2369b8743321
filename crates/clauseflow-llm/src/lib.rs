//! ClauseFlow Oracle Layer
//!
//! Pluggable completion-oracle implementations.
//!
//! # Architecture
//!
//! This crate provides implementations of the `CompletionOracle` trait from
//! `clauseflow-domain`. Every backend answers a structured-output request with
//! the raw JSON text of the response; parsing and validation happen upstream.
//!
//! # Oracles
//!
//! - `MockOracle`: Deterministic scripted oracle for testing
//! - `OllamaOracle`: Local Ollama API integration
//! - `OpenAiOracle`: OpenAI-compatible chat completions with JSON schema output
//!
//! # Examples
//!
//! ```
//! use clauseflow_llm::MockOracle;
//! use clauseflow_domain::traits::{CompletionOracle, OracleRequest};
//!
//! let oracle = MockOracle::new(r#"{"sections": []}"#);
//! let request = OracleRequest::new("system", "segment this", "document_segmentation", "{}");
//! assert_eq!(oracle.complete(&request).unwrap(), r#"{"sections": []}"#);
//! ```

#![warn(missing_docs)]

pub mod ollama;
pub mod openai;

use clauseflow_domain::traits::{CompletionOracle, OracleRequest};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

pub use ollama::OllamaOracle;
pub use openai::OpenAiOracle;

/// Default number of attempts for HTTP backends
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Errors that can occur during oracle operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the oracle
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Missing or rejected credentials
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, LlmError::Communication(_) | LlmError::RateLimitExceeded)
    }
}

/// Exponential backoff delay before retry number `attempt` (1s, 2s, 4s, ...)
pub(crate) fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.pow(attempt.saturating_sub(1).min(6)))
}

/// Run an async oracle call to completion from synchronous code
///
/// Inside a tokio runtime (e.g. on a `spawn_blocking` thread) the current
/// handle is reused; otherwise a single-threaded runtime is built for the
/// call. Must not be called from an async worker thread.
pub(crate) fn block_on<F>(future: F) -> Result<F::Output, LlmError>
where
    F: Future,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Ok(handle.block_on(future)),
        Err(_) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))?;
            Ok(runtime.block_on(future))
        }
    }
}

/// Scripted outcome for a request matching a key
#[derive(Debug, Clone)]
enum Scripted {
    Respond(String),
    Fail(String),
}

#[derive(Debug, Default)]
struct MockState {
    rules: Vec<(String, Scripted)>,
    queue: VecDeque<Scripted>,
    requests: Vec<OracleRequest>,
}

/// Mock oracle for deterministic testing
///
/// Resolution order for each request:
/// 1. the first rule whose key equals the schema name or is a substring of
///    the request instructions
/// 2. the next queued response, if any
/// 3. the default response
///
/// Clones share state, so a clone handed to an engine can be inspected
/// afterwards.
///
/// # Examples
///
/// ```
/// use clauseflow_llm::MockOracle;
/// use clauseflow_domain::traits::{CompletionOracle, OracleRequest};
///
/// let oracle = MockOracle::default();
/// oracle.add_response("Lines 1-40", r#"{"clauses": []}"#);
/// oracle.add_error("Lines 41-80", "boom");
///
/// let ok = OracleRequest::new("", "Lines 1-40 of the section", "s", "{}");
/// let bad = OracleRequest::new("", "Lines 41-80 of the section", "s", "{}");
/// assert_eq!(oracle.complete(&ok).unwrap(), r#"{"clauses": []}"#);
/// assert!(oracle.complete(&bad).is_err());
/// assert_eq!(oracle.call_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockOracle {
    default_response: String,
    state: Arc<Mutex<MockState>>,
}

impl MockOracle {
    /// Create a mock that answers every request with `response`
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Answer requests matching `key` with `response`
    pub fn add_response(&self, key: impl Into<String>, response: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .rules
            .push((key.into(), Scripted::Respond(response.into())));
    }

    /// Fail requests matching `key`
    pub fn add_error(&self, key: impl Into<String>, message: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .rules
            .push((key.into(), Scripted::Fail(message.into())));
    }

    /// Queue a response consumed by the next unmatched request
    pub fn push_response(&self, response: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .queue
            .push_back(Scripted::Respond(response.into()));
    }

    /// Queue a failure consumed by the next unmatched request
    pub fn push_error(&self, message: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .queue
            .push_back(Scripted::Fail(message.into()));
    }

    /// Number of requests received
    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    /// Copies of every request received, in order
    pub fn requests(&self) -> Vec<OracleRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Forget recorded requests
    pub fn reset(&self) {
        self.state.lock().unwrap().requests.clear();
    }
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new("{}")
    }
}

impl CompletionOracle for MockOracle {
    type Error = LlmError;

    fn complete(&self, request: &OracleRequest) -> Result<String, Self::Error> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());

        let rule = state
            .rules
            .iter()
            .find(|(key, _)| {
                request.schema_name == *key || request.instructions.contains(key.as_str())
            })
            .map(|(_, scripted)| scripted.clone());
        let scripted = match rule {
            Some(scripted) => Some(scripted),
            None => state.queue.pop_front(),
        };

        match scripted {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(LlmError::Other(message)),
            None => Ok(self.default_response.clone()),
        }
    }
}
