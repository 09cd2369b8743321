//! Oracle selection from the active profile.

use crate::config::{Profile, Provider};
use crate::error::Result;
use clauseflow_domain::traits::{CompletionOracle, OracleRequest};
use clauseflow_llm::{ollama, openai, LlmError, OllamaOracle, OpenAiOracle};
use tracing::debug;

/// Any oracle backend a profile can name.
pub enum AnyOracle {
    /// Local Ollama server
    Ollama(OllamaOracle),
    /// OpenAI-compatible chat completions
    OpenAi(OpenAiOracle),
}

impl AnyOracle {
    /// Build the backend described by `profile`.
    pub fn from_profile(profile: &Profile) -> Result<Self> {
        debug!(provider = profile.provider.as_str(), model = %profile.model, "Building oracle");
        let oracle = match profile.provider {
            Provider::Ollama => {
                let endpoint = profile.endpoint.as_deref().unwrap_or(ollama::DEFAULT_ENDPOINT);
                AnyOracle::Ollama(OllamaOracle::new(endpoint, &profile.model)?)
            }
            Provider::OpenAi => {
                let endpoint = profile.endpoint.as_deref().unwrap_or(openai::DEFAULT_ENDPOINT);
                let key_env = profile
                    .api_key_env
                    .as_deref()
                    .unwrap_or(openai::DEFAULT_API_KEY_ENV);
                AnyOracle::OpenAi(OpenAiOracle::from_env(endpoint, &profile.model, key_env)?)
            }
        };
        Ok(oracle)
    }
}

impl CompletionOracle for AnyOracle {
    type Error = LlmError;

    fn complete(&self, request: &OracleRequest) -> std::result::Result<String, Self::Error> {
        match self {
            AnyOracle::Ollama(oracle) => oracle.complete(request),
            AnyOracle::OpenAi(oracle) => oracle.complete(request),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_profile() {
        let profile = Profile {
            provider: Provider::Ollama,
            model: "llama3.1".to_string(),
            endpoint: Some("http://gpu-box:11434".to_string()),
            api_key_env: None,
        };
        assert!(matches!(
            AnyOracle::from_profile(&profile),
            Ok(AnyOracle::Ollama(_))
        ));
    }

    #[test]
    fn test_openai_profile_needs_key() {
        let profile = Profile {
            provider: Provider::OpenAi,
            model: "gpt-4o".to_string(),
            endpoint: None,
            api_key_env: Some("CLAUSEFLOW_TEST_KEY_THAT_IS_NEVER_SET".to_string()),
        };
        assert!(AnyOracle::from_profile(&profile).is_err());
    }
}
