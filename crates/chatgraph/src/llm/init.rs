//! `provider:model` parsing and client construction.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::llm::{
    AnthropicConfig, ChatAnthropic, ChatOpenAI, LlmClient, LlmError, MockLlm, OpenAiConfig,
};
use crate::tool::ToolSpec;

/// Hosted model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
    /// Offline echo model; needs no credentials.
    Mock,
}

impl Provider {
    /// Environment variable holding the API key; `None` when no key is needed.
    pub fn api_key_var(self) -> Option<&'static str> {
        match self {
            Provider::OpenAi => Some("OPENAI_API_KEY"),
            Provider::Anthropic => Some("ANTHROPIC_API_KEY"),
            Provider::Mock => None,
        }
    }

    /// Environment variable overriding the API base URL.
    pub fn base_url_var(self) -> Option<&'static str> {
        match self {
            Provider::OpenAi => Some("OPENAI_API_BASE"),
            Provider::Anthropic => Some("ANTHROPIC_API_BASE"),
            Provider::Mock => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Mock => "mock",
        })
    }
}

/// Parsed `provider:model` string, e.g. `openai:gpt-4o`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub provider: Provider,
    pub model: String,
}

impl FromStr for ModelSpec {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (provider, model) = s.split_once(':').ok_or_else(|| {
            LlmError::InvalidRequest(format!("model must be provider:model, got {s:?}"))
        })?;
        let provider = match provider.trim().to_ascii_lowercase().as_str() {
            "openai" => Provider::OpenAi,
            "anthropic" => Provider::Anthropic,
            "mock" => Provider::Mock,
            other => {
                return Err(LlmError::InvalidRequest(format!(
                    "unknown model provider: {other}"
                )))
            }
        };
        let model = model.trim();
        if model.is_empty() {
            return Err(LlmError::InvalidRequest(format!("empty model name in {s:?}")));
        }
        Ok(Self {
            provider,
            model: model.to_string(),
        })
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.model)
    }
}

/// Credentials and endpoint for one provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub api_key: String,
    /// Overrides the provider's default base URL.
    pub base_url: Option<String>,
    /// Sampling temperature; only sent to OpenAI-compatible endpoints.
    pub temperature: Option<f32>,
}

/// Builds a client for `spec`, binding `tools` so the model may request them.
pub fn init_chat_model(
    spec: &ModelSpec,
    config: ProviderConfig,
    tools: Vec<ToolSpec>,
) -> Result<Arc<dyn LlmClient>, LlmError> {
    if spec.provider != Provider::Mock && config.api_key.trim().is_empty() {
        return Err(LlmError::Auth(format!("no API key for provider {}", spec.provider)));
    }
    let client: Arc<dyn LlmClient> = match spec.provider {
        Provider::OpenAi => {
            let mut c = OpenAiConfig::new(config.api_key, spec.model.clone());
            if let Some(base) = config.base_url {
                c = c.with_base_url(base);
            }
            let mut client = ChatOpenAI::with_config(c).with_tools(tools);
            if let Some(t) = config.temperature {
                client = client.with_temperature(t);
            }
            Arc::new(client)
        }
        Provider::Anthropic => {
            let mut c = AnthropicConfig::new(config.api_key, spec.model.clone());
            if let Some(base) = config.base_url {
                c = c.with_base_url(base);
            }
            Arc::new(ChatAnthropic::with_config(c).with_tools(tools))
        }
        Provider::Mock => Arc::new(MockLlm::echo()),
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_and_model() {
        let spec: ModelSpec = "openai:gpt-4o".parse().unwrap();
        assert_eq!(spec.provider, Provider::OpenAi);
        assert_eq!(spec.model, "gpt-4o");
        let spec: ModelSpec = "Anthropic:claude-3-5-sonnet-latest".parse().unwrap();
        assert_eq!(spec.provider, Provider::Anthropic);
        assert_eq!(spec.to_string(), "anthropic:claude-3-5-sonnet-latest");
    }

    #[test]
    fn rejects_missing_separator_and_unknown_provider() {
        assert!(matches!(
            "gpt-4o".parse::<ModelSpec>(),
            Err(LlmError::InvalidRequest(_))
        ));
        assert!(matches!(
            "cohere:command".parse::<ModelSpec>(),
            Err(LlmError::InvalidRequest(_))
        ));
        assert!(matches!(
            "openai:".parse::<ModelSpec>(),
            Err(LlmError::InvalidRequest(_))
        ));
    }

    #[test]
    fn hosted_provider_requires_key() {
        let spec: ModelSpec = "openai:gpt-4o".parse().unwrap();
        let err = init_chat_model(&spec, ProviderConfig::default(), vec![]).err();
        assert!(matches!(err, Some(LlmError::Auth(_))));
    }

    #[test]
    fn mock_provider_needs_no_key() {
        let spec: ModelSpec = "mock:echo".parse().unwrap();
        assert!(init_chat_model(&spec, ProviderConfig::default(), vec![]).is_ok());
    }
}
