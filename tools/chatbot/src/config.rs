//! Configuration: model selection, provider credentials and agent options.
//!
//! **Interaction**: Used by `main` to build the model client, the tool
//! registry and the `AgentContext`. Loads from environment and CLI args via
//! `Config::from_env_and_args`.

use std::sync::Arc;

use anyhow::{Context, Result};
use chatgraph::tool::{CalculatorTool, GetTimeTool, TavilyConfig, TavilySearchTool, ToolSpec};
use chatgraph::{
    init_chat_model, AgentContext, LlmClient, ModelSpec, ProviderConfig, ToolRegistry,
};

/// Model used when `--model` is not given.
pub const DEFAULT_MODEL: &str = "openai:gpt-4o-mini";
/// Search results per query unless `--search-results` says otherwise.
pub const DEFAULT_SEARCH_RESULTS: u32 = 5;

/// Options taken from the command line.
#[derive(Clone, Debug)]
pub struct CliOptions {
    pub model: String,
    pub temperature: Option<f32>,
    pub recursion_limit: usize,
    pub search_results: u32,
    pub system_prompt: Option<String>,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            recursion_limit: chatgraph::graph::DEFAULT_RECURSION_LIMIT,
            search_results: DEFAULT_SEARCH_RESULTS,
            system_prompt: None,
        }
    }
}

/// Resolved configuration: model, credentials and run options.
#[derive(Clone, Debug)]
pub struct Config {
    pub model: ModelSpec,
    pub provider: ProviderConfig,
    /// Enables the `tavily_search` tool when set.
    pub tavily_api_key: Option<String>,
    pub search_results: u32,
    pub recursion_limit: usize,
    pub system_prompt: Option<String>,
}

impl Config {
    /// Resolves config from the process environment and CLI. Caller should
    /// run `dotenv::dotenv().ok()` before this.
    pub fn from_env_and_args(opts: &CliOptions) -> Result<Self> {
        Self::resolve(opts, |key| std::env::var(key).ok())
    }

    /// Resolves config with `lookup` standing in for the environment.
    pub fn resolve<F>(opts: &CliOptions, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let model: ModelSpec = opts
            .model
            .parse()
            .with_context(|| format!("invalid --model {:?}", opts.model))?;

        let api_key = match model.provider.api_key_var() {
            Some(key_var) => var(key_var).with_context(|| {
                format!(
                    "{key_var} not set (needed for {}; put it in .env or environment)",
                    model.provider
                )
            })?,
            None => String::new(),
        };
        let base_url = model.provider.base_url_var().and_then(|v| var(v));

        if opts.recursion_limit == 0 {
            anyhow::bail!("--recursion-limit must be at least 1");
        }

        Ok(Self {
            model,
            provider: ProviderConfig {
                api_key,
                base_url,
                temperature: opts.temperature,
            },
            tavily_api_key: var("TAVILY_API_KEY"),
            search_results: opts.search_results.max(1),
            recursion_limit: opts.recursion_limit,
            system_prompt: opts.system_prompt.clone(),
        })
    }

    /// Tools offered to the agent: calculator and clock, plus web search
    /// when a Tavily key is configured.
    pub fn tool_registry(&self) -> Result<ToolRegistry> {
        let mut builder = ToolRegistry::builder()
            .register(CalculatorTool::new())
            .register(GetTimeTool::new());
        if let Some(key) = &self.tavily_api_key {
            let search = TavilyConfig::new(key.as_str()).with_max_results(self.search_results);
            builder = builder.register(TavilySearchTool::new(search));
        }
        builder.build().context("build tool registry")
    }

    /// Model client with `tools` bound.
    pub fn llm(&self, tools: Vec<ToolSpec>) -> Result<Arc<dyn LlmClient>> {
        init_chat_model(&self.model, self.provider.clone(), tools)
            .with_context(|| format!("init model {}", self.model))
    }

    /// Model client plus tool registry for the tool-calling agent.
    pub fn agent_context(&self) -> Result<AgentContext> {
        let tools = self.tool_registry()?;
        let llm = self.llm(tools.specs())?;
        let mut ctx = AgentContext::new(llm, tools).with_recursion_limit(self.recursion_limit);
        if let Some(prompt) = &self.system_prompt {
            ctx = ctx.with_system_prompt(prompt.as_str());
        }
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatgraph::Provider;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn default_model_needs_openai_key() {
        let err = Config::resolve(&CliOptions::default(), env(&[])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn openai_key_and_base_are_trimmed() {
        let cfg = Config::resolve(
            &CliOptions::default(),
            env(&[
                ("OPENAI_API_KEY", " sk-test \n"),
                ("OPENAI_API_BASE", "http://localhost:8080/v1"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.model.provider, Provider::OpenAi);
        assert_eq!(cfg.model.model, "gpt-4o-mini");
        assert_eq!(cfg.provider.api_key, "sk-test");
        assert_eq!(
            cfg.provider.base_url.as_deref(),
            Some("http://localhost:8080/v1")
        );
    }

    #[test]
    fn anthropic_uses_its_own_key() {
        let opts = CliOptions {
            model: "anthropic:claude-3-5-sonnet-latest".into(),
            ..CliOptions::default()
        };
        assert!(Config::resolve(&opts, env(&[("OPENAI_API_KEY", "sk")])).is_err());
        let cfg = Config::resolve(&opts, env(&[("ANTHROPIC_API_KEY", "ak")])).unwrap();
        assert_eq!(cfg.provider.api_key, "ak");
    }

    #[test]
    fn mock_model_needs_no_key() {
        let opts = CliOptions {
            model: "mock:echo".into(),
            ..CliOptions::default()
        };
        let cfg = Config::resolve(&opts, env(&[])).unwrap();
        assert!(cfg.provider.api_key.is_empty());
        assert!(cfg.llm(vec![]).is_ok());
    }

    #[test]
    fn bad_model_string_is_reported() {
        let opts = CliOptions {
            model: "gpt-4o".into(),
            ..CliOptions::default()
        };
        let err = Config::resolve(&opts, env(&[])).unwrap_err();
        assert!(err.to_string().contains("invalid --model"));
    }

    #[test]
    fn search_tool_only_with_tavily_key() {
        let opts = CliOptions {
            model: "mock:echo".into(),
            ..CliOptions::default()
        };
        let cfg = Config::resolve(&opts, env(&[])).unwrap();
        assert_eq!(cfg.tool_registry().unwrap().names(), vec!["calculator", "get_time"]);

        let cfg = Config::resolve(&opts, env(&[("TAVILY_API_KEY", "tvly")])).unwrap();
        assert_eq!(
            cfg.tool_registry().unwrap().names(),
            vec!["calculator", "get_time", "tavily_search"]
        );
    }

    #[test]
    fn zero_recursion_limit_rejected() {
        let opts = CliOptions {
            model: "mock:echo".into(),
            recursion_limit: 0,
            ..CliOptions::default()
        };
        assert!(Config::resolve(&opts, env(&[])).is_err());
    }
}
