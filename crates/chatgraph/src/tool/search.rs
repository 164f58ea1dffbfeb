//! Web search through the Tavily HTTP API.
//!
//! `POST {base_url}/search` with `api_key`, `query` and `max_results`; the JSON
//! body is returned unchanged as the tool result.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ToolError;
use crate::tool::Tool;

pub const TAVILY_API_BASE: &str = "https://api.tavily.com";
const DEFAULT_MAX_RESULTS: u32 = 5;

#[derive(Debug, Clone)]
pub struct TavilyConfig {
    /// API key, usually from `TAVILY_API_KEY`.
    pub api_key: String,
    pub base_url: String,
    /// Results per query unless the model asks for fewer.
    pub max_results: u32,
}

impl TavilyConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: TAVILY_API_BASE.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
}

/// Web search tool named `tavily_search`.
#[derive(Debug)]
pub struct TavilySearchTool {
    config: TavilyConfig,
    client: reqwest::Client,
}

impl TavilySearchTool {
    pub fn new(config: TavilyConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn request<'a>(&'a self, args: &'a Value) -> Result<SearchRequest<'a>, ToolError> {
        let query = args
            .get("query")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| {
                ToolError::ValidationFailed("'query' must be a non-empty string".into())
            })?;
        let max_results = args
            .get("max_results")
            .and_then(Value::as_u64)
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX).clamp(1, self.config.max_results))
            .unwrap_or(self.config.max_results);
        Ok(SearchRequest {
            api_key: &self.config.api_key,
            query,
            max_results,
        })
    }
}

#[async_trait]
impl Tool for TavilySearchTool {
    fn name(&self) -> &str {
        "tavily_search"
    }

    fn description(&self) -> &str {
        "Searches the web and returns the most relevant results with titles, URLs and content snippets."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Search query" },
                "max_results": { "type": "integer", "description": "Number of results to return" }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let body = self.request(&args)?;
        debug!(query = body.query, max_results = body.max_results, "tavily search");
        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("search request: {e}")))?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("search response: {e}")))?;
        if !status.is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "search failed with {}: {}",
                status.as_u16(),
                text
            )));
        }
        serde_json::from_str(&text)
            .map_err(|e| ToolError::ExecutionFailed(format!("search response is not JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> TavilySearchTool {
        TavilySearchTool::new(TavilyConfig::new("tvly-test"))
    }

    #[test]
    fn request_uses_default_max_results() {
        let t = tool();
        let args = json!({"query": " rust async "});
        let req = t.request(&args).unwrap();
        assert_eq!(req.query, "rust async");
        assert_eq!(req.max_results, 5);
        assert_eq!(req.api_key, "tvly-test");
    }

    #[test]
    fn request_caps_max_results() {
        let t = tool();
        let args = json!({"query": "rust", "max_results": 50});
        assert_eq!(t.request(&args).unwrap().max_results, 5);
        let args = json!({"query": "rust", "max_results": 2});
        assert_eq!(t.request(&args).unwrap().max_results, 2);
    }

    #[test]
    fn request_beyond_u32_is_capped_not_wrapped() {
        let t = tool();
        let args = json!({"query": "rust", "max_results": 4_294_967_296u64});
        assert_eq!(t.request(&args).unwrap().max_results, 5);
        let args = json!({"query": "rust", "max_results": 0});
        assert_eq!(t.request(&args).unwrap().max_results, 1);
    }

    #[test]
    fn blank_query_rejected() {
        let t = tool();
        let args = json!({"query": "   "});
        assert!(matches!(t.request(&args), Err(ToolError::ValidationFailed(_))));
    }
}
