//! OpenAI-compatible Chat Completions client.
//!
//! Sends the transcript as `messages`, bound tools as `tools`, and maps
//! `choices[0].message` back to an `LlmResponse`. Works with any endpoint that
//! speaks the same API (set `base_url`). Streaming sets `stream: true` and
//! reads `choices[0].delta` chunks until `data: [DONE]`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::llm::stream::{sse_chat, Delta, DeltaParser};
use crate::llm::{ChatStream, LlmClient, LlmError, LlmResponse};
use crate::message::{Message, ToolCall};
use crate::tool::ToolSpec;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI-compatible configuration.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key, usually from `OPENAI_API_KEY`.
    pub api_key: String,
    /// Base URL without trailing slash.
    pub base_url: String,
    /// Model id, e.g. `gpt-4o-mini`.
    pub model: String,
    pub temperature: Option<f32>,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENAI_API_BASE.to_string(),
            model: model.into(),
            temperature: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Serialize)]
struct RequestBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded arguments, as the API sends and expects them.
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction<'a>,
}

#[derive(Debug, Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    parameters: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<StreamToolCall>>,
}

/// Fragment of a tool call; `index` ties fragments of one call together.
#[derive(Debug, Deserialize)]
struct StreamToolCall {
    index: usize,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<StreamFunction>,
}

#[derive(Debug, Deserialize)]
struct StreamFunction {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

#[derive(Debug, Default)]
struct PartialCall {
    id: String,
    name: String,
    arguments: String,
}

/// Accumulates `chat.completion.chunk` payloads.
#[derive(Debug, Default)]
struct ChunkParser {
    content: String,
    calls: Vec<PartialCall>,
}

impl DeltaParser for ChunkParser {
    fn feed(&mut self, data: &str) -> Result<Delta, LlmError> {
        if data.trim() == "[DONE]" {
            return Ok(Delta::End);
        }
        let chunk: StreamChunk =
            serde_json::from_str(data).map_err(|e| LlmError::Parsing(format!("{e}: {data}")))?;
        if let Some(error) = chunk.error {
            return Err(LlmError::Api(error.to_string()));
        }
        let Some(choice) = chunk.choices.into_iter().next() else {
            return Ok(Delta::Skip);
        };
        for fragment in choice.delta.tool_calls.unwrap_or_default() {
            if self.calls.len() <= fragment.index {
                self.calls
                    .resize_with(fragment.index + 1, PartialCall::default);
            }
            let call = &mut self.calls[fragment.index];
            if let Some(id) = fragment.id {
                call.id = id;
            }
            if let Some(function) = fragment.function {
                call.name.push_str(function.name.as_deref().unwrap_or_default());
                call.arguments
                    .push_str(function.arguments.as_deref().unwrap_or_default());
            }
        }
        match choice.delta.content {
            Some(text) if !text.is_empty() => {
                self.content.push_str(&text);
                Ok(Delta::Text(text))
            }
            _ => Ok(Delta::Skip),
        }
    }

    fn finish(&mut self) -> Result<LlmResponse, LlmError> {
        let tool_calls = std::mem::take(&mut self.calls)
            .into_iter()
            .map(|c| {
                Ok(ToolCall {
                    arguments: parse_arguments(&c.arguments)?,
                    id: c.id,
                    name: c.name,
                })
            })
            .collect::<Result<Vec<_>, LlmError>>()?;
        Ok(LlmResponse {
            content: std::mem::take(&mut self.content),
            tool_calls,
        })
    }
}

fn function_type() -> String {
    "function".to_string()
}

fn to_wire(m: &Message) -> WireMessage {
    let plain = |role, content: &str| WireMessage {
        role,
        content: Some(content.to_string()),
        tool_calls: Vec::new(),
        tool_call_id: None,
    };
    match m {
        Message::System(s) => plain("system", s),
        Message::User(s) => plain("user", s),
        Message::Assistant(s) => plain("assistant", s),
        Message::ToolCalls { content, calls } => WireMessage {
            role: "assistant",
            content: (!content.is_empty()).then(|| content.clone()),
            tool_calls: calls
                .iter()
                .map(|c| WireToolCall {
                    id: c.id.clone(),
                    kind: function_type(),
                    function: WireFunctionCall {
                        name: c.name.clone(),
                        arguments: c.arguments.to_string(),
                    },
                })
                .collect(),
            tool_call_id: None,
        },
        Message::Tool(r) => WireMessage {
            role: "tool",
            content: Some(r.content.clone()),
            tool_calls: Vec::new(),
            tool_call_id: Some(r.call_id.clone()),
        },
    }
}

fn parse_arguments(raw: &str) -> Result<Value, LlmError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw)
        .map_err(|e| LlmError::Parsing(format!("tool arguments {raw:?}: {e}")))
}

fn parse_response(text: &str) -> Result<LlmResponse, LlmError> {
    let parsed: ResponseBody =
        serde_json::from_str(text).map_err(|e| LlmError::Parsing(format!("{e}: {text}")))?;
    let message = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Parsing("response has no choices".to_string()))?
        .message;
    let tool_calls = message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| {
            Ok(ToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: parse_arguments(&tc.function.arguments)?,
            })
        })
        .collect::<Result<Vec<_>, LlmError>>()?;
    Ok(LlmResponse {
        content: message.content.unwrap_or_default(),
        tool_calls,
    })
}

/// Chat Completions client implementing `LlmClient`.
///
/// **Interaction**: Built by `init_chat_model` for the `openai` provider;
/// `with_tools` binds the registry's specs so the model can request them.
#[derive(Debug)]
pub struct ChatOpenAI {
    config: OpenAiConfig,
    tools: Vec<ToolSpec>,
    client: reqwest::Client,
}

impl ChatOpenAI {
    pub fn with_config(config: OpenAiConfig) -> Self {
        Self {
            config,
            tools: Vec::new(),
            client: reqwest::Client::new(),
        }
    }

    /// Binds tools; the model may then answer with tool calls.
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    fn build_body<'a>(&'a self, messages: &[Message]) -> RequestBody<'a> {
        RequestBody {
            model: &self.config.model,
            messages: messages.iter().map(to_wire).collect(),
            tools: self
                .tools
                .iter()
                .map(|t| WireTool {
                    kind: "function",
                    function: WireFunction {
                        name: &t.name,
                        description: t.description.as_deref(),
                        parameters: &t.input_schema,
                    },
                })
                .collect(),
            temperature: self.config.temperature,
            stream: false,
        }
    }

    async fn send(&self, body: &RequestBody<'_>) -> Result<reqwest::Response, LlmError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let text = res.text().await?;
            warn!(status = status.as_u16(), "chat completion failed");
            return Err(LlmError::from_status(status.as_u16(), text));
        }
        Ok(res)
    }
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError> {
        let body = self.build_body(messages);
        debug!(model = %self.config.model, messages = messages.len(), "chat completion request");
        let text = self.send(&body).await?.text().await?;
        parse_response(&text)
    }

    fn stream<'a>(&'a self, messages: &'a [Message]) -> ChatStream<'a> {
        let request = async move {
            let mut body = self.build_body(messages);
            body.stream = true;
            debug!(model = %self.config.model, messages = messages.len(), "chat completion stream");
            self.send(&body).await
        };
        sse_chat(request, ChunkParser::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_messages_use_wire_shape() {
        let client = ChatOpenAI::with_config(OpenAiConfig::new("k", "gpt-4o-mini"));
        let messages = vec![
            Message::user("time?"),
            Message::ToolCalls {
                content: String::new(),
                calls: vec![ToolCall::new("c1", "get_time", json!({}))],
            },
            Message::tool("c1", "get_time", "12:00"),
        ];
        let body = serde_json::to_value(client.build_body(&messages)).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert!(body.get("tools").is_none());
        assert_eq!(body["messages"][1]["role"], "assistant");
        assert!(body["messages"][1]["content"].is_null());
        assert_eq!(body["messages"][1]["tool_calls"][0]["function"]["arguments"], "{}");
        assert_eq!(body["messages"][2]["role"], "tool");
        assert_eq!(body["messages"][2]["tool_call_id"], "c1");
    }

    #[test]
    fn bound_tools_are_serialized() {
        let spec = ToolSpec {
            name: "calculator".into(),
            description: Some("math".into()),
            input_schema: json!({"type": "object"}),
        };
        let client =
            ChatOpenAI::with_config(OpenAiConfig::new("k", "m")).with_tools(vec![spec]);
        let body = serde_json::to_value(client.build_body(&[Message::user("1+1")])).unwrap();
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "calculator");
    }

    #[test]
    fn parses_tool_call_response() {
        let text = r#"{"choices":[{"message":{"content":null,"tool_calls":[
            {"id":"call_1","type":"function","function":{"name":"calculator","arguments":"{\"expression\":\"3+5\"}"}}
        ]}}]}"#;
        let resp = parse_response(text).unwrap();
        assert_eq!(resp.content, "");
        assert_eq!(resp.tool_calls.len(), 1);
        assert_eq!(resp.tool_calls[0].id, "call_1");
        assert_eq!(resp.tool_calls[0].arguments, json!({"expression": "3+5"}));
    }

    #[test]
    fn parses_text_response() {
        let text = r#"{"choices":[{"message":{"content":"Seven."}}]}"#;
        let resp = parse_response(text).unwrap();
        assert_eq!(resp, LlmResponse::text("Seven."));
    }

    #[test]
    fn stream_flag_only_when_streaming() {
        let client = ChatOpenAI::with_config(OpenAiConfig::new("k", "m"));
        let mut body = client.build_body(&[Message::user("hi")]);
        assert!(serde_json::to_value(&body).unwrap().get("stream").is_none());
        body.stream = true;
        assert_eq!(serde_json::to_value(&body).unwrap()["stream"], true);
    }

    #[test]
    fn chunks_accumulate_text() {
        let mut parser = ChunkParser::default();
        let first = r#"{"choices":[{"delta":{"role":"assistant","content":""}}]}"#;
        assert_eq!(parser.feed(first).unwrap(), Delta::Skip);
        let second = r#"{"choices":[{"delta":{"content":"Why did"}}]}"#;
        assert_eq!(parser.feed(second).unwrap(), Delta::Text("Why did".into()));
        let third = r#"{"choices":[{"delta":{"content":" the cone melt?"}}]}"#;
        assert_eq!(parser.feed(third).unwrap(), Delta::Text(" the cone melt?".into()));
        assert_eq!(parser.feed("[DONE]").unwrap(), Delta::End);
        assert_eq!(
            parser.finish().unwrap(),
            LlmResponse::text("Why did the cone melt?")
        );
    }

    #[test]
    fn chunked_tool_call_is_reassembled() {
        let mut parser = ChunkParser::default();
        let chunks = [
            r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"id":"call_1","type":"function","function":{"name":"calculator","arguments":""}}]}}]}"#,
            r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":"{\"expression\":"}}]}}]}"#,
            r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":"\"3+5\"}"}}]}}]}"#,
            r#"{"choices":[{"delta":{},"finish_reason":"tool_calls"}]}"#,
        ];
        for chunk in chunks {
            assert_eq!(parser.feed(chunk).unwrap(), Delta::Skip);
        }
        let resp = parser.finish().unwrap();
        assert_eq!(resp.content, "");
        assert_eq!(
            resp.tool_calls,
            vec![ToolCall::new("call_1", "calculator", json!({"expression": "3+5"}))]
        );
    }

    #[test]
    fn error_chunk_is_api_error() {
        let mut parser = ChunkParser::default();
        let err = parser
            .feed(r#"{"error":{"message":"overloaded"}}"#)
            .unwrap_err();
        assert!(matches!(err, LlmError::Api(m) if m.contains("overloaded")));
    }

    #[test]
    fn empty_choices_is_parse_error() {
        let err = parse_response(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, LlmError::Parsing(_)));
    }
}
