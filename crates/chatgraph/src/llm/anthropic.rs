//! Anthropic Messages API client.
//!
//! System messages are hoisted into the top-level `system` field; tool
//! requests become `tool_use` blocks and tool results `tool_result` blocks
//! inside a user turn, consecutive results sharing one turn. Streaming reads
//! `content_block_delta` events until `message_stop`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::llm::stream::{sse_chat, Delta, DeltaParser};
use crate::llm::{ChatStream, LlmClient, LlmError, LlmResponse};
use crate::message::{Message, ToolCall};
use crate::tool::ToolSpec;

pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key, usually from `ANTHROPIC_API_KEY`.
    pub api_key: String,
    pub base_url: String,
    /// Model id, e.g. `claude-3-5-sonnet-latest`.
    pub model: String,
    pub max_tokens: u32,
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: ANTHROPIC_API_BASE.to_string(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
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
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: Vec<Block>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Block {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Serialize)]
struct WireTool<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    input_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    content: Vec<Block>,
}

/// Server-sent event payload; the `type` field names the event.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SseEvent {
    ContentBlockStart { index: usize, content_block: Block },
    ContentBlockDelta { index: usize, delta: BlockDelta },
    MessageStop,
    Error { error: Value },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum BlockDelta {
    TextDelta { text: String },
    InputJsonDelta { partial_json: String },
    #[serde(other)]
    Other,
}

#[derive(Debug)]
struct PartialToolUse {
    id: String,
    name: String,
    input: Value,
    json: String,
}

/// Accumulates Messages API stream events, keyed by content block index.
#[derive(Debug, Default)]
struct EventParser {
    content: String,
    tools: BTreeMap<usize, PartialToolUse>,
}

impl DeltaParser for EventParser {
    fn feed(&mut self, data: &str) -> Result<Delta, LlmError> {
        let event: SseEvent =
            serde_json::from_str(data).map_err(|e| LlmError::Parsing(format!("{e}: {data}")))?;
        match event {
            SseEvent::ContentBlockStart {
                index,
                content_block: Block::ToolUse { id, name, input },
            } => {
                self.tools.insert(
                    index,
                    PartialToolUse {
                        id,
                        name,
                        input,
                        json: String::new(),
                    },
                );
                Ok(Delta::Skip)
            }
            SseEvent::ContentBlockDelta {
                delta: BlockDelta::TextDelta { text },
                ..
            } => {
                self.content.push_str(&text);
                Ok(Delta::Text(text))
            }
            SseEvent::ContentBlockDelta {
                index,
                delta: BlockDelta::InputJsonDelta { partial_json },
            } => {
                if let Some(tool) = self.tools.get_mut(&index) {
                    tool.json.push_str(&partial_json);
                }
                Ok(Delta::Skip)
            }
            SseEvent::MessageStop => Ok(Delta::End),
            SseEvent::Error { error } => Err(LlmError::Api(error.to_string())),
            _ => Ok(Delta::Skip),
        }
    }

    fn finish(&mut self) -> Result<LlmResponse, LlmError> {
        let tool_calls = std::mem::take(&mut self.tools)
            .into_values()
            .map(|t| {
                let arguments = if t.json.trim().is_empty() {
                    t.input
                } else {
                    serde_json::from_str(&t.json).map_err(|e| {
                        LlmError::Parsing(format!("tool input {:?}: {e}", t.json))
                    })?
                };
                Ok(ToolCall {
                    id: t.id,
                    name: t.name,
                    arguments,
                })
            })
            .collect::<Result<Vec<_>, LlmError>>()?;
        Ok(LlmResponse {
            content: std::mem::take(&mut self.content),
            tool_calls,
        })
    }
}

/// Splits the transcript into the `system` text and alternating turns.
fn to_wire(messages: &[Message]) -> (Option<String>, Vec<WireMessage>) {
    let mut system: Vec<&str> = Vec::new();
    let mut out: Vec<WireMessage> = Vec::new();
    for m in messages {
        match m {
            Message::System(s) => system.push(s),
            Message::User(s) => out.push(WireMessage {
                role: "user",
                content: vec![Block::Text { text: s.clone() }],
            }),
            Message::Assistant(s) => out.push(WireMessage {
                role: "assistant",
                content: vec![Block::Text { text: s.clone() }],
            }),
            Message::ToolCalls { content, calls } => {
                let mut blocks = Vec::with_capacity(calls.len() + 1);
                if !content.is_empty() {
                    blocks.push(Block::Text {
                        text: content.clone(),
                    });
                }
                blocks.extend(calls.iter().map(|c| Block::ToolUse {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    input: c.arguments.clone(),
                }));
                out.push(WireMessage {
                    role: "assistant",
                    content: blocks,
                });
            }
            Message::Tool(r) => {
                let block = Block::ToolResult {
                    tool_use_id: r.call_id.clone(),
                    content: r.content.clone(),
                };
                match out.last_mut() {
                    Some(last)
                        if last.role == "user"
                            && matches!(last.content.first(), Some(Block::ToolResult { .. })) =>
                    {
                        last.content.push(block)
                    }
                    _ => out.push(WireMessage {
                        role: "user",
                        content: vec![block],
                    }),
                }
            }
        }
    }
    let system = (!system.is_empty()).then(|| system.join("\n\n"));
    (system, out)
}

fn parse_response(text: &str) -> Result<LlmResponse, LlmError> {
    let parsed: ResponseBody =
        serde_json::from_str(text).map_err(|e| LlmError::Parsing(format!("{e}: {text}")))?;
    let mut content = String::new();
    let mut tool_calls = Vec::new();
    for block in parsed.content {
        match block {
            Block::Text { text } => content.push_str(&text),
            Block::ToolUse { id, name, input } => tool_calls.push(ToolCall {
                id,
                name,
                arguments: input,
            }),
            Block::ToolResult { .. } | Block::Other => {}
        }
    }
    Ok(LlmResponse {
        content,
        tool_calls,
    })
}

/// Messages API client implementing `LlmClient`.
#[derive(Debug)]
pub struct ChatAnthropic {
    config: AnthropicConfig,
    tools: Vec<ToolSpec>,
    client: reqwest::Client,
}

impl ChatAnthropic {
    pub fn with_config(config: AnthropicConfig) -> Self {
        Self {
            config,
            tools: Vec::new(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    fn build_body<'a>(&'a self, messages: &[Message]) -> RequestBody<'a> {
        let (system, messages) = to_wire(messages);
        RequestBody {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system,
            messages,
            tools: self
                .tools
                .iter()
                .map(|t| WireTool {
                    name: &t.name,
                    description: t.description.as_deref(),
                    input_schema: &t.input_schema,
                })
                .collect(),
            stream: false,
        }
    }

    async fn send(&self, body: &RequestBody<'_>) -> Result<reqwest::Response, LlmError> {
        let url = format!("{}/messages", self.config.base_url);
        let res = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(body)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let text = res.text().await?;
            warn!(status = status.as_u16(), "messages request failed");
            return Err(LlmError::from_status(status.as_u16(), text));
        }
        Ok(res)
    }
}

#[async_trait]
impl LlmClient for ChatAnthropic {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError> {
        let body = self.build_body(messages);
        debug!(model = %self.config.model, messages = messages.len(), "messages request");
        let text = self.send(&body).await?.text().await?;
        parse_response(&text)
    }

    fn stream<'a>(&'a self, messages: &'a [Message]) -> ChatStream<'a> {
        let request = async move {
            let mut body = self.build_body(messages);
            body.stream = true;
            debug!(model = %self.config.model, messages = messages.len(), "messages stream");
            self.send(&body).await
        };
        sse_chat(request, EventParser::default())
    }
}
