//! Message types for the conversation transcript.
//!
//! One tagged variant per kind of entry the agent loop produces: system
//! prompt, human text, model text, model tool-request list and tool result.
//! Used by `Transcript`, by `LlmClient::invoke` and by the agent nodes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single tool invocation requested by the model.
///
/// `id` is assigned by the provider and echoed back in the matching
/// `ToolResult::call_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned request id.
    pub id: String,
    /// Registered tool name.
    pub name: String,
    /// Parsed JSON arguments (an object for every built-in tool).
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Result of executing one tool call, keyed to the originating request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Id of the `ToolCall` this result answers.
    pub call_id: String,
    /// Name of the tool that produced it.
    pub name: String,
    /// Human-readable result text.
    pub content: String,
}

/// A single entry in the conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// System prompt; typically placed first.
    System(String),
    /// Human input.
    User(String),
    /// Model reply without tool requests.
    Assistant(String),
    /// Model reply carrying one or more tool requests. `content` may be empty.
    ToolCalls {
        content: String,
        calls: Vec<ToolCall>,
    },
    /// Output of one tool request.
    Tool(ToolResult),
}

impl Message {
    /// Builds a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::System(content.into())
    }

    /// Builds a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User(content.into())
    }

    /// Builds an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant(content.into())
    }

    /// Builds a tool-result message.
    pub fn tool(
        call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::Tool(ToolResult {
            call_id: call_id.into(),
            name: name.into(),
            content: content.into(),
        })
    }

    /// Pending tool requests; empty for every variant but `ToolCalls`.
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Self::ToolCalls { calls, .. } => calls,
            _ => &[],
        }
    }

    /// Textual content of the message.
    pub fn text(&self) -> &str {
        match self {
            Self::System(s) | Self::User(s) | Self::Assistant(s) => s,
            Self::ToolCalls { content, .. } => content,
            Self::Tool(r) => &r.content,
        }
    }

    /// Short role label used by console output and logs.
    pub fn role(&self) -> &'static str {
        match self {
            Self::System(_) => "system",
            Self::User(_) => "user",
            Self::Assistant(_) | Self::ToolCalls { .. } => "assistant",
            Self::Tool(_) => "tool",
        }
    }
}
