//! LLM clients: the Model Caller's view of a hosted text-generation service.
//!
//! - `LlmClient`: async call, transcript in, one response out; `stream` for
//!   the same call chunk by chunk
//! - `LlmResponse`: text plus optional tool requests
//! - `MockLlm`: scripted responses for tests
//! - `ChatOpenAI` / `ChatAnthropic`: HTTP clients for hosted providers
//! - `init_chat_model`: builds a client from a `provider:model` string

mod anthropic;
mod error;
mod init;
mod mock;
mod openai;
mod stream;

pub use anthropic::{AnthropicConfig, ChatAnthropic};
pub use error::LlmError;
pub use init::{init_chat_model, ModelSpec, Provider, ProviderConfig};
pub use mock::MockLlm;
pub use openai::{ChatOpenAI, OpenAiConfig};
pub use stream::{ChatStream, ChatStreamEvent};

use async_trait::async_trait;
use futures::stream::{self as futures_stream, StreamExt};

use crate::message::{Message, ToolCall};

/// One model turn: assistant text and any tool requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl LlmResponse {
    /// Text-only response.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Response requesting tools.
    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: content.into(),
            tool_calls,
        }
    }

    /// Converts into the transcript message the Model Caller appends.
    pub fn into_message(self) -> Message {
        if self.tool_calls.is_empty() {
            Message::Assistant(self.content)
        } else {
            Message::ToolCalls {
                content: self.content,
                calls: self.tool_calls,
            }
        }
    }
}

/// Async chat-model client.
///
/// **Interaction**: Held by `ModelNode` (through `AgentContext`) and by the
/// single-call nodes of the chatbot; receives the full transcript each turn.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends the ordered transcript, returns one new assistant turn.
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError>;

    /// Same call as `invoke`, delivered as text chunks followed by `Done`.
    ///
    /// The default waits for `invoke` and yields its text as one chunk.
    fn stream<'a>(&'a self, messages: &'a [Message]) -> ChatStream<'a> {
        futures_stream::once(async move {
            match self.invoke(messages).await {
                Ok(response) => stream::whole_response(response),
                Err(e) => vec![Err(e)],
            }
        })
        .flat_map(futures_stream::iter)
        .boxed()
    }
}
