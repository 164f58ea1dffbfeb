//! Model Caller node: send the transcript, append the model's reply.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::LlmClient;
use crate::message::Message;

use super::router::CHATBOT_NODE;
use super::ChatState;

/// Calls the model with the full transcript and appends exactly one message:
/// `ToolCalls` when the reply requests tools, else `Assistant`.
///
/// An optional system prompt is prepended to every request without being
/// stored in the transcript. Provider errors propagate as `AgentError::Llm`.
pub struct ModelNode {
    llm: Arc<dyn LlmClient>,
    system_prompt: Option<String>,
}

impl ModelNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            system_prompt: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}

#[async_trait]
impl Node<ChatState> for ModelNode {
    fn id(&self) -> &str {
        CHATBOT_NODE
    }

    async fn run(&self, mut state: ChatState) -> Result<(ChatState, Next), AgentError> {
        let response = match &self.system_prompt {
            Some(prompt) => {
                let mut messages = Vec::with_capacity(state.transcript.len() + 1);
                messages.push(Message::system(prompt.as_str()));
                messages.extend(state.transcript.iter().cloned());
                self.llm.invoke(&messages).await?
            }
            None => self.llm.invoke(state.transcript.messages()).await?,
        };
        debug!(
            tool_calls = response.tool_calls.len(),
            chars = response.content.len(),
            "model replied"
        );
        state.transcript.push(response.into_message())?;
        Ok((state, Next::Continue))
    }
}
