//! Tool Dispatcher node: run every pending tool request, append the results.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::error::{AgentError, TranscriptError};
use crate::graph::{Next, Node};
use crate::message::Message;
use crate::tool::ToolRegistry;
use crate::transcript::Transcript;

use super::router::TOOLS_NODE;
use super::ChatState;

/// Text appended for one tool result: `Tool '<name>' returned: <pretty JSON>`.
pub fn format_tool_output(name: &str, value: &Value) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    format!("Tool '{name}' returned: {pretty}")
}

/// Executes the tool requests of the latest message strictly in request order,
/// one at a time, and appends one `Tool` message per request.
///
/// Fails with `AgentError::EmptyInput` when the latest message carries no
/// requests, and with `TranscriptError::DuplicateResult` before running
/// anything when two requests share an id. The first failing tool fails the
/// whole dispatch and nothing is appended.
pub struct ToolNode {
    tools: Arc<ToolRegistry>,
}

impl ToolNode {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }

    /// Runs the pending requests and returns the result messages in order.
    pub async fn dispatch(&self, transcript: &Transcript) -> Result<Vec<Message>, AgentError> {
        let calls = transcript.last().map(Message::tool_calls).unwrap_or_default();
        if calls.is_empty() {
            return Err(AgentError::EmptyInput);
        }
        let mut ids = HashSet::with_capacity(calls.len());
        if let Some(repeated) = calls.iter().find(|c| !ids.insert(c.id.as_str())) {
            return Err(TranscriptError::DuplicateResult(repeated.id.clone()).into());
        }
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            info!(tool = %call.name, id = %call.id, "invoking tool");
            let value = self
                .tools
                .execute(&call.name, call.arguments.clone())
                .await?;
            results.push(Message::tool(
                call.id.as_str(),
                call.name.as_str(),
                format_tool_output(&call.name, &value),
            ));
        }
        Ok(results)
    }
}

#[async_trait]
impl Node<ChatState> for ToolNode {
    fn id(&self) -> &str {
        TOOLS_NODE
    }

    async fn run(&self, mut state: ChatState) -> Result<(ChatState, Next), AgentError> {
        let results = self.dispatch(&state.transcript).await?;
        state.transcript.extend(results)?;
        Ok((state, Next::Continue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn output_is_pretty_printed() {
        let s = format_tool_output("calculator", &json!({"result": 8}));
        assert_eq!(s, "Tool 'calculator' returned: {\n  \"result\": 8\n}");
    }

    #[test]
    fn scalar_output() {
        assert_eq!(
            format_tool_output("calculator", &json!(8)),
            "Tool 'calculator' returned: 8"
        );
    }
}
