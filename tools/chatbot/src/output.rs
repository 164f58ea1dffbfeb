//! Console lines for streamed graph updates.
//!
//! **Interaction**: Used by `repl` for the agent loop and by `main` for the
//! answer graph. Single source of truth for the `Assistant: ` layout.

use chatgraph::Message;

use crate::answer::AnswerState;

/// Shown when an update carries no message at all.
pub const NO_CONTENT: &str = "[No content]";

/// `Assistant: <text of the latest message>`.
pub fn format_update(last: Option<&Message>) -> String {
    let text = last.map(Message::text).unwrap_or(NO_CONTENT);
    format!("Assistant: {text}")
}

/// `<node>: <latest reply>` for one answer-graph update.
pub fn format_answer_update(node: &str, state: &AnswerState) -> String {
    let text = state.messages.last().map(String::as_str).unwrap_or(NO_CONTENT);
    format!("{node}: {text}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatgraph::{LlmResponse, ToolCall};
    use serde_json::json;

    #[test]
    fn update_prints_latest_text() {
        let m = Message::assistant("Seven continents.");
        assert_eq!(format_update(Some(&m)), "Assistant: Seven continents.");
    }

    #[test]
    fn tool_request_without_text_prints_empty() {
        let m = LlmResponse::with_tool_calls("", vec![ToolCall::new("c1", "get_time", json!({}))])
            .into_message();
        assert_eq!(format_update(Some(&m)), "Assistant: ");
    }

    #[test]
    fn missing_message_prints_placeholder() {
        assert_eq!(format_update(None), "Assistant: [No content]");
    }

    #[test]
    fn answer_update_uses_node_name() {
        let mut state = AnswerState::new("q");
        assert_eq!(format_answer_update("AI-ANSWER", &state), "AI-ANSWER: [No content]");
        state.messages.push("Seven.".into());
        assert_eq!(format_answer_update("AI-ANSWER", &state), "AI-ANSWER: Seven.");
    }
}
