//! Router: continue to the tool dispatcher or terminate.

use crate::graph::END;
use crate::message::Message;

use super::ChatState;

/// Node id of the Model Caller in the agent graph.
pub const CHATBOT_NODE: &str = "chatbot";
/// Node id of the Tool Dispatcher in the agent graph.
pub const TOOLS_NODE: &str = "tools";

/// Routing decision after a model turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Tools,
    End,
}

/// `Route::Tools` iff the latest message carries at least one tool request.
pub fn route_tools(last: Option<&Message>) -> Route {
    match last {
        Some(m) if !m.tool_calls().is_empty() => Route::Tools,
        _ => Route::End,
    }
}

/// Conditional-edge adapter: `"tools"` or `END`.
pub fn tools_condition(state: &ChatState) -> String {
    match route_tools(state.last_message()) {
        Route::Tools => TOOLS_NODE.to_string(),
        Route::End => END.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ToolCall;
    use serde_json::json;

    #[test]
    fn empty_transcript_ends() {
        assert_eq!(route_tools(None), Route::End);
    }

    #[test]
    fn text_messages_end() {
        assert_eq!(route_tools(Some(&Message::assistant("hi"))), Route::End);
        assert_eq!(route_tools(Some(&Message::user("hi"))), Route::End);
        assert_eq!(route_tools(Some(&Message::tool("c1", "t", "x"))), Route::End);
    }

    #[test]
    fn empty_request_list_ends() {
        let m = Message::ToolCalls {
            content: "thinking".into(),
            calls: vec![],
        };
        assert_eq!(route_tools(Some(&m)), Route::End);
    }

    #[test]
    fn pending_requests_go_to_tools() {
        let m = Message::ToolCalls {
            content: String::new(),
            calls: vec![ToolCall::new("c1", "get_time", json!({}))],
        };
        assert_eq!(route_tools(Some(&m)), Route::Tools);
    }

    #[test]
    fn condition_maps_to_node_ids() {
        let mut state = ChatState::new("hi");
        assert_eq!(tools_condition(&state), END);
        state
            .transcript
            .push(Message::ToolCalls {
                content: String::new(),
                calls: vec![ToolCall::new("c1", "get_time", json!({}))],
            })
            .unwrap();
        assert_eq!(tools_condition(&state), TOOLS_NODE);
    }
}
