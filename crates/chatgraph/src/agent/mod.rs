//! The conversational agent loop.
//!
//! `START → chatbot → route → { tools → chatbot | END }`
//!
//! - `ChatState`: the question plus the transcript of one run
//! - `ModelNode`: Model Caller, appends one model message
//! - `ToolNode`: Tool Dispatcher, appends one tool result per request
//! - `route_tools` / `tools_condition`: Router
//! - `AgentContext`: model client and tool registry passed to every node

mod context;
mod model_node;
mod router;
mod state;
mod tool_node;

pub use context::AgentContext;
pub use model_node::ModelNode;
pub use router::{route_tools, tools_condition, Route, CHATBOT_NODE, TOOLS_NODE};
pub use state::ChatState;
pub use tool_node::{format_tool_output, ToolNode};
