//! Minimal LangGraph-style state graphs for tool-calling chat agents.
//!
//! A graph is a handful of nodes between `START` and `END`; each node takes the
//! state and returns the updated state. The agent loop built on top alternates
//! between asking the model and running the tools it requested until the model
//! answers without tool requests.

pub mod agent;
pub mod error;
pub mod graph;
pub mod llm;
pub mod message;
pub mod tool;
pub mod transcript;

pub use agent::{
    format_tool_output, route_tools, tools_condition, AgentContext, ChatState, ModelNode, Route,
    ToolNode, CHATBOT_NODE, TOOLS_NODE,
};
pub use error::{AgentError, ToolError, TranscriptError, ValidationError};
pub use graph::{
    CompilationError, CompiledStateGraph, Next, Node, StateGraph, StreamEvent, StreamMode, END,
    START,
};
pub use llm::{
    init_chat_model, ChatStream, ChatStreamEvent, LlmClient, LlmError, LlmResponse, MockLlm,
    ModelSpec, Provider, ProviderConfig,
};
pub use message::{Message, ToolCall, ToolResult};
pub use tool::{
    CalculatorTool, GetTimeTool, TavilyConfig, TavilySearchTool, Tool, ToolRegistry, ToolSpec,
};
pub use transcript::Transcript;
