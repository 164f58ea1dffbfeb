//! Explicit dependencies of an agent run.

use std::sync::Arc;

use crate::error::AgentError;
use crate::graph::{CompiledStateGraph, StateGraph, DEFAULT_RECURSION_LIMIT, END, START};
use crate::llm::LlmClient;
use crate::tool::ToolRegistry;

use super::router::{tools_condition, CHATBOT_NODE, TOOLS_NODE};
use super::{ChatState, ModelNode, ToolNode};

/// Model client plus tool registry, handed to the nodes that need them.
///
/// The registry is fixed for the life of the context; the client should have
/// the registry's `specs()` bound so the model knows which tools exist.
#[derive(Clone)]
pub struct AgentContext {
    pub llm: Arc<dyn LlmClient>,
    pub tools: Arc<ToolRegistry>,
    pub system_prompt: Option<String>,
    pub recursion_limit: usize,
}

impl AgentContext {
    pub fn new(llm: Arc<dyn LlmClient>, tools: ToolRegistry) -> Self {
        Self {
            llm,
            tools: Arc::new(tools),
            system_prompt: None,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Compiles `START → chatbot → {tools → chatbot | END}`.
    pub fn tool_agent(&self) -> Result<CompiledStateGraph<ChatState>, AgentError> {
        let mut model = ModelNode::new(self.llm.clone());
        if let Some(prompt) = &self.system_prompt {
            model = model.with_system_prompt(prompt.as_str());
        }

        let mut graph = StateGraph::<ChatState>::new();
        graph
            .add_node(CHATBOT_NODE, Arc::new(model))
            .add_node(TOOLS_NODE, Arc::new(ToolNode::new(self.tools.clone())))
            .add_edge(START, CHATBOT_NODE)
            .add_conditional_edges(
                CHATBOT_NODE,
                tools_condition,
                [(TOOLS_NODE, TOOLS_NODE), (END, END)],
            )
            .add_edge(TOOLS_NODE, CHATBOT_NODE);
        Ok(graph.compile()?.with_recursion_limit(self.recursion_limit))
    }

    /// Runs the loop for one question and returns the final state.
    pub async fn run(&self, question: &str) -> Result<ChatState, AgentError> {
        self.tool_agent()?.invoke(ChatState::new(question)).await
    }
}
