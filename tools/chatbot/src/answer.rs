//! Single-node answer graph: `START → AI-ANSWER → END`.
//!
//! The node sends the question alone (no history, no tools) and records the
//! reply text.

use std::sync::Arc;

use async_trait::async_trait;
use chatgraph::{
    AgentError, CompilationError, CompiledStateGraph, LlmClient, Message, Next, Node, StateGraph,
    END, START,
};
use tracing::debug;

/// Node id of the answer step.
pub const ANSWER_NODE: &str = "AI-ANSWER";
/// Question asked by `chatbot ask` without an argument.
pub const DEFAULT_QUESTION: &str = "How many continents are there in the World";

/// State of the answer graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnswerState {
    pub user_question: String,
    /// Reply texts, oldest first.
    pub messages: Vec<String>,
}

impl AnswerState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            user_question: question.into(),
            messages: Vec::new(),
        }
    }
}

/// Asks the model `user_question` and appends the reply text.
pub struct AnswerNode {
    llm: Arc<dyn LlmClient>,
}

impl AnswerNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Node<AnswerState> for AnswerNode {
    fn id(&self) -> &str {
        ANSWER_NODE
    }

    async fn run(&self, mut state: AnswerState) -> Result<(AnswerState, Next), AgentError> {
        let response = self
            .llm
            .invoke(&[Message::user(state.user_question.as_str())])
            .await?;
        debug!(chars = response.content.len(), "answer received");
        state.messages.push(response.content);
        Ok((state, Next::Continue))
    }
}

/// Compiles the answer graph around `llm`.
pub fn answer_graph(
    llm: Arc<dyn LlmClient>,
) -> Result<CompiledStateGraph<AnswerState>, CompilationError> {
    let mut graph = StateGraph::<AnswerState>::new();
    graph
        .add_node(ANSWER_NODE, Arc::new(AnswerNode::new(llm)))
        .add_edge(START, ANSWER_NODE)
        .add_edge(ANSWER_NODE, END);
    graph.compile()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatgraph::MockLlm;

    #[tokio::test]
    async fn answer_records_reply() {
        let llm = Arc::new(MockLlm::with_no_tool_calls("Seven."));
        let graph = answer_graph(llm.clone()).unwrap();
        let out = graph.invoke(AnswerState::new(DEFAULT_QUESTION)).await.unwrap();
        assert_eq!(out.messages, vec!["Seven."]);
        assert_eq!(llm.requests()[0], vec![Message::user(DEFAULT_QUESTION)]);
    }

    #[test]
    fn mermaid_shows_single_node() {
        let graph = answer_graph(Arc::new(MockLlm::echo())).unwrap();
        let mermaid = graph.draw_mermaid();
        assert!(mermaid.contains("\t__start__ --> AI-ANSWER;\n"));
        assert!(mermaid.contains("\tAI-ANSWER --> __end__;\n"));
    }
}
