//! Joke graph: `START → call_model`, state `{ topic, joke }`.
//!
//! The node streams the model call; `stream_joke` hands the text chunks out
//! while the graph runs.

use std::sync::Arc;

use async_trait::async_trait;
use chatgraph::{
    AgentError, ChatStreamEvent, CompilationError, CompiledStateGraph, LlmClient, Message, Next,
    Node, StateGraph, START,
};
use futures::channel::mpsc;
use futures::stream::{self, BoxStream, StreamExt};

/// Node id of the joke step.
pub const JOKE_NODE: &str = "call_model";
/// Topic used by `chatbot joke` without an argument.
pub const DEFAULT_TOPIC: &str = "ice cream";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct JokeState {
    pub topic: String,
    pub joke: String,
}

impl JokeState {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            joke: String::new(),
        }
    }
}

/// Prompt sent for `topic`.
pub fn joke_prompt(topic: &str) -> String {
    format!("Generate a joke about {topic}")
}

/// Calls the model to generate a joke about the state's topic.
///
/// With a chunk sender attached, every text chunk is forwarded as it arrives.
pub struct JokeNode {
    llm: Arc<dyn LlmClient>,
    chunks: Option<mpsc::UnboundedSender<String>>,
}

impl JokeNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm, chunks: None }
    }

    pub fn with_chunks(mut self, chunks: mpsc::UnboundedSender<String>) -> Self {
        self.chunks = Some(chunks);
        self
    }
}

#[async_trait]
impl Node<JokeState> for JokeNode {
    fn id(&self) -> &str {
        JOKE_NODE
    }

    async fn run(&self, mut state: JokeState) -> Result<(JokeState, Next), AgentError> {
        let prompt = [Message::user(joke_prompt(&state.topic))];
        let mut events = self.llm.stream(&prompt);
        let mut joke = String::new();
        while let Some(event) = events.next().await {
            match event? {
                ChatStreamEvent::Token(chunk) => {
                    joke.push_str(&chunk);
                    if let Some(tx) = &self.chunks {
                        // Ignored once the receiver is gone.
                        let _ = tx.unbounded_send(chunk);
                    }
                }
                ChatStreamEvent::Done(response) => joke = response.content,
            }
        }
        state.joke = joke;
        Ok((state, Next::End))
    }
}

fn compile(node: JokeNode) -> Result<CompiledStateGraph<JokeState>, CompilationError> {
    let mut graph = StateGraph::<JokeState>::new();
    graph
        .add_node(JOKE_NODE, Arc::new(node))
        .add_edge(START, JOKE_NODE);
    graph.compile()
}

/// Compiles the joke graph around `llm`.
pub fn joke_graph(
    llm: Arc<dyn LlmClient>,
) -> Result<CompiledStateGraph<JokeState>, CompilationError> {
    compile(JokeNode::new(llm))
}

/// Runs the joke graph for `topic` and returns the joke.
pub async fn tell_joke(llm: Arc<dyn LlmClient>, topic: &str) -> Result<String, AgentError> {
    let state = joke_graph(llm)?.invoke(JokeState::new(topic)).await?;
    Ok(state.joke)
}

/// Runs the joke graph for `topic`, yielding the joke chunk by chunk.
///
/// A failed run shows up as one `Err` item; the stream ends with the run.
pub fn stream_joke(
    llm: Arc<dyn LlmClient>,
    topic: &str,
) -> BoxStream<'static, Result<String, AgentError>> {
    let (tx, rx) = mpsc::unbounded();
    let state = JokeState::new(topic);
    let run = async move {
        let graph = compile(JokeNode::new(llm).with_chunks(tx))?;
        graph.invoke(state).await?;
        Ok::<(), AgentError>(())
    };
    // The sender lives in the graph, so `rx` ends once the run finishes.
    let failure = stream::once(run).filter_map(|res| async move { res.err().map(Err) });
    stream::select(rx.map(Ok), failure).boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatgraph::{LlmError, MockLlm};

    #[tokio::test]
    async fn ice_cream_joke_is_not_empty() {
        let llm = Arc::new(MockLlm::with_no_tool_calls(
            "Why did the ice cream truck break down? It had a rocky road.",
        ));
        let joke = tell_joke(llm.clone(), DEFAULT_TOPIC).await.unwrap();
        assert!(!joke.is_empty());
        assert_eq!(
            llm.requests()[0],
            vec![Message::user("Generate a joke about ice cream")]
        );
    }

    #[tokio::test]
    async fn echo_model_returns_prompt() {
        let joke = tell_joke(Arc::new(MockLlm::echo()), "cats").await.unwrap();
        assert_eq!(joke, "Generate a joke about cats");
    }

    #[tokio::test]
    async fn ice_cream_joke_streams_in_chunks() {
        let text = "Why did the ice cream truck break down? It had a rocky road.";
        let llm = Arc::new(MockLlm::with_no_tool_calls(text));
        let chunks: Vec<String> = stream_joke(llm.clone(), DEFAULT_TOPIC)
            .map(|c| c.unwrap())
            .collect()
            .await;
        assert!(chunks.len() > 1, "{chunks:?}");
        assert!(chunks.iter().all(|c| !c.is_empty()));
        assert_eq!(chunks.concat(), text);
        assert_eq!(
            llm.requests()[0],
            vec![Message::user("Generate a joke about ice cream")]
        );
    }

    #[tokio::test]
    async fn streamed_joke_failure_is_last_item() {
        let llm = Arc::new(MockLlm::failing(LlmError::Network("offline".into())));
        let items: Vec<_> = stream_joke(llm, DEFAULT_TOPIC).collect().await;
        assert_eq!(items.len(), 1);
        assert!(matches!(&items[0], Err(AgentError::Llm(LlmError::Network(_)))));
    }

    #[tokio::test]
    async fn model_error_propagates() {
        let llm = Arc::new(MockLlm::failing(LlmError::Auth("bad key".into())));
        let err = tell_joke(llm, DEFAULT_TOPIC).await.unwrap_err();
        assert!(matches!(err, AgentError::Llm(LlmError::Auth(_))));
    }
}
