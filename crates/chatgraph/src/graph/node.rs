//! Graph node trait: one step in a StateGraph.

use async_trait::async_trait;

use crate::error::AgentError;

use super::Next;

/// One step in a graph: state in, (state out, next step).
///
/// The runner uses `Next` to choose what runs afterwards; most nodes return
/// `Next::Continue` and leave routing to the graph's edges.
///
/// **Interaction**: Registered through `StateGraph::add_node`; run by
/// `CompiledStateGraph::invoke` and `CompiledStateGraph::stream`.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    /// Node id (e.g. `"model"`, `"tools"`). Used in logs and stream events.
    fn id(&self) -> &str;

    async fn run(&self, state: S) -> Result<(S, Next), AgentError>;
}
