//! Compiled state graph: immutable, supports invoke and stream.
//!
//! Built by `StateGraph::compile`. Starts at the target of the `START` edge and
//! follows each node's outgoing edge (or the node's own `Next`) until `END`.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use tracing::debug;

use crate::error::AgentError;

use super::state_graph::{Edge, END, START};
use super::stream::{StreamEvent, StreamMode};
use super::{Next, Node};

/// Maximum node executions per run unless overridden.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// Compiled graph: immutable structure.
///
/// **Interaction**: Built from `StateGraph`; callers use `invoke(state)` to run
/// to completion or `stream(state, mode)` to observe every step.
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(super) node_order: Vec<String>,
    pub(super) edges: HashMap<String, Edge<S>>,
    pub(super) recursion_limit: usize,
}

/// Position of a streaming run between yields.
enum Cursor<S> {
    Start(S),
    Running { state: S, node: String, steps: usize },
    Finished,
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Sets the maximum number of node executions per run.
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    /// Runs the graph to completion and returns the final state.
    pub async fn invoke(&self, state: S) -> Result<S, AgentError> {
        let mut state = state;
        let mut current = self.follow(START, &state)?;
        let mut steps = 0;
        while let Some(node) = current {
            let (new_state, next) = self.step(&node, state, steps).await?;
            state = new_state;
            steps += 1;
            current = next;
        }
        Ok(state)
    }

    /// Runs the graph, yielding an event after every node.
    ///
    /// `StreamMode::Updates` yields `(node, state)` after each node;
    /// `StreamMode::Values` yields the initial state, then the state after each node.
    /// The stream ends after `END` or after the first error.
    pub fn stream(
        &self,
        state: S,
        mode: StreamMode,
    ) -> BoxStream<'_, Result<StreamEvent<S>, AgentError>> {
        stream::unfold(Cursor::Start(state), move |cursor| async move {
            match cursor {
                Cursor::Finished => None,
                Cursor::Start(state) => {
                    let entry = match self.follow(START, &state) {
                        Ok(entry) => entry,
                        Err(e) => return Some((Err(e), Cursor::Finished)),
                    };
                    match (mode, entry) {
                        (StreamMode::Values, entry) => {
                            let event = StreamEvent::Values(state.clone());
                            let cursor = match entry {
                                Some(node) => Cursor::Running {
                                    state,
                                    node,
                                    steps: 0,
                                },
                                None => Cursor::Finished,
                            };
                            Some((Ok(event), cursor))
                        }
                        (StreamMode::Updates, Some(node)) => {
                            Some(self.stream_step(node, state, 0, mode).await)
                        }
                        (StreamMode::Updates, None) => None,
                    }
                }
                Cursor::Running { state, node, steps } => {
                    Some(self.stream_step(node, state, steps, mode).await)
                }
            }
        })
        .boxed()
    }

    async fn stream_step(
        &self,
        node: String,
        state: S,
        steps: usize,
        mode: StreamMode,
    ) -> (Result<StreamEvent<S>, AgentError>, Cursor<S>) {
        match self.step(&node, state, steps).await {
            Err(e) => (Err(e), Cursor::Finished),
            Ok((state, next)) => {
                let event = match mode {
                    StreamMode::Updates => StreamEvent::Updates {
                        node,
                        state: state.clone(),
                    },
                    StreamMode::Values => StreamEvent::Values(state.clone()),
                };
                let cursor = match next {
                    Some(node) => Cursor::Running {
                        state,
                        node,
                        steps: steps + 1,
                    },
                    None => Cursor::Finished,
                };
                (Ok(event), cursor)
            }
        }
    }

    /// Runs one node and resolves where to go next (`None` = END).
    async fn step(
        &self,
        id: &str,
        state: S,
        steps: usize,
    ) -> Result<(S, Option<String>), AgentError> {
        if steps >= self.recursion_limit {
            return Err(AgentError::RecursionLimit(self.recursion_limit));
        }
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| AgentError::ExecutionFailed(format!("unknown node: {id}")))?;
        debug!(node = id, step = steps, "running node");
        let (state, next) = node.run(state).await?;
        let target = match next {
            Next::End => None,
            Next::Node(target) => self.resolve(target)?,
            Next::Continue => self.follow(id, &state)?,
        };
        debug!(node = id, next = target.as_deref().unwrap_or(END), "node finished");
        Ok((state, target))
    }

    /// Follows the outgoing edge of `from`; no edge means END.
    fn follow(&self, from: &str, state: &S) -> Result<Option<String>, AgentError> {
        match self.edges.get(from) {
            None => Ok(None),
            Some(Edge::To(target)) => self.resolve(target.clone()),
            Some(Edge::Conditional { router, path_map }) => {
                let key = router(state);
                let target = path_map.get(&key).cloned().unwrap_or(key);
                self.resolve(target)
            }
        }
    }

    fn resolve(&self, target: String) -> Result<Option<String>, AgentError> {
        if target == END {
            Ok(None)
        } else if self.nodes.contains_key(&target) {
            Ok(Some(target))
        } else {
            Err(AgentError::ExecutionFailed(format!(
                "route to unknown node: {target}"
            )))
        }
    }

    /// Renders the graph as a Mermaid flowchart.
    ///
    /// Plain edges are solid arrows; conditional branches are dotted arrows
    /// labelled with the router key.
    pub fn draw_mermaid(&self) -> String {
        let mut out = String::from("graph TD;\n");
        out.push_str(&format!("\t{START}([<p>{START}</p>]):::first\n"));
        for id in &self.node_order {
            out.push_str(&format!("\t{id}({id})\n"));
        }
        out.push_str(&format!("\t{END}([<p>{END}</p>]):::last\n"));

        let sources = std::iter::once(START).chain(self.node_order.iter().map(String::as_str));
        for from in sources {
            match self.edges.get(from) {
                None => {}
                Some(Edge::To(to)) => out.push_str(&format!("\t{from} --> {to};\n")),
                Some(Edge::Conditional { path_map, .. }) => {
                    for (key, to) in path_map {
                        if key == to {
                            out.push_str(&format!("\t{from} -.-> {to};\n"));
                        } else {
                            out.push_str(&format!("\t{from} -.->|{key}| {to};\n"));
                        }
                    }
                }
            }
        }
        out.push_str("\tclassDef default fill:#f2f0ff,line-height:1.2\n");
        out.push_str("\tclassDef first fill-opacity:0\n");
        out.push_str("\tclassDef last fill:#bfb6fc\n");
        out
    }
}
