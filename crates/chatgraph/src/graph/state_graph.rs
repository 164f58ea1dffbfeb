//! State graph builder: nodes, plain edges and conditional edges.
//!
//! Add nodes with `add_node`, wire them with `add_edge` / `add_conditional_edges`
//! using the `START` and `END` sentinels, then `compile` to get a
//! `CompiledStateGraph`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::{CompiledStateGraph, DEFAULT_RECURSION_LIMIT};
use crate::graph::node::Node;

/// Virtual entry node; the target of its edge runs first.
pub const START: &str = "__start__";
/// Virtual exit node; routing here stops the run.
pub const END: &str = "__end__";

/// Router for a conditional edge: inspects the state, returns a branch key.
pub type RouterFn<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// Outgoing edge of a node.
pub(crate) enum Edge<S> {
    /// Always go to this node (or `END`).
    To(String),
    /// Call `router` and map its output through `path_map`.
    Conditional {
        router: RouterFn<S>,
        path_map: BTreeMap<String, String>,
    },
}

impl<S> Edge<S> {
    fn targets(&self) -> Vec<&str> {
        match self {
            Edge::To(t) => vec![t.as_str()],
            Edge::Conditional { path_map, .. } => path_map.values().map(String::as_str).collect(),
        }
    }
}

/// State graph: nodes plus one outgoing edge per node.
///
/// Generic over state type `S`. Mirrors LangGraph's `StateGraph`:
/// `add_node`, `add_edge(START, "model")`, `add_conditional_edges("model", router, map)`.
///
/// **Interaction**: Accepts `Arc<dyn Node<S>>`; produces `CompiledStateGraph<S>`.
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// Insertion order, used for deterministic rendering.
    node_order: Vec<String>,
    edges: Vec<(String, Edge<S>)>,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            node_order: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Adds a node; replaces any node registered under the same id.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        let id = id.into();
        if self.nodes.insert(id.clone(), node).is_none() {
            self.node_order.push(id);
        }
        self
    }

    /// Adds a plain edge `from -> to`. Use `START` / `END` for the entry and exit.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.edges.push((from.into(), Edge::To(to.into())));
        self
    }

    /// Adds a conditional edge leaving `from`.
    ///
    /// After `from` runs, `router(&state)` yields a key which `path_map` maps
    /// to the next node id or `END`.
    pub fn add_conditional_edges<F, I, K, V>(
        &mut self,
        from: impl Into<String>,
        router: F,
        path_map: I,
    ) -> &mut Self
    where
        F: Fn(&S) -> String + Send + Sync + 'static,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let path_map = path_map
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.edges.push((
            from.into(),
            Edge::Conditional {
                router: Arc::new(router),
                path_map,
            },
        ));
        self
    }

    /// Validates the wiring and builds the executable graph.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        for id in &self.node_order {
            if id == START || id == END {
                return Err(CompilationError::ReservedName(id.clone()));
            }
        }

        let mut edges: HashMap<String, Edge<S>> = HashMap::new();
        for (from, edge) in self.edges {
            if from != START && !self.nodes.contains_key(&from) {
                return Err(CompilationError::NodeNotFound(from));
            }
            for target in edge.targets() {
                if target != END && !self.nodes.contains_key(target) {
                    return Err(CompilationError::NodeNotFound(target.to_string()));
                }
            }
            if edges.contains_key(&from) {
                return Err(CompilationError::DuplicateEdge(from));
            }
            edges.insert(from, edge);
        }
        if !edges.contains_key(START) {
            return Err(CompilationError::MissingEntry);
        }

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            node_order: self.node_order,
            edges,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        })
    }
}
