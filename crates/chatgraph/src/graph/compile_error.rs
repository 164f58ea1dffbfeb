//! Graph compilation error.
//!
//! Returned by `StateGraph::compile` when the edges do not describe a runnable graph.

use thiserror::Error;

/// Error when compiling a state graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompilationError {
    /// No edge leaves `START`, so the graph has no entry node.
    #[error("graph has no entry point: add an edge from START")]
    MissingEntry,
    /// An edge or path-map entry references a node never passed to `add_node`.
    #[error("node not found: {0}")]
    NodeNotFound(String),
    /// The node already has an outgoing edge.
    #[error("node {0} has more than one outgoing edge")]
    DuplicateEdge(String),
    /// `START` and `END` cannot be used as node ids.
    #[error("reserved node id: {0}")]
    ReservedName(String),
}
