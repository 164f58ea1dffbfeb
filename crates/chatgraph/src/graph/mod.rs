//! State graph: nodes, plain and conditional edges, compile, invoke and stream.
//!
//! Aligns with LangGraph `StateGraph`: add nodes and edges between `START`
//! and `END`, compile, then invoke or stream with state.

mod compile_error;
mod compiled;
mod next;
mod node;
mod state_graph;
mod stream;

pub use compile_error::CompilationError;
pub use compiled::{CompiledStateGraph, DEFAULT_RECURSION_LIMIT};
pub use next::Next;
pub use node::Node;
pub use state_graph::{RouterFn, StateGraph, END, START};
pub use stream::{StreamEvent, StreamMode};
