//! Agent and execution error types.
//!
//! - `AgentError`: graph and node execution errors
//! - `ToolError`: tool lookup, validation and execution errors
//! - `ValidationError`: argument validation against a tool schema
//! - `TranscriptError`: violations of the transcript ordering invariant

use thiserror::Error;

use crate::graph::CompilationError;
use crate::llm::LlmError;

/// Errors surfaced while running a graph or one of its nodes.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The tool dispatcher was asked to run without pending tool requests.
    #[error("empty input: no tool requests in the latest message")]
    EmptyInput,
    /// The model call failed (transport or provider error).
    #[error(transparent)]
    Llm(#[from] LlmError),
    /// A tool lookup, validation or invocation failed.
    #[error(transparent)]
    Tool(#[from] ToolError),
    /// A node tried to append a message that breaks transcript ordering.
    #[error(transparent)]
    Transcript(#[from] TranscriptError),
    /// The graph could not be compiled.
    #[error(transparent)]
    Compilation(#[from] CompilationError),
    /// More node executions than the compiled graph allows.
    #[error("recursion limit of {0} steps reached without hitting END")]
    RecursionLimit(usize),
    /// Execution failed, with a description.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

/// Argument validation error, produced by `validate_args(schema, args)`.
///
/// Converts to `ToolError::ValidationFailed` inside `ToolRegistry::execute`.
#[derive(Debug, Error, Clone)]
#[error("validation failed: {0}")]
pub struct ValidationError(pub String);

/// Tool registration and execution errors.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No tool registered under this name.
    #[error("tool not found: {0}")]
    NotFound(String),
    /// Two tools were registered under the same name.
    #[error("duplicate tool name: {0}")]
    DuplicateName(String),
    /// Arguments did not satisfy the tool schema.
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    /// The tool ran and failed.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

impl From<ValidationError> for ToolError {
    fn from(e: ValidationError) -> Self {
        ToolError::ValidationFailed(e.0)
    }
}

/// Transcript ordering violations, returned by `Transcript::push`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    /// A tool result was appended without a tool-request message right before it.
    #[error("tool result {0} does not follow a tool-request message")]
    OrphanToolResult(String),
    /// The preceding tool-request message has no request with this id.
    #[error("tool result references unknown request id {0}")]
    UnknownCallId(String),
    /// The request id was already answered in this batch.
    #[error("request id {0} already has a result")]
    DuplicateResult(String),
}
