//! Interactive loop over the tool-calling agent.
//!
//! Reads a line after `User: `, streams the agent graph for it and prints one
//! `Assistant: ` line per node update. `quit`, `exit` or `q` ends the session.
//! A failed run is reported and the loop keeps prompting.

use anyhow::{Context, Result};
use chatgraph::{ChatState, CompiledStateGraph, StreamMode};
use futures::StreamExt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::output::format_update;

const EXIT_WORDS: [&str; 3] = ["quit", "exit", "q"];

/// True for the words that end the session, in any case.
pub fn is_exit(input: &str) -> bool {
    let input = input.trim();
    EXIT_WORDS.iter().any(|w| w.eq_ignore_ascii_case(input))
}

/// Streams one question through `graph`, writing a line per update.
///
/// Lines already written stay written when a later step fails.
pub async fn stream_graph_updates<W>(
    graph: &CompiledStateGraph<ChatState>,
    question: &str,
    out: &mut W,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut events = graph.stream(ChatState::new(question), StreamMode::Updates);
    while let Some(event) = events.next().await {
        let event = event?;
        let line = format_update(event.state().last_message());
        out.write_all(line.as_bytes()).await?;
        out.write_all(b"\n").await?;
    }
    out.flush().await?;
    Ok(())
}

/// Runs the prompt loop until an exit word or end of input.
pub async fn run_repl<R, W>(
    graph: &CompiledStateGraph<ChatState>,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    loop {
        out.write_all(b"User: ").await?;
        out.flush().await?;
        let Some(line) = lines.next_line().await.context("read input")? else {
            out.write_all(b"\n").await?;
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit(line) {
            out.write_all(b"Goodbye!\n").await?;
            break;
        }
        info!(chars = line.len(), "user turn");
        if let Err(e) = stream_graph_updates(graph, line, out).await {
            warn!(error = %e, "run failed");
            out.write_all(format!("Error: {e:#}\n").as_bytes()).await?;
        }
    }
    out.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chatgraph::{AgentContext, GetTimeTool, LlmError, MockLlm, ToolRegistry};

    fn agent(llm: MockLlm) -> CompiledStateGraph<ChatState> {
        let tools = ToolRegistry::builder()
            .register(GetTimeTool::new())
            .build()
            .unwrap();
        AgentContext::new(Arc::new(llm), tools).tool_agent().unwrap()
    }

    #[test]
    fn exit_words_any_case() {
        for w in ["quit", "EXIT", "Q", " exit "] {
            assert!(is_exit(w), "{w}");
        }
        assert!(!is_exit("question"));
        assert!(!is_exit(""));
    }

    #[tokio::test]
    async fn echo_then_goodbye() {
        let graph = agent(MockLlm::echo());
        let mut out = Vec::new();
        run_repl(&graph, &b"hello there\nquit\n"[..], &mut out)
            .await
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "User: Assistant: hello there\nUser: Goodbye!\n"
        );
    }

    #[tokio::test]
    async fn one_line_per_node_update() {
        let graph = agent(MockLlm::first_tools_then_end());
        let mut out = Vec::new();
        stream_graph_updates(&graph, "time?", &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Assistant: I'll check the time.");
        assert!(lines[1].starts_with("Assistant: Tool 'get_time' returned: "));
        assert_eq!(lines[2], "Assistant: The time is as above.");
    }

    #[tokio::test]
    async fn error_is_printed_and_loop_continues() {
        let graph = agent(MockLlm::failing(LlmError::Network("offline".into())));
        let mut out = Vec::new();
        run_repl(&graph, &b"hi\nq\n"[..], &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Error: "));
        assert!(text.contains("offline"));
        assert!(text.ends_with("User: Goodbye!\n"));
    }

    #[tokio::test]
    async fn end_of_input_stops() {
        let graph = agent(MockLlm::echo());
        let mut out = Vec::new();
        run_repl(&graph, &b""[..], &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "User: \n");
    }
}
