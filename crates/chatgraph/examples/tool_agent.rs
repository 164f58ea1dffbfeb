//! Tool agent loop offline: chatbot → tools → chatbot → END.
//!
//! MockLlm requests `get_time` once and then answers; the real `GetTimeTool`
//! runs in between. Every streamed update is printed.
//!
//! Run: `cargo run -p chatgraph --example tool_agent -- "What time is it?"`

use std::sync::Arc;

use chatgraph::{AgentContext, GetTimeTool, Message, MockLlm, StreamMode, ToolRegistry};
use futures::StreamExt;

#[tokio::main]
async fn main() {
    let input = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "What time is it?".to_string());

    let tools = match ToolRegistry::builder().register(GetTimeTool::new()).build() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    let ctx = AgentContext::new(Arc::new(MockLlm::first_tools_then_end()), tools);
    let graph = match ctx.tool_agent() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    print!("{}", graph.draw_mermaid());

    let mut events = graph.stream(chatgraph::ChatState::new(input), StreamMode::Updates);
    while let Some(event) = events.next().await {
        match event {
            Ok(event) => {
                let node = event.node().unwrap_or_default();
                match event.state().last_message() {
                    Some(Message::Tool(r)) => {
                        println!("[{node}] tool {} ({}): {}", r.name, r.call_id, r.content)
                    }
                    Some(m) if !m.tool_calls().is_empty() => {
                        let names: Vec<_> =
                            m.tool_calls().iter().map(|c| c.name.as_str()).collect();
                        println!("[{node}] requests {}", names.join(", "));
                    }
                    Some(m) => println!("[{node}] {}: {}", m.role(), m.text()),
                    None => println!("[{node}] (no messages)"),
                }
            }
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
