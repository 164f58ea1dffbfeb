//! CLI for chatbot: pick a graph, build it around the configured model, run it.
//!
//! Loads credentials via `chatbot::Config` after reading `.env`; logs go to
//! stderr, filtered by `RUST_LOG`.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chatbot::{
    answer_graph, format_answer_update, run_repl, stream_graph_updates, stream_joke, AnswerState,
    CliOptions, Config, DEFAULT_MODEL, DEFAULT_QUESTION, DEFAULT_TOPIC,
};
use chatgraph::graph::DEFAULT_RECURSION_LIMIT;
use chatgraph::{AgentContext, MockLlm, StreamMode, ToolRegistry};

#[derive(Parser)]
#[command(name = "chatbot")]
#[command(about = "Console chatbot: tool-calling agent, single answers and jokes")]
struct Args {
    /// Model as provider:model (openai, anthropic or mock)
    #[arg(long, global = true, default_value = DEFAULT_MODEL)]
    model: String,

    /// Sampling temperature (OpenAI-compatible providers only)
    #[arg(long, global = true)]
    temperature: Option<f32>,

    /// Maximum node executions per run
    #[arg(long, global = true, default_value_t = DEFAULT_RECURSION_LIMIT)]
    recursion_limit: usize,

    /// Web search results per query when TAVILY_API_KEY is set
    #[arg(long, global = true, default_value_t = chatbot::config::DEFAULT_SEARCH_RESULTS)]
    search_results: u32,

    /// System prompt prepended to every agent model call
    #[arg(long, global = true)]
    system: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat with the tool-calling agent (default)
    Chat,
    /// Ask one question through the single-node answer graph
    Ask {
        #[arg(default_value = DEFAULT_QUESTION)]
        question: String,
    },
    /// Ask the model for a joke, printed chunk by chunk as `chunk|`
    Joke {
        #[arg(default_value = DEFAULT_TOPIC)]
        topic: String,
    },
    /// Print the agent graph as Mermaid
    Graph,
    /// Ask the agent one question and print every update
    Once { question: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "chatbot=info,chatgraph=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let command = args.command.unwrap_or(Command::Chat);
    if let Command::Graph = command {
        // Wiring only; no credentials needed.
        let ctx = AgentContext::new(Arc::new(MockLlm::echo()), ToolRegistry::empty());
        print!("{}", ctx.tool_agent()?.draw_mermaid());
        return Ok(());
    }

    let opts = CliOptions {
        model: args.model,
        temperature: args.temperature,
        recursion_limit: args.recursion_limit,
        search_results: args.search_results,
        system_prompt: args.system,
    };
    let cfg = Config::from_env_and_args(&opts)?;
    info!(model = %cfg.model, "configured");

    match command {
        Command::Chat => {
            let graph = cfg.agent_context()?.tool_agent()?;
            let mut stdout = tokio::io::stdout();
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            run_repl(&graph, stdin, &mut stdout).await?;
        }
        Command::Once { question } => {
            let graph = cfg.agent_context()?.tool_agent()?;
            let mut stdout = tokio::io::stdout();
            stream_graph_updates(&graph, &question, &mut stdout).await?;
        }
        Command::Ask { question } => {
            let graph = answer_graph(cfg.llm(Vec::new())?)?;
            println!("{}", graph.draw_mermaid());
            let mut events = graph.stream(AnswerState::new(question), StreamMode::Updates);
            while let Some(event) = events.next().await {
                let event = event.context("answer graph failed")?;
                println!(
                    "{}",
                    format_answer_update(event.node().unwrap_or_default(), event.state())
                );
            }
        }
        Command::Joke { topic } => {
            let mut chunks = stream_joke(cfg.llm(Vec::new())?, &topic);
            let mut stdout = std::io::stdout();
            while let Some(chunk) = chunks.next().await {
                let chunk = chunk.context("joke graph failed")?;
                write!(stdout, "{chunk}|")?;
                stdout.flush()?;
            }
            writeln!(stdout)?;
        }
        Command::Graph => {}
    }
    Ok(())
}
