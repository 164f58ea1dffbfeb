//! Chatbot: console front end for chatgraph.
//!
//! Three graphs share one model client: a single-node answer graph, a joke
//! graph and the tool-calling agent driven by an interactive loop.

pub mod answer;
pub mod config;
pub mod joke;
pub mod output;
pub mod repl;

pub use answer::{answer_graph, AnswerNode, AnswerState, ANSWER_NODE, DEFAULT_QUESTION};
pub use config::{CliOptions, Config, DEFAULT_MODEL};
pub use joke::{
    joke_graph, stream_joke, tell_joke, JokeNode, JokeState, DEFAULT_TOPIC, JOKE_NODE,
};
pub use output::{format_answer_update, format_update};
pub use repl::{is_exit, run_repl, stream_graph_updates};
