//! State carried through the agent graph.

use crate::message::Message;
use crate::transcript::Transcript;

/// Question of the run plus its transcript.
///
/// Satisfies `Clone + Send + Sync + 'static` for `Node<ChatState>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    /// Seed question, kept for display.
    pub question: String,
    pub transcript: Transcript,
}

impl ChatState {
    /// Initial state: one seed human message.
    pub fn new(question: impl Into<String>) -> Self {
        let question = question.into();
        Self {
            transcript: Transcript::seeded(question.clone()),
            question,
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.transcript.last()
    }
}
