//! Append-only conversation history.
//!
//! `Transcript` owns the ordered messages of one run. `push` rejects tool
//! results that do not answer a request from the immediately preceding
//! tool-request message, so a transcript handed to a provider is always
//! well-formed.

use crate::error::TranscriptError;
use crate::message::Message;

/// Ordered, append-only sequence of messages for a single run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transcript holding one seed human message.
    pub fn seeded(user_input: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(user_input)],
        }
    }

    /// Appends a message, enforcing tool-result ordering.
    pub fn push(&mut self, message: Message) -> Result<(), TranscriptError> {
        if let Message::Tool(result) = &message {
            self.check_tool_result(&result.call_id)?;
        }
        self.messages.push(message);
        Ok(())
    }

    /// Appends every message in order; stops at the first violation.
    pub fn extend<I>(&mut self, messages: I) -> Result<(), TranscriptError>
    where
        I: IntoIterator<Item = Message>,
    {
        for m in messages {
            self.push(m)?;
        }
        Ok(())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    fn check_tool_result(&self, call_id: &str) -> Result<(), TranscriptError> {
        // Walk back over results already appended for the same batch.
        let mut answered = Vec::new();
        let mut request = None;
        for m in self.messages.iter().rev() {
            match m {
                Message::Tool(r) => answered.push(r.call_id.as_str()),
                other => {
                    request = Some(other);
                    break;
                }
            }
        }
        let calls = match request {
            Some(m @ Message::ToolCalls { .. }) => m.tool_calls(),
            _ => return Err(TranscriptError::OrphanToolResult(call_id.to_string())),
        };
        if !calls.iter().any(|c| c.id == call_id) {
            return Err(TranscriptError::UnknownCallId(call_id.to_string()));
        }
        if answered.contains(&call_id) {
            return Err(TranscriptError::DuplicateResult(call_id.to_string()));
        }
        Ok(())
    }
}

impl TryFrom<Vec<Message>> for Transcript {
    type Error = TranscriptError;

    fn try_from(messages: Vec<Message>) -> Result<Self, Self::Error> {
        let mut t = Transcript::new();
        t.extend(messages)?;
        Ok(t)
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
