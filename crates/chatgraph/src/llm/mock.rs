//! Mock LLM for tests and offline runs.
//!
//! Returns a fixed assistant message with optional tool calls, a scripted
//! sequence of responses, an echo of the last user message, or a fixed error.
//! Records every transcript it receives. `stream` delivers the text word by
//! word, each chunk keeping its trailing space.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::json;

use crate::llm::{ChatStream, ChatStreamEvent, LlmClient, LlmError, LlmResponse};
use crate::message::{Message, ToolCall};

enum Script {
    Fixed(LlmResponse),
    /// Responses in order; the last one repeats once exhausted.
    Sequence(Vec<LlmResponse>),
    Echo,
    Fail(LlmError),
}

/// Mock LLM.
///
/// **Interaction**: Implements `LlmClient`; used by `ModelNode` in tests and
/// by the chatbot's `--model mock:` provider.
pub struct MockLlm {
    script: Script,
    calls: AtomicUsize,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl MockLlm {
    fn from_script(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with the given text and no tool calls (END path).
    pub fn with_no_tool_calls(content: impl Into<String>) -> Self {
        Self::from_script(Script::Fixed(LlmResponse::text(content)))
    }

    /// Always answers with the given text and tool calls.
    pub fn new(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::from_script(Script::Fixed(LlmResponse::with_tool_calls(content, tool_calls)))
    }

    /// Always requests `get_time` once.
    pub fn with_get_time_call() -> Self {
        Self::new("I'll check the time.", vec![get_time_call("call-1")])
    }

    /// First call requests `get_time`, later calls answer without tools.
    pub fn first_tools_then_end() -> Self {
        Self::scripted(vec![
            LlmResponse::with_tool_calls("I'll check the time.", vec![get_time_call("call-1")]),
            LlmResponse::text("The time is as above."),
        ])
    }

    /// Answers with `responses` in order, repeating the last one.
    pub fn scripted(responses: Vec<LlmResponse>) -> Self {
        Self::from_script(Script::Sequence(responses))
    }

    /// Echoes the text of the last user message.
    pub fn echo() -> Self {
        Self::from_script(Script::Echo)
    }

    /// Fails every call with `error`.
    pub fn failing(error: LlmError) -> Self {
        Self::from_script(Script::Fail(error))
    }

    /// Number of `invoke` and `stream` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Transcripts received, in call order.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

fn get_time_call(id: &str) -> ToolCall {
    ToolCall::new(id, "get_time", json!({}))
}

impl MockLlm {
    fn respond(&self, messages: &[Message]) -> Result<LlmResponse, LlmError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut r) = self.requests.lock() {
            r.push(messages.to_vec());
        }
        match &self.script {
            Script::Fixed(resp) => Ok(resp.clone()),
            Script::Sequence(seq) => seq
                .get(n)
                .or_else(|| seq.last())
                .cloned()
                .ok_or_else(|| LlmError::InvalidRequest("empty mock script".into())),
            Script::Echo => {
                let last_user = messages
                    .iter()
                    .rev()
                    .find_map(|m| match m {
                        Message::User(s) => Some(s.clone()),
                        _ => None,
                    })
                    .unwrap_or_default();
                Ok(LlmResponse::text(last_user))
            }
            Script::Fail(e) => Err(e.clone()),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError> {
        self.respond(messages)
    }

    fn stream<'a>(&'a self, messages: &'a [Message]) -> ChatStream<'a> {
        let events = match self.respond(messages) {
            Ok(response) => {
                let mut events: Vec<_> = response
                    .content
                    .split_inclusive(' ')
                    .map(|chunk| Ok(ChatStreamEvent::Token(chunk.to_string())))
                    .collect();
                events.push(Ok(ChatStreamEvent::Done(response)));
                events
            }
            Err(e) => vec![Err(e)],
        };
        stream::iter(events).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_repeats_last_response() {
        let llm = MockLlm::first_tools_then_end();
        let first = llm.invoke(&[Message::user("t?")]).await.unwrap();
        assert_eq!(first.tool_calls.len(), 1);
        let second = llm.invoke(&[Message::user("t?")]).await.unwrap();
        assert!(second.tool_calls.is_empty());
        let third = llm.invoke(&[Message::user("t?")]).await.unwrap();
        assert_eq!(third.content, "The time is as above.");
        assert_eq!(llm.calls(), 3);
    }

    #[tokio::test]
    async fn echo_returns_last_user_text() {
        let llm = MockLlm::echo();
        let out = llm
            .invoke(&[Message::user("first"), Message::assistant("a"), Message::user("second")])
            .await
            .unwrap();
        assert_eq!(out.content, "second");
    }

    #[tokio::test]
    async fn failing_surfaces_error() {
        let llm = MockLlm::failing(LlmError::RateLimit("slow down".into()));
        let err = llm.invoke(&[]).await.unwrap_err();
        assert_eq!(err, LlmError::RateLimit("slow down".into()));
    }

    #[tokio::test]
    async fn stream_splits_text_into_words() {
        let llm = MockLlm::with_no_tool_calls("Two scoops please");
        let events: Vec<_> = llm.stream(&[Message::user("joke")]).collect().await;
        assert_eq!(
            events,
            vec![
                Ok(ChatStreamEvent::Token("Two ".into())),
                Ok(ChatStreamEvent::Token("scoops ".into())),
                Ok(ChatStreamEvent::Token("please".into())),
                Ok(ChatStreamEvent::Done(LlmResponse::text("Two scoops please"))),
            ]
        );
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn stream_of_failing_mock_is_one_error() {
        let llm = MockLlm::failing(LlmError::Network("offline".into()));
        let events: Vec<_> = llm.stream(&[]).collect().await;
        assert_eq!(events, vec![Err(LlmError::Network("offline".into()))]);
    }

    #[tokio::test]
    async fn records_requests() {
        let llm = MockLlm::with_no_tool_calls("ok");
        llm.invoke(&[Message::user("hi")]).await.unwrap();
        let reqs = llm.requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0], vec![Message::user("hi")]);
    }
}
