//! Streaming chat events and the SSE plumbing behind the HTTP clients.
//!
//! - `ChatStreamEvent`: one text chunk, or the finished response
//! - `ChatStream`: boxed stream returned by `LlmClient::stream`
//!
//! Providers send Server-Sent Events; each `data:` payload is handed to a
//! provider-specific `DeltaParser` that yields text as it arrives and builds
//! the full `LlmResponse` (text plus tool calls) at the end.

use std::future::Future;

use eventsource_stream::Eventsource;
use futures::stream::{self, BoxStream, Stream, StreamExt};

use crate::llm::{LlmError, LlmResponse};

/// Streaming chat event.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatStreamEvent {
    /// A non-empty piece of assistant text.
    Token(String),
    /// End of the stream, carrying the complete response.
    Done(LlmResponse),
}

/// Events of one streamed model call: some `Token`s, then one `Done`.
/// An `Err` item ends the stream.
pub type ChatStream<'a> = BoxStream<'a, Result<ChatStreamEvent, LlmError>>;

/// What one SSE payload contributed.
#[derive(Debug, PartialEq)]
pub(crate) enum Delta {
    Text(String),
    Skip,
    End,
}

/// Accumulates one provider's SSE payloads into a response.
pub(crate) trait DeltaParser: Send {
    fn feed(&mut self, data: &str) -> Result<Delta, LlmError>;
    fn finish(&mut self) -> Result<LlmResponse, LlmError>;
}

/// Events for a response that arrived in one piece.
pub(crate) fn whole_response(response: LlmResponse) -> Vec<Result<ChatStreamEvent, LlmError>> {
    let mut events = Vec::with_capacity(2);
    if !response.content.is_empty() {
        events.push(Ok(ChatStreamEvent::Token(response.content.clone())));
    }
    events.push(Ok(ChatStreamEvent::Done(response)));
    events
}

/// Awaits `request`, then reads its body as SSE through `parser`.
pub(crate) fn sse_chat<'a, F, P>(request: F, parser: P) -> ChatStream<'a>
where
    F: Future<Output = Result<reqwest::Response, LlmError>> + Send + 'a,
    P: DeltaParser + 'a,
{
    stream::once(async move {
        match request.await {
            Ok(response) => {
                let payloads = response
                    .bytes_stream()
                    .eventsource()
                    .map(|event| match event {
                        Ok(event) => Ok(event.data),
                        Err(e) => Err(LlmError::Network(format!("event stream: {e}"))),
                    });
                parse_payloads(payloads, parser)
            }
            Err(e) => stream::iter([Err(e)]).boxed(),
        }
    })
    .flatten()
    .boxed()
}

/// Turns raw `data:` payloads into chat events.
///
/// A body that ends without the provider's end marker still yields `Done`
/// with whatever was accumulated.
pub(crate) fn parse_payloads<'a, S, P>(payloads: S, parser: P) -> ChatStream<'a>
where
    S: Stream<Item = Result<String, LlmError>> + Send + 'a,
    P: DeltaParser + 'a,
{
    let payloads = payloads.boxed();
    stream::unfold(Some((payloads, parser)), |cursor| async move {
        let (mut payloads, mut parser) = cursor?;
        loop {
            let data = match payloads.next().await {
                Some(Ok(data)) => data,
                Some(Err(e)) => return Some((Err(e), None)),
                None => return Some((parser.finish().map(ChatStreamEvent::Done), None)),
            };
            match parser.feed(&data) {
                Ok(Delta::Text(text)) if !text.is_empty() => {
                    return Some((Ok(ChatStreamEvent::Token(text)), Some((payloads, parser))))
                }
                Ok(Delta::Text(_)) | Ok(Delta::Skip) => {}
                Ok(Delta::End) => {
                    return Some((parser.finish().map(ChatStreamEvent::Done), None))
                }
                Err(e) => return Some((Err(e), None)),
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every payload is text; `.` ends the stream.
    #[derive(Default)]
    struct Plain(String);

    impl DeltaParser for Plain {
        fn feed(&mut self, data: &str) -> Result<Delta, LlmError> {
            match data {
                "." => Ok(Delta::End),
                "!" => Err(LlmError::Parsing("bang".into())),
                _ => {
                    self.0.push_str(data);
                    Ok(Delta::Text(data.to_string()))
                }
            }
        }

        fn finish(&mut self) -> Result<LlmResponse, LlmError> {
            Ok(LlmResponse::text(std::mem::take(&mut self.0)))
        }
    }

    async fn collect(payloads: &[&str]) -> Vec<Result<ChatStreamEvent, LlmError>> {
        let items: Vec<Result<String, LlmError>> =
            payloads.iter().map(|p| Ok(p.to_string())).collect();
        parse_payloads(stream::iter(items), Plain::default())
            .collect()
            .await
    }

    #[tokio::test]
    async fn tokens_then_done() {
        let events = collect(&["Hel", "", "lo", ".", "ignored"]).await;
        assert_eq!(
            events,
            vec![
                Ok(ChatStreamEvent::Token("Hel".into())),
                Ok(ChatStreamEvent::Token("lo".into())),
                Ok(ChatStreamEvent::Done(LlmResponse::text("Hello"))),
            ]
        );
    }

    #[tokio::test]
    async fn missing_end_marker_still_finishes() {
        let events = collect(&["a"]).await;
        assert_eq!(
            events.last(),
            Some(&Ok(ChatStreamEvent::Done(LlmResponse::text("a"))))
        );
    }

    #[tokio::test]
    async fn parse_error_ends_stream() {
        let events = collect(&["a", "!", "b"]).await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], Err(LlmError::Parsing("bang".into())));
    }

    /// Implements only `invoke`.
    struct Fixed;

    #[async_trait::async_trait]
    impl crate::llm::LlmClient for Fixed {
        async fn invoke(&self, _: &[crate::Message]) -> Result<LlmResponse, LlmError> {
            Ok(LlmResponse::text("one piece"))
        }
    }

    #[tokio::test]
    async fn default_stream_yields_whole_text_once() {
        use crate::llm::LlmClient;
        let events: Vec<_> = Fixed.stream(&[]).collect().await;
        assert_eq!(
            events,
            vec![
                Ok(ChatStreamEvent::Token("one piece".into())),
                Ok(ChatStreamEvent::Done(LlmResponse::text("one piece"))),
            ]
        );
    }

    #[test]
    fn whole_response_skips_empty_text() {
        let events = whole_response(LlmResponse::text(""));
        assert_eq!(events, vec![Ok(ChatStreamEvent::Done(LlmResponse::text("")))]);
    }
}
