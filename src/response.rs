//! Response handling for completion requests.

use crate::accumulator::ResponseAccumulator;
use crate::types::{FinishReason, StreamEvent, Usage};
use crate::Error;
use futures_util::stream::Stream;
use futures_util::StreamExt;
use std::pin::Pin;

/// The finished output of one completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub text: String,
    pub finish_reason: FinishReason,
    pub usage: Usage,
}

impl GenerationResult {
    /// True when the model hit `max_tokens` before finishing.
    pub fn is_truncated(&self) -> bool {
        self.finish_reason == FinishReason::Length
    }
}

type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, Error>> + Send>>;

/// A completion in flight. Providers always stream; callers buffer the
/// events into a [`GenerationResult`].
pub struct Response {
    stream: EventStream,
}

impl Response {
    /// Create a new response from a stream of events.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<StreamEvent, Error>> + Send + 'static,
    {
        Self {
            stream: Box::pin(stream),
        }
    }

    /// Build an already-finished response from plain text.
    pub fn from_text(text: impl Into<String>) -> Self {
        let events = vec![
            Ok(StreamEvent::delta(text)),
            Ok(StreamEvent::Finished {
                finish_reason: FinishReason::Stop,
            }),
            Ok(StreamEvent::Done),
        ];
        Self::from_stream(futures_util::stream::iter(events))
    }

    /// Buffer the entire response by consuming the stream.
    pub async fn buffer(mut self) -> Result<GenerationResult, Error> {
        let mut accumulator = ResponseAccumulator::new();

        while let Some(event) = self.stream.next().await {
            accumulator.process_event(event?)?;
            if accumulator.is_done() {
                break;
            }
        }

        accumulator.finalize()
    }

    /// Get just the text content.
    pub async fn text(self) -> Result<String, Error> {
        Ok(self.buffer().await?.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_response_buffering() {
        let events = vec![
            Ok(StreamEvent::delta("Bread needs ")),
            Ok(StreamEvent::delta("time.")),
            Ok(StreamEvent::Finished {
                finish_reason: FinishReason::Length,
            }),
            Ok(StreamEvent::Done),
        ];

        let response = Response::from_stream(futures_util::stream::iter(events));
        let result = response.buffer().await.unwrap();
        assert_eq!(result.text, "Bread needs time.");
        assert!(result.is_truncated());
    }

    #[tokio::test]
    async fn test_stream_error_propagates() {
        let events = vec![
            Ok(StreamEvent::delta("partial")),
            Err(Error::malformed("bad chunk")),
        ];
        let response = Response::from_stream(futures_util::stream::iter(events));
        let err = response.text().await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_from_text() {
        let text = Response::from_text("ready").text().await.unwrap();
        assert_eq!(text, "ready");
    }
}
