//! Types for streaming responses.

use crate::types::{FinishReason, Usage};

/// Events that can be emitted while a completion streams in.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A chunk of content was received.
    ContentDelta { delta: String },
    /// The model reported why it stopped.
    Finished { finish_reason: FinishReason },
    /// Token accounting for the whole request.
    Usage { usage: Usage },
    /// The stream has finished.
    Done,
    /// The provider reported an error mid-stream.
    Error { message: String },
}

impl StreamEvent {
    pub fn delta(text: impl Into<String>) -> Self {
        StreamEvent::ContentDelta { delta: text.into() }
    }
}
