//! Folds streamed events into a finished generation.

use crate::response::GenerationResult;
use crate::types::{FinishReason, StreamEvent, Usage};
use crate::Error;

/// Accumulates streaming deltas into a complete result.
#[derive(Debug, Default)]
pub struct ResponseAccumulator {
    text: String,
    finish_reason: Option<FinishReason>,
    usage: Option<Usage>,
    done: bool,
}

impl ResponseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a stream event and update the accumulation.
    pub fn process_event(&mut self, event: StreamEvent) -> Result<(), Error> {
        if self.done {
            return Err(Error::malformed("event received after end of stream"));
        }
        match event {
            StreamEvent::ContentDelta { delta } => self.text.push_str(&delta),
            StreamEvent::Finished { finish_reason } => self.finish_reason = Some(finish_reason),
            StreamEvent::Usage { usage } => self.usage = Some(usage),
            StreamEvent::Done => self.done = true,
            StreamEvent::Error { message } => return Err(Error::provider(None, message)),
        }
        Ok(())
    }

    /// Text received so far.
    pub fn current_text(&self) -> &str {
        &self.text
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Finalize into a result. The model must have reported a finish reason
    /// and produced some visible text.
    pub fn finalize(self) -> Result<GenerationResult, Error> {
        let finish_reason = self
            .finish_reason
            .ok_or_else(|| Error::malformed("stream ended before the completion finished"))?;

        if self.text.trim().is_empty() {
            return Err(Error::malformed("completion contained no text"));
        }

        Ok(GenerationResult {
            text: self.text,
            finish_reason,
            usage: self.usage.unwrap_or_default(),
        })
    }
}
