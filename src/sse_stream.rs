//! Server-sent event decoding for streamed completion bodies.

use crate::Error;
use futures_util::{Stream, StreamExt};
use memchr::memmem;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

/// Largest partial event kept in memory while waiting for its terminator.
const MAX_PENDING_BYTES: usize = 1 << 20;

const EVENT_SEPARATOR: &[u8] = b"\n\n";

/// A single server-sent event. The completion API only sends `data` fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    pub data: String,
}

impl SseEvent {
    /// OpenAI terminates completion streams with a literal `[DONE]` payload.
    pub fn is_done(&self) -> bool {
        self.data.trim() == "[DONE]"
    }
}

/// Incremental decoder. Bytes go in as they arrive; complete events come out.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every event it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<SseEvent>, Error> {
        // CR only ever appears as part of a CRLF terminator; JSON payloads escape it.
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let finder = memmem::Finder::new(EVENT_SEPARATOR);
        let mut events = Vec::new();
        let mut consumed = 0;

        while let Some(pos) = finder.find(&self.buffer[consumed..]) {
            let end = consumed + pos;
            if let Some(event) = parse_event(&self.buffer[consumed..end])? {
                events.push(event);
            }
            consumed = end + EVENT_SEPARATOR.len();
        }
        self.buffer.drain(..consumed);

        if self.buffer.len() > MAX_PENDING_BYTES {
            self.buffer.clear();
            return Err(Error::malformed("server-sent event exceeded 1 MiB"));
        }

        Ok(events)
    }

    /// Flush whatever is left once the body ends. A final event is allowed to
    /// omit its trailing blank line.
    pub fn finish(&mut self) -> Result<Option<SseEvent>, Error> {
        let rest = std::mem::take(&mut self.buffer);
        parse_event(&rest)
    }
}

fn parse_event(raw: &[u8]) -> Result<Option<SseEvent>, Error> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| Error::malformed(format!("invalid UTF-8 in event stream: {e}")))?;

    let mut data: Option<String> = None;

    for line in text.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        // event, id and retry carry nothing the completion client needs
        if field != "data" {
            continue;
        }
        match data.as_mut() {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(value);
            }
            None => data = Some(value.to_string()),
        }
    }

    Ok(data.map(|data| SseEvent { data }))
}

/// Adapts a byte stream into a stream of [`SseEvent`]s.
pub struct SseStream<S> {
    inner: S,
    decoder: SseDecoder,
    ready: VecDeque<SseEvent>,
    exhausted: bool,
}

impl<S> SseStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            decoder: SseDecoder::new(),
            ready: VecDeque::new(),
            exhausted: false,
        }
    }
}

impl<S, E> Stream for SseStream<S>
where
    S: Stream<Item = Result<bytes::Bytes, E>> + Unpin,
    E: std::fmt::Display,
{
    type Item = Result<SseEvent, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(event) = self.ready.pop_front() {
                return Poll::Ready(Some(Ok(event)));
            }
            if self.exhausted {
                return Poll::Ready(None);
            }

            match ready!(self.inner.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => match self.decoder.feed(&chunk) {
                    Ok(events) => self.ready.extend(events),
                    Err(e) => {
                        self.exhausted = true;
                        return Poll::Ready(Some(Err(e)));
                    }
                },
                Some(Err(e)) => {
                    self.exhausted = true;
                    return Poll::Ready(Some(Err(Error::malformed(format!(
                        "response body interrupted: {e}"
                    )))));
                }
                None => {
                    self.exhausted = true;
                    match self.decoder.finish() {
                        Ok(Some(event)) => return Poll::Ready(Some(Ok(event))),
                        Ok(None) => return Poll::Ready(None),
                        Err(e) => return Poll::Ready(Some(Err(e))),
                    }
                }
            }
        }
    }
}

/// Extension trait to add SSE parsing to byte streams.
pub trait SseStreamExt: Stream + Sized {
    fn sse_events(self) -> SseStream<Self> {
        SseStream::new(self)
    }
}

impl<S: Stream> SseStreamExt for S {}
