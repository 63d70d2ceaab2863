//! Server-Sent Events decoder for streamed completions.
//!
//! The chat service answers `messages:complete` with `stream: true` by a body
//! of `data: <json>\n\n` events closed by `data: [DONE]\n\n`. [`SseDecoder`]
//! turns the raw body into [`StreamChunk`]s as soon as each event is complete.
//!
//! Bytes are buffered until an event terminator shows up and only then
//! decoded as UTF-8, so a character split across two network reads is never
//! decoded half-way. Any decoding failure produces a single
//! [`StreamChunk::Error`] after which the stream is exhausted.

use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{FusedStream, Stream, StreamExt};
use serde_valid::Validate;

use super::types::StreamChunk;
use crate::forms::CompletionChunk;

const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid UTF-8 in event stream")]
    InvalidUtf8,
    #[error("malformed event line `{0}`")]
    MalformedLine(String),
    #[error("unterminated event at end of stream")]
    Unterminated,
    #[error("invalid chunk payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("chunk failed validation: {0}")]
    Validation(String),
    #[error("stream interrupted: {0}")]
    Transport(String),
}

/// What a complete event carried.
#[derive(Debug, PartialEq, Eq)]
enum Event {
    /// Comments only, nothing to yield.
    Empty,
    Done,
    Chunk { content: String, response_id: i64 },
}

/// Decodes a byte stream framed as Server-Sent Events into chunks.
pub struct SseDecoder<S> {
    inner: S,
    buffer: Vec<u8>,
    /// Buffer prefix already searched for a terminator.
    scanned: usize,
    finished: bool,
}

impl<S> SseDecoder<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            scanned: 0,
            finished: false,
        }
    }

    fn fail(&mut self, err: DecodeError) -> Poll<Option<StreamChunk>> {
        tracing::warn!("Event stream terminated: {}", err);
        self.finished = true;
        self.buffer.clear();
        Poll::Ready(Some(StreamChunk::error(err.to_string())))
    }

    /// Pop the next complete event out of the buffer, without its terminator.
    fn next_event(&mut self) -> Option<Vec<u8>> {
        let Some((start, len)) = find_terminator(&self.buffer, self.scanned) else {
            // A terminator may straddle the end of the buffer.
            self.scanned = self.buffer.len().saturating_sub(3);
            return None;
        };
        self.scanned = 0;
        let event: Vec<u8> = self.buffer.drain(..start).collect();
        self.buffer.drain(..len);
        Some(event)
    }
}

impl<S, B, E> Stream for SseDecoder<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Display,
{
    type Item = StreamChunk;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        loop {
            if this.finished {
                return Poll::Ready(None);
            }

            if let Some(event) = this.next_event() {
                match decode_event(&event) {
                    Ok(Event::Empty) => continue,
                    Ok(Event::Done) => {
                        tracing::debug!("Event stream completed");
                        this.finished = true;
                        this.buffer.clear();
                        return Poll::Ready(None);
                    }
                    Ok(Event::Chunk {
                        content,
                        response_id,
                    }) => {
                        return Poll::Ready(Some(StreamChunk::Message {
                            content,
                            response_id,
                        }))
                    }
                    Err(err) => return this.fail(err),
                }
            }

            match this.inner.poll_next_unpin(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(bytes))) => this.buffer.extend_from_slice(bytes.as_ref()),
                Poll::Ready(Some(Err(err))) => {
                    return this.fail(DecodeError::Transport(err.to_string()))
                }
                Poll::Ready(None) => {
                    if this.buffer.iter().all(u8::is_ascii_whitespace) {
                        this.finished = true;
                        return Poll::Ready(None);
                    }
                    return this.fail(DecodeError::Unterminated);
                }
            }
        }
    }
}

impl<S, B, E> FusedStream for SseDecoder<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Display,
{
    fn is_terminated(&self) -> bool {
        self.finished
    }
}

/// Position and length of the first event terminator (`\n\n` or `\r\n\r\n`)
/// starting at or after `from`.
fn find_terminator(buffer: &[u8], from: usize) -> Option<(usize, usize)> {
    (from..buffer.len()).find_map(|i| {
        let rest = &buffer[i..];
        if rest.starts_with(b"\n\n") {
            Some((i, 2))
        } else if rest.starts_with(b"\r\n\r\n") {
            Some((i, 4))
        } else {
            None
        }
    })
}

fn decode_event(raw: &[u8]) -> Result<Event, DecodeError> {
    let text = std::str::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8)?;

    let mut data: Vec<&str> = Vec::new();
    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        match line.strip_prefix("data:") {
            Some(value) => data.push(value.strip_prefix(' ').unwrap_or(value)),
            None => return Err(DecodeError::MalformedLine(line.to_string())),
        }
    }

    if data.is_empty() {
        return Ok(Event::Empty);
    }

    let payload = data.join("\n");
    if payload.trim() == DONE_SENTINEL {
        return Ok(Event::Done);
    }

    let chunk: CompletionChunk = serde_json::from_str(&payload)?;
    chunk
        .validate()
        .map_err(|errors| DecodeError::Validation(errors.to_string()))?;
    let content = chunk
        .content()
        .ok_or_else(|| DecodeError::Validation("no choices".to_string()))?
        .to_string();

    Ok(Event::Chunk {
        content,
        response_id: chunk.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn event(id: i64, content: &str) -> String {
        format!(
            "data: {{\"id\":{},\"choices\":[{{\"finish_reason\":\"stop\",\"index\":0,\"delta\":{{\"role\":\"assistant\",\"content\":{}}}}}]}}\n\n",
            id,
            serde_json::to_string(content).unwrap()
        )
    }

    fn decoder(parts: Vec<Vec<u8>>) -> SseDecoder<stream::Iter<std::vec::IntoIter<Result<Vec<u8>, String>>>> {
        SseDecoder::new(stream::iter(parts.into_iter().map(Ok).collect::<Vec<_>>()))
    }

    fn message(content: &str, response_id: i64) -> StreamChunk {
        StreamChunk::Message {
            content: content.to_string(),
            response_id,
        }
    }

    #[tokio::test]
    async fn test_single_chunk_then_done() {
        let body = format!("{}data: [DONE]\n\n", event(7, "Hi"));
        let chunks: Vec<_> = decoder(vec![body.into_bytes()]).collect().await;
        assert_eq!(chunks, vec![message("Hi", 7)]);
    }

    #[tokio::test]
    async fn test_n_events_yield_n_chunks() {
        let mut body = String::new();
        for i in 0..5 {
            body.push_str(&event(40, &format!("part{} ", i)));
        }
        body.push_str("data: [DONE]\n\n");

        let chunks: Vec<_> = decoder(vec![body.into_bytes()]).collect().await;
        assert_eq!(chunks.len(), 5);
        assert!(chunks.iter().all(|c| matches!(c, StreamChunk::Message { .. })));
        assert_eq!(chunks[4], message("part4 ", 40));
    }

    #[tokio::test]
    async fn test_events_split_across_reads() {
        let body = format!("{}{}data: [DONE]\n\n", event(1, "Bon"), event(1, "jour"));
        let parts: Vec<Vec<u8>> = body.as_bytes().chunks(3).map(|c| c.to_vec()).collect();

        let chunks: Vec<_> = decoder(parts).collect().await;
        assert_eq!(chunks, vec![message("Bon", 1), message("jour", 1)]);
    }

    #[tokio::test]
    async fn test_byte_by_byte_reads_with_crlf() {
        let body = format!("{}data: [DONE]\n\n", event(4, "un")).replace("\n\n", "\r\n\r\n");
        let parts: Vec<Vec<u8>> = body.bytes().map(|b| vec![b]).collect();

        let chunks: Vec<_> = decoder(parts).collect().await;
        assert_eq!(chunks, vec![message("un", 4)]);
    }

    #[test]
    fn test_find_terminator_from_offset() {
        assert_eq!(find_terminator(b"data: a\n\n", 0), Some((7, 2)));
        assert_eq!(find_terminator(b"data: a\n\n", 7), Some((7, 2)));
        assert_eq!(find_terminator(b"data: a\r\n\r\n", 5), Some((7, 4)));
        assert_eq!(find_terminator(b"data: a\n", 6), None);
    }

    #[tokio::test]
    async fn test_multibyte_character_split_across_reads() {
        let body = format!("{}data: [DONE]\n\n", event(2, "été ☀"));
        let bytes = body.into_bytes();
        let sun = bytes
            .windows(3)
            .position(|w| w == "☀".as_bytes())
            .unwrap();
        let parts = vec![bytes[..sun + 1].to_vec(), bytes[sun + 1..].to_vec()];

        let chunks: Vec<_> = decoder(parts).collect().await;
        assert_eq!(chunks, vec![message("été ☀", 2)]);
    }

    #[tokio::test]
    async fn test_missing_data_prefix_yields_one_error() {
        let body = format!("{}garbage\n\n{}data: [DONE]\n\n", event(3, "a"), event(3, "b"));
        let chunks: Vec<_> = decoder(vec![body.into_bytes()]).collect().await;

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], message("a", 3));
        match &chunks[1] {
            StreamChunk::Error { reason } => assert!(reason.contains("garbage")),
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_schema_failure_yields_one_error() {
        let body = "data: {\"id\":1,\"choices\":[]}\n\ndata: [DONE]\n\n";
        let chunks: Vec<_> = decoder(vec![body.as_bytes().to_vec()]).collect().await;

        assert_eq!(chunks.len(), 1);
        assert!(matches!(chunks[0], StreamChunk::Error { .. }));
    }

    #[tokio::test]
    async fn test_invalid_json_yields_one_error() {
        let body = format!("data: {{not json\n\n{}", event(1, "late"));
        let chunks: Vec<_> = decoder(vec![body.into_bytes()]).collect().await;

        assert_eq!(chunks.len(), 1);
        match &chunks[0] {
            StreamChunk::Error { reason } => assert!(reason.starts_with("invalid chunk payload")),
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unterminated_trailing_event_is_an_error() {
        let body = format!("{}data: {{\"id\":1", event(5, "x"));
        let chunks: Vec<_> = decoder(vec![body.into_bytes()]).collect().await;

        assert_eq!(chunks[0], message("x", 5));
        assert_eq!(
            chunks[1],
            StreamChunk::error(DecodeError::Unterminated.to_string())
        );
        assert_eq!(chunks.len(), 2);
    }

    #[tokio::test]
    async fn test_clean_end_without_done() {
        let body = format!("{}\n", event(9, "fin"));
        let chunks: Vec<_> = decoder(vec![body.into_bytes()]).collect().await;
        assert_eq!(chunks, vec![message("fin", 9)]);
    }

    #[tokio::test]
    async fn test_nothing_after_done() {
        let body = format!("data: [DONE]\n\n{}", event(1, "ignored"));
        let chunks: Vec<_> = decoder(vec![body.into_bytes()]).collect().await;
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn test_comments_and_crlf_are_accepted() {
        let body = format!(
            ": keep-alive\r\n\r\n{}data: [DONE]\r\n\r\n",
            event(4, "ok").replace("\n\n", "\r\n\r\n")
        );
        let chunks: Vec<_> = decoder(vec![body.into_bytes()]).collect().await;
        assert_eq!(chunks, vec![message("ok", 4)]);
    }

    #[tokio::test]
    async fn test_transport_error_terminates() {
        let parts: Vec<Result<Vec<u8>, String>> = vec![
            Ok(event(6, "avant").into_bytes()),
            Err("connection reset".to_string()),
            Ok(event(6, "après").into_bytes()),
        ];
        let mut stream = SseDecoder::new(stream::iter(parts));

        assert_eq!(stream.next().await, Some(message("avant", 6)));
        assert_eq!(
            stream.next().await,
            Some(StreamChunk::error("stream interrupted: connection reset"))
        );
        assert!(stream.is_terminated());
        assert_eq!(stream.next().await, None);
        assert_eq!(stream.next().await, None);
    }

    #[test]
    fn test_decode_event_joins_data_lines() {
        let raw = b"data: {\"id\":1,\"choices\":[{\"finish_reason\":\"stop\",\ndata: \"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"a\"}}]}";
        assert_eq!(
            decode_event(raw).unwrap(),
            Event::Chunk {
                content: "a".to_string(),
                response_id: 1
            }
        );
    }

    #[test]
    fn test_find_terminator_prefers_first() {
        assert_eq!(find_terminator(b"data: x\n\ndata: y\r\n\r\n", 0), Some((7, 2)));
        assert_eq!(find_terminator(b"data: x\r\n\r\n", 0), Some((7, 4)));
        assert_eq!(find_terminator(b"data: x\n", 0), None);
    }
}
