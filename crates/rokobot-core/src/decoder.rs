//! Decoder for the `data: <json>` lines of a streamed chat reply
//!
//! Network reads do not respect line boundaries, so bytes are buffered until
//! a newline arrives. Each complete `data: ` line carries one JSON object
//! with a `content` delta. Lines that fail to parse are logged and skipped.

use std::collections::VecDeque;

use futures_util::stream::{self, Stream, StreamExt};
use serde::Deserialize;

use crate::error::ChatError;

const DATA_PREFIX: &str = "data: ";

#[derive(Deserialize)]
struct DeltaPayload {
    content: String,
}

#[derive(Debug, Default)]
pub struct DeltaDecoder {
    buffer: Vec<u8>,
    skipped: usize,
}

impl DeltaDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk, returning the deltas of every line it
    /// completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut deltas = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(delta) = self.decode_line(&line[..pos]) {
                deltas.push(delta);
            }
        }
        deltas
    }

    /// Decode whatever is left once the body ends without a final newline.
    pub fn finish(&mut self) -> Vec<String> {
        let line = std::mem::take(&mut self.buffer);
        self.decode_line(&line).into_iter().collect()
    }

    /// Number of payload lines dropped as malformed so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn decode_line(&mut self, raw: &[u8]) -> Option<String> {
        let line = String::from_utf8_lossy(raw);
        let line = line.strip_suffix('\r').unwrap_or(&line);

        let payload = line.strip_prefix(DATA_PREFIX)?;
        match serde_json::from_str::<DeltaPayload>(payload) {
            Ok(delta) => Some(delta.content),
            Err(e) => {
                self.skipped += 1;
                tracing::warn!(error = %e, line = payload, "skipping malformed stream line");
                None
            }
        }
    }
}

struct DeltaState<S> {
    body: S,
    decoder: DeltaDecoder,
    pending: VecDeque<String>,
    done: bool,
}

/// Turn a body of byte chunks into a lazy, finite stream of text deltas.
///
/// A body error is yielded once and ends the stream.
pub fn deltas<S>(body: S) -> impl Stream<Item = Result<String, ChatError>>
where
    S: Stream<Item = Result<Vec<u8>, ChatError>> + Unpin,
{
    let state = DeltaState {
        body,
        decoder: DeltaDecoder::new(),
        pending: VecDeque::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(delta) = state.pending.pop_front() {
                return Some((Ok(delta), state));
            }
            if state.done {
                return None;
            }
            match state.body.next().await {
                Some(Ok(chunk)) => {
                    let decoded = state.decoder.push(&chunk);
                    state.pending.extend(decoded);
                }
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(e), state));
                }
                None => {
                    state.done = true;
                    let decoded = state.decoder.finish();
                    state.pending.extend(decoded);
                    if state.decoder.skipped() > 0 {
                        tracing::debug!(
                            skipped = state.decoder.skipped(),
                            "stream ended with skipped lines"
                        );
                    }
                }
            }
        }
    })
}
