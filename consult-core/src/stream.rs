//! Incremental parser for the streaming ask response body.
//!
//! The body is framed as event blocks separated by a blank line. Each block
//! carries an optional `event:` line and one or more `data:` lines whose
//! JSON payload is decoded into a [`StreamEvent`]. The accumulator folds
//! events into a running answer and citation list, invoking a caller-supplied
//! progress callback with the full accumulated answer on each textual delta.
//!
//! Parsing is chunk-boundary-insensitive: bytes may arrive split at any
//! offset (including inside a multi-byte UTF-8 sequence) and the final
//! result is identical.

use crate::error::AskError;
use crate::types::{AskResult, RawCitation, StreamEvent};
use serde::Deserialize;
use tracing::debug;

/// Prefix marking an event-type line inside a block.
const EVENT_PREFIX: &str = "event:";
/// Prefix marking a data line inside a block.
const DATA_PREFIX: &str = "data:";
/// Blank-line separator between event blocks.
const BLOCK_SEPARATOR: &str = "\n\n";
/// Event type assumed when a block has no `event:` line.
const DEFAULT_EVENT: &str = "message";

/// Raw payload shape shared by every event type. Classification into a
/// [`StreamEvent`] happens after decoding, by payload inspection.
#[derive(Debug, Deserialize)]
struct WirePayload {
    #[serde(default)]
    delta: Option<String>,
    #[serde(default)]
    citations: Option<Vec<RawCitation>>,
    #[serde(default)]
    error: Option<String>,
}

/// Decode one event payload into a [`StreamEvent`].
///
/// An `error` field wins regardless of the declared event type. Payloads
/// that match no recognized shape are protocol errors, not silently skipped.
pub fn decode_event(event_type: &str, payload: &str) -> Result<StreamEvent, AskError> {
    let wire: WirePayload = serde_json::from_str(payload).map_err(|e| AskError::Stream {
        message: format!("Failed to parse streaming response: {e}"),
    })?;

    if let Some(message) = wire.error {
        return Ok(StreamEvent::Error { message });
    }

    match event_type {
        "citations" => match wire.citations {
            Some(citations) => Ok(StreamEvent::Citations { citations }),
            None => Err(AskError::Stream {
                message: "citations event without a citation list".to_string(),
            }),
        },
        "end" => Ok(StreamEvent::End),
        _ => match wire.delta {
            Some(delta) => Ok(StreamEvent::Message { delta }),
            None => Err(AskError::Stream {
                message: format!("unrecognized payload for '{event_type}' event"),
            }),
        },
    }
}

/// Stateful accumulator for one streaming ask response.
///
/// Feed decoded network chunks through [`push`](Self::push), call
/// [`finish`](Self::finish) when the underlying read reports completion,
/// then take the result with [`into_result`](Self::into_result).
#[derive(Debug, Default)]
pub struct SseAccumulator {
    /// Decoded text not yet split into complete blocks.
    buf: String,
    /// Trailing bytes of an incomplete UTF-8 sequence, held until the
    /// next chunk completes them.
    pending: Vec<u8>,
    answer: String,
    citations: Vec<RawCitation>,
    /// Set by an explicit `end` event; later bytes are ignored for parsing.
    ended: bool,
}

impl SseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one network chunk and fold any blocks it completes.
    ///
    /// `on_partial` receives the full accumulated answer after each
    /// appended delta, so callers can simply re-render the whole text.
    pub fn push(
        &mut self,
        chunk: &[u8],
        on_partial: &mut dyn FnMut(&str),
    ) -> Result<(), AskError> {
        if self.ended {
            return Ok(());
        }

        self.pending.extend_from_slice(chunk);
        self.drain_valid_utf8()?;

        while let Some(pos) = self.buf.find(BLOCK_SEPARATOR) {
            let block: String = self.buf.drain(..pos + BLOCK_SEPARATOR.len()).collect();
            self.handle_block(block.trim_end_matches('\n'), on_partial)?;
            if self.ended {
                self.buf.clear();
                self.pending.clear();
                break;
            }
        }

        Ok(())
    }

    /// Final flush once the underlying stream reports completion.
    ///
    /// The end of the stream implicitly completes the trailing block, so a
    /// non-empty residual buffer gets one last parse.
    pub fn finish(&mut self, on_partial: &mut dyn FnMut(&str)) -> Result<(), AskError> {
        if self.ended {
            return Ok(());
        }
        if !self.pending.is_empty() {
            return Err(AskError::Stream {
                message: "truncated UTF-8 sequence at end of streaming response".to_string(),
            });
        }
        let residual = std::mem::take(&mut self.buf);
        if !residual.trim().is_empty() {
            self.handle_block(&residual, on_partial)?;
        }
        Ok(())
    }

    /// Consume the accumulator and return the final answer and citations.
    pub fn into_result(self) -> AskResult {
        AskResult {
            answer: self.answer,
            citations: self.citations,
        }
    }

    /// Move every complete UTF-8 prefix of `pending` into the text buffer.
    ///
    /// An incomplete trailing sequence stays pending for the next chunk; a
    /// sequence that can never be completed is a stream error.
    fn drain_valid_utf8(&mut self) -> Result<(), AskError> {
        let valid = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(e) => match e.error_len() {
                Some(_) => {
                    return Err(AskError::Stream {
                        message: "invalid UTF-8 in streaming response".to_string(),
                    });
                }
                None => e.valid_up_to(),
            },
        };
        // The prefix was just validated, so the lossy conversion is exact.
        self.buf
            .push_str(&String::from_utf8_lossy(&self.pending[..valid]));
        self.pending.drain(..valid);
        Ok(())
    }

    /// Parse one complete block into an event and fold it in.
    fn handle_block(
        &mut self,
        block: &str,
        on_partial: &mut dyn FnMut(&str),
    ) -> Result<(), AskError> {
        if block.trim().is_empty() {
            return Ok(());
        }

        let mut event_type = DEFAULT_EVENT;
        let mut data_lines: Vec<&str> = Vec::new();

        for line in block.split('\n') {
            if let Some(value) = line.strip_prefix(EVENT_PREFIX) {
                event_type = value.trim();
            } else if let Some(value) = line.strip_prefix(DATA_PREFIX) {
                data_lines.push(value.trim());
            }
        }

        // Pure comment/keepalive blocks carry no data lines.
        if data_lines.is_empty() {
            return Ok(());
        }

        let payload = data_lines.join("\n");
        let event = decode_event(event_type, &payload)?;
        self.apply_event(event, on_partial)
    }

    fn apply_event(
        &mut self,
        event: StreamEvent,
        on_partial: &mut dyn FnMut(&str),
    ) -> Result<(), AskError> {
        match event {
            StreamEvent::Error { message } => Err(AskError::Stream { message }),
            StreamEvent::Citations { citations } => {
                debug!(count = citations.len(), "Replacing citation list from stream");
                self.citations = citations;
                Ok(())
            }
            StreamEvent::Message { delta } => {
                if !delta.is_empty() {
                    self.answer.push_str(&delta);
                    on_partial(&self.answer);
                }
                Ok(())
            }
            StreamEvent::End => {
                debug!("Stream signalled explicit end");
                self.ended = true;
                Ok(())
            }
        }
    }
}
