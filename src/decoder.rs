//! The incremental SSE decoder.
//!
//! [`SseDecoder`] owns a growable byte buffer and turns arbitrarily-chunked
//! input into complete [`Event`]s. Chunk boundaries carry no meaning: a field
//! line, a CRLF pair, or a multi-byte UTF-8 sequence may straddle any number
//! of chunks and the emitted events come out identical to feeding the stream
//! in one piece.
//!
//! ```rust
//! use eventline::SseDecoder;
//!
//! let mut decoder = SseDecoder::new();
//! assert!(decoder.feed("id: 1\ndata: hel").unwrap().is_empty());
//!
//! let events = decoder.feed("lo\n\n").unwrap();
//! assert_eq!(events.len(), 1);
//! assert_eq!(events[0].data.as_deref(), Some("hello\n"));
//! ```
//!
//! The decoder is a plain state object: no callbacks, no I/O, nothing async.
//! [`EventStream`][crate::EventStream] wires it to a live byte stream.

use bytes::{Buf, BufMut, BytesMut};
use bytes_utils::{Str, StrMut};

use crate::{
    constants::{BOM, CR, LF},
    errors::DecodeError,
    event::Event,
    parser::{FieldName, Line, classify, next_line},
};

/// The id/event/data/retry values gathered from field lines seen since the
/// last event boundary.
#[derive(Debug, Default)]
struct FieldAccumulator {
    id: Option<Str>,
    event: Option<Str>,
    data: Option<StrMut>,
    retry: Option<Str>,
}

impl FieldAccumulator {
    fn add(&mut self, name: FieldName, value: Str) {
        match name {
            // singular fields: last write wins
            FieldName::Id => self.id = Some(value),
            FieldName::Event => self.event = Some(value),
            FieldName::Retry => self.retry = Some(value),
            // data only ever appends, one line feed per occurrence
            FieldName::Data => {
                let data = self.data.get_or_insert_with(StrMut::new);
                data.push_str(&value);
                data.push('\n');
            }
        }
    }

    /// Finalizes the pending event if any field was seen, resetting for the
    /// next one. A boundary with nothing accumulated produces no event.
    fn take(&mut self) -> Option<Event> {
        if self.id.is_none() && self.event.is_none() && self.data.is_none() && self.retry.is_none()
        {
            return None;
        }

        let FieldAccumulator {
            id,
            event,
            data,
            retry,
        } = std::mem::take(self);

        Some(Event {
            id,
            event,
            data: data.map(StrMut::freeze),
            retry,
        })
    }
}

/// Checks for a leading byte-order mark. [`None`] means the buffer is still a
/// strict prefix of the BOM and the answer needs more bytes.
fn starts_with_bom(buffer: &[u8]) -> Option<bool> {
    if buffer.len() >= BOM.len() {
        Some(buffer.starts_with(BOM))
    } else if BOM.starts_with(buffer) {
        None
    } else {
        Some(false)
    }
}

/// Incremental decoder for one SSE connection.
///
/// Feed raw chunks with [`feed`][SseDecoder::feed] as they arrive; each call
/// returns every event completed by that chunk, in wire order, and never a
/// partial one. The buffer always holds exactly the unconsumed suffix of the
/// input - bytes leave it only as parsed lines or delimiting blank lines.
///
/// A decoder serves a single logical stream. All methods take `&mut self`, so
/// the single-writer contract is enforced by the borrow checker rather than
/// by convention.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: BytesMut,
    pending: FieldAccumulator,
    started: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk to the buffer without extracting anything.
    pub fn push(&mut self, chunk: impl AsRef<[u8]>) {
        self.buffer.extend_from_slice(chunk.as_ref());
    }

    /// Appends a chunk, then drains every event it completed.
    pub fn feed(&mut self, chunk: impl AsRef<[u8]>) -> Result<Vec<Event>, DecodeError> {
        self.push(chunk);

        let mut events = Vec::new();
        while let Some(event) = self.next_event()? {
            events.push(event);
        }
        Ok(events)
    }

    /// Extracts at most one complete event from the buffer.
    ///
    /// `Ok(None)` means more input is needed; it is never a partial event.
    /// Field lines scanned along the way are consumed into the pending
    /// accumulator even when no boundary has been reached yet.
    pub fn next_event(&mut self) -> Result<Option<Event>, DecodeError> {
        if !self.started {
            match starts_with_bom(&self.buffer) {
                Some(true) => {
                    self.started = true;
                    self.buffer.advance(BOM.len());
                }
                Some(false) => self.started = true,
                None => return Ok(None),
            }
        }

        while let Some(line) = next_line(&mut self.buffer) {
            match classify(line)? {
                Line::Blank => {
                    if let Some(event) = self.pending.take() {
                        return Ok(Some(event));
                    }
                    // comment-only block: consumed, nothing to emit
                }
                Line::Field { name, value } => self.pending.add(name, value),
                Line::Comment | Line::Ignored => {}
            }
        }

        Ok(None)
    }

    /// Marks the end of input.
    ///
    /// A buffer ending in a bare CR is ambiguous while the stream is live
    /// (the next byte could complete a CRLF); at end of input the CR is a
    /// definitive line terminator, so this completes that line. Drain any
    /// event it resolved with [`next_event`][SseDecoder::next_event], or use
    /// [`finish`][SseDecoder::finish].
    pub fn close(&mut self) {
        if self.buffer.last() == Some(&CR) {
            self.buffer.put_u8(LF);
        }
    }

    /// [`close`][SseDecoder::close], then drain whatever completed.
    ///
    /// Bytes that never saw a terminating blank line are discarded: a
    /// truncated trailing event is not emitted.
    pub fn finish(&mut self) -> Result<Vec<Event>, DecodeError> {
        self.close();

        let mut events = Vec::new();
        while let Some(event) = self.next_event()? {
            events.push(event);
        }
        Ok(events)
    }

    /// Number of unconsumed bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}
