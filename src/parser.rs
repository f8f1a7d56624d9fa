//! Line-level scanner for the SSE wire format.
//!
//! The decoder hands whole lines out of its buffer through [`next_line`] and
//! classifies them with [`classify`]. Splitting and classification are two
//! steps on purpose: a line is only ever *extracted* once its terminator has
//! arrived, so everything downstream of [`next_line`] can assume the line is
//! complete.

use std::str::Utf8Error;

use bytes::{Buf, Bytes, BytesMut};
use bytes_utils::Str;

use crate::constants::{CR, LF};

/// A classified line. Comments and colon-less lines carry nothing; the caller
/// consumes them and moves on.
#[derive(Debug, Clone)]
pub(crate) enum Line {
    /// Line starting with `:`. Contributes nothing, does not end the event.
    Comment,
    /// The empty line terminating an event.
    Blank,
    /// A line with no colon, or a field name this format does not know.
    Ignored,
    Field { name: FieldName, value: Str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldName {
    Id,
    Event,
    Data,
    Retry,
}

/// Locates the next EOL in `bytes`: LF, CRLF, or a bare CR. Returns the
/// exclusive end of the line and the inclusive start of the remainder, or
/// [`None`] when no terminator is present yet. A buffer ending in CR also
/// returns [`None`] - until the next byte arrives it could be half a CRLF.
fn find_eol(bytes: &[u8]) -> Option<(usize, usize)> {
    let first_match = memchr::memchr2(CR, LF, bytes)?;

    match bytes[first_match] {
        LF => Some((first_match, first_match + 1)),
        CR => {
            if first_match + 1 >= bytes.len() {
                return None;
            }

            if bytes[first_match + 1] == LF {
                Some((first_match, first_match + 2))
            } else {
                Some((first_match, first_match + 1))
            }
        }
        _ => unreachable!(),
    }
}

/// Pulls the next complete line out of `buffer`, advancing past its
/// terminator. The terminator bytes themselves are discarded.
pub(crate) fn next_line(buffer: &mut BytesMut) -> Option<Bytes> {
    let (line_end, rem_start) = find_eol(buffer)?;

    let line = buffer.split_to(line_end).freeze();
    buffer.advance(rem_start - line_end);
    Some(line)
}

/// Classifies one complete line.
///
/// The whole line must be valid UTF-8; see
/// [`DecodeError`][crate::errors::DecodeError] for why an invalid complete
/// line means the stream is beyond saving. Field values are trimmed of
/// leading and trailing whitespace before use - the whole value, both ends.
/// That is looser than the wire spec's strip-one-leading-space rule and is
/// kept deliberately; a `data:  two spaces` line loses its indent here.
pub(crate) fn classify(line: Bytes) -> Result<Line, Utf8Error> {
    let text = str::from_utf8(&line)?;

    if line.is_empty() {
        return Ok(Line::Blank);
    }

    match memchr::memchr(b':', &line) {
        Some(0) => Ok(Line::Comment),
        None => Ok(Line::Ignored),
        Some(colon) => {
            let name = match &line[..colon] {
                b"id" => FieldName::Id,
                b"event" => FieldName::Event,
                b"data" => FieldName::Data,
                b"retry" => FieldName::Retry,
                _ => return Ok(Line::Ignored),
            };

            let trimmed = text[colon + 1..].trim();
            let start = trimmed.as_ptr() as usize - text.as_ptr() as usize;
            let value = line.slice(start..start + trimmed.len());
            // Safety: validated above, and the range comes from str::trim on
            // the same buffer so both ends are char boundaries
            let value = unsafe { Str::from_inner_unchecked(value) };

            Ok(Line::Field { name, value })
        }
    }
}
