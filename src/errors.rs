//! Error types used across the crate.

use std::str::Utf8Error;

use thiserror::Error;

/// Top-level failure of a request issued through [`Client`][crate::Client].
#[derive(Debug, Error)]
pub enum Error {
    /// The endpoint's base address and path cannot combine into a resolvable URL.
    #[error("invalid endpoint address: {0}")]
    Url(#[from] url::ParseError),
    /// Network or connection failure, passed through from the HTTP client.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The payload could not be serialized by the chosen encoding strategy.
    #[error("request encoding failed: {0}")]
    Encoding(#[from] EncodeError),
    /// The response's event stream contained bytes that are not valid text.
    #[error("event stream decoding failed: {0}")]
    Decode(#[from] DecodeError),
}

/// A request body or query string could not be produced.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Query-string encoding only accepts scalar values.
    #[error("parameter `{0}` has a nested value and cannot be query-encoded")]
    NonScalarQueryValue(String),
    #[error("body serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// The stream held a complete line that is not valid UTF-8.
///
/// An *incomplete* multi-byte sequence at the end of the buffer never produces
/// this error: CR and LF cannot be UTF-8 continuation bytes, so such a
/// sequence can only sit in a line that has no terminator yet, and the decoder
/// simply waits for more input. A complete line that fails validation is
/// therefore permanently malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("event stream is not valid utf-8: {0}")]
pub struct DecodeError(#[from] pub Utf8Error);

/// Item error of an [`EventStream`][crate::EventStream], generic over the
/// inner stream's transport error.
#[derive(Debug, Error)]
pub enum EventStreamError<E> {
    /// Something went wrong with the underlying byte stream.
    #[error("transport error: {0}")]
    Transport(E),
    /// The stream itself is malformed; no further events will be produced.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
