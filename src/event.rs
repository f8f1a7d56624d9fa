//! Representation of decoded SSE events.

use bytes_utils::Str;

/// One complete server-sent event, emitted by the decoder once the
/// terminating blank line has been seen.
///
/// Every field is optional: an absent field was never sent, which is distinct
/// from a field sent with an empty value. No default event type is applied.
/// An event with all four fields absent is never emitted.
///
/// `retry` is carried exactly as it appeared on the wire; use
/// [`retry_millis`][Event::retry_millis] when a numeric delay is wanted.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Event {
    pub id: Option<Str>,
    pub event: Option<Str>,
    pub data: Option<Str>,
    pub retry: Option<Str>,
}

impl Event {
    /// The reconnection-delay hint in milliseconds, if a `retry` field was
    /// sent and parses as an integer.
    pub fn retry_millis(&self) -> Option<u64> {
        self.retry.as_ref().and_then(|raw| raw.parse().ok())
    }
}
