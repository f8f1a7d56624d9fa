//! [`Stream`] adapter that decodes SSE events out of any chunked byte stream.

use std::{
    pin::Pin,
    task::{Context, Poll, ready},
};

use bytes_utils::Str;
use futures_core::Stream;

use crate::{decoder::SseDecoder, errors::EventStreamError, event::Event};

/// Active while the inner stream may still produce bytes; Draining once it
/// ended and only buffered events remain; Terminated yields nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Active,
    Draining,
    Terminated,
}

pin_project_lite::pin_project! {
    /// Converts a `Stream<Item = Result<impl AsRef<[u8]>, E>>` into a stream
    /// of parsed [`Event`]s.
    ///
    /// Decoding is synchronous CPU work; this type only suspends while
    /// waiting on the inner stream. When the inner stream ends, the decoder
    /// is closed (resolving a trailing bare CR), any event that completes is
    /// yielded, and the stream terminates. A transport error is passed
    /// through as an item; a decode error ends the stream for good.
    #[derive(Debug)]
    pub struct EventStream<S> {
        #[pin]
        stream: S,
        decoder: SseDecoder,
        state: StreamState,
        last_event_id: Option<Str>,
    }
}

impl<S> EventStream<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            decoder: SseDecoder::new(),
            state: StreamState::Active,
            last_event_id: None,
        }
    }

    /// The id of the most recent event that carried one, useful for resuming
    /// a dropped connection via the `last-event-id` request header.
    pub fn last_event_id(&self) -> Option<&Str> {
        self.last_event_id.as_ref()
    }

    pub fn set_last_event_id(&mut self, id: impl Into<Str>) {
        self.last_event_id = Some(id.into());
    }
}

impl<S, B, E> Stream for EventStream<S>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    type Item = Result<Event, EventStreamError<E>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if *this.state == StreamState::Terminated {
                return Poll::Ready(None);
            }

            match this.decoder.next_event() {
                Ok(Some(event)) => {
                    if let Some(id) = &event.id {
                        *this.last_event_id = Some(id.clone());
                    }
                    return Poll::Ready(Some(Ok(event)));
                }
                Err(e) => {
                    *this.state = StreamState::Terminated;
                    return Poll::Ready(Some(Err(EventStreamError::Decode(e))));
                }
                Ok(None) => {}
            }

            if *this.state == StreamState::Draining {
                // buffer exhausted after the inner stream ended
                *this.state = StreamState::Terminated;
                return Poll::Ready(None);
            }

            match ready!(this.stream.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => this.decoder.push(chunk),
                Some(Err(e)) => return Poll::Ready(Some(Err(EventStreamError::Transport(e)))),
                None => {
                    this.decoder.close();
                    *this.state = StreamState::Draining;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::prelude::*;

    fn s(value: &str) -> Option<Str> {
        Some(Str::from(value))
    }

    async fn collect(chunks: Vec<&'static [u8]>) -> Vec<Event> {
        EventStream::new(futures::stream::iter(
            chunks.into_iter().map(|c| Ok::<_, ()>(Bytes::from_static(c))),
        ))
        .try_collect()
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn whole_and_split_chunks_agree() {
        let expected = vec![Event {
            data: s("Hello, world!\n"),
            ..Event::default()
        }];

        assert_eq!(collect(vec![b"data: Hello, world!\n\n"]).await, expected);
        assert_eq!(
            collect(vec![b"data: Hello,", b" world!\n\n"]).await,
            expected
        );
        assert_eq!(
            collect(vec![b"data: Hello,", b"", b" world!\n\n"]).await,
            expected
        );
    }

    #[tokio::test]
    async fn unterminated_event_is_not_emitted() {
        assert_eq!(collect(vec![b"data: Hello, world!\n"]).await, vec![]);
    }

    #[tokio::test]
    async fn wire_format_walkthrough() {
        let events = collect(vec![
            b": stream preamble\n\ndata: first event\nid: 1\n\nevent:named\ndata:second event\nid\n\nretry: 1500\n\n",
        ])
        .await;

        assert_eq!(
            events,
            vec![
                Event {
                    id: s("1"),
                    data: s("first event\n"),
                    ..Event::default()
                },
                // the bare `id` line has no colon and is dropped
                Event {
                    event: s("named"),
                    data: s("second event\n"),
                    ..Event::default()
                },
                Event {
                    retry: s("1500"),
                    ..Event::default()
                },
            ]
        );
    }

    #[tokio::test]
    async fn bom_is_stripped_at_stream_start() {
        let expected = vec![Event {
            data: s("test\n"),
            ..Event::default()
        }];

        assert_eq!(collect(vec![b"\xEF\xBB\xBFdata: test\n\n"]).await, expected);
        assert_eq!(
            collect(vec![b"\xEF\xBB", b"\xBFdata: test\n\n"]).await,
            expected
        );
        assert_eq!(collect(vec![b":\n", b"data: test\n\n"]).await, expected);
    }

    #[tokio::test]
    async fn trailing_cr_is_a_boundary_at_stream_end() {
        assert_eq!(collect(vec![b"data: test\r"]).await, vec![]);

        assert_eq!(
            collect(vec![b"data: test\r\r"]).await,
            vec![Event {
                data: s("test\n"),
                ..Event::default()
            }]
        );
    }

    #[tokio::test]
    async fn transport_errors_pass_through_mid_stream() {
        let chunks = vec![
            Ok(Bytes::from_static(b"id: 1\n\n")),
            Err("connection reset"),
            Ok(Bytes::from_static(b"id: 2\n\n")),
        ];
        let results: Vec<_> = EventStream::new(futures::stream::iter(chunks))
            .collect()
            .await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().id, s("1"));
        assert!(matches!(
            results[1],
            Err(EventStreamError::Transport("connection reset"))
        ));
        assert_eq!(results[2].as_ref().unwrap().id, s("2"));
    }

    #[tokio::test]
    async fn decode_errors_terminate_the_stream() {
        let chunks = vec![
            Ok::<_, ()>(Bytes::from_static(b"id: 1\n\n")),
            Ok(Bytes::from_static(b"data: \xFF\nid: 2\n\n")),
        ];
        let results: Vec<_> = EventStream::new(futures::stream::iter(chunks))
            .collect()
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().id, s("1"));
        assert!(matches!(results[1], Err(EventStreamError::Decode(_))));
    }

    #[tokio::test]
    async fn last_event_id_tracks_emitted_ids() {
        let mut stream = EventStream::new(futures::stream::iter(vec![Ok::<_, ()>(
            Bytes::from_static(b"id: 1\ndata: a\n\ndata: no id here\n\n"),
        )]));

        assert_eq!(stream.last_event_id(), None);
        stream.next().await.unwrap().unwrap();
        assert_eq!(stream.last_event_id().map(|id| &**id), Some("1"));

        // events without an id leave it untouched
        stream.next().await.unwrap().unwrap();
        assert_eq!(stream.last_event_id().map(|id| &**id), Some("1"));
    }
}
