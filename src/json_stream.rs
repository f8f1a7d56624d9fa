//! Deserializes each event's `data` payload into a typed value.

use std::{
    marker::PhantomData,
    pin::Pin,
    task::{Context, Poll, ready},
};

use futures_core::Stream;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::event::Event;

pin_project_lite::pin_project! {
    /// Adapts a stream of [`Event`]s into a stream of `T`s by running each
    /// event's `data` through [`serde_json`].
    ///
    /// Events carrying no data at all (id-only updates, retry hints) are
    /// skipped rather than treated as malformed.
    #[derive(Debug)]
    pub struct JsonStream<T, S, DeserError = serde_json::Error> {
        #[pin]
        stream_state: JsonStreamState<S>,
        output_marker: PhantomData<fn() -> (T, DeserError)>,
    }
}

pub type DefaultJsonStream<T, S> = JsonStream<T, S, serde_json::Error>;

pub type PathErrorJsonStream<T, S> =
    JsonStream<T, S, serde_path_to_error::Error<serde_json::Error>>;

impl<T, S, DeserError> JsonStream<T, S, DeserError> {
    #[must_use]
    /// Creates a [`JsonStream`] whose deserialize errors carry the JSON path
    /// of the failing element via [`serde_path_to_error`].
    pub fn new_path(stream: S) -> PathErrorJsonStream<T, S> {
        JsonStream {
            stream_state: JsonStreamState::Active { stream },
            output_marker: PhantomData,
        }
    }

    #[must_use]
    /// Creates a [`JsonStream`] with plain [`serde_json`] errors.
    pub fn new_default(stream: S) -> DefaultJsonStream<T, S>
    where
        T: DeserializeOwned,
    {
        JsonStream {
            stream_state: JsonStreamState::Active { stream },
            output_marker: PhantomData,
        }
    }
}

pin_project_lite::pin_project! {
    #[derive(Debug)]
    #[project = JsonStreamStateProjection]
    enum JsonStreamState<S> {
        Active {
            #[pin]
            stream: S
        },
        Inactive,
    }
}

#[derive(Debug, Error)]
pub enum JsonStreamError<E, D> {
    #[error("event stream error: {0}")]
    Stream(E),
    #[error("could not deserialize event data: {0}")]
    Deserialize(D),
}

impl<T, S, E> Stream for JsonStream<T, S, serde_json::Error>
where
    S: Stream<Item = Result<Event, E>>,
    T: DeserializeOwned,
{
    type Item = Result<T, JsonStreamError<E, serde_json::Error>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        let mut stream = match this.stream_state.as_mut().project() {
            JsonStreamStateProjection::Active { stream } => stream,
            JsonStreamStateProjection::Inactive => return Poll::Ready(None),
        };

        loop {
            let Some(next) = ready!(stream.as_mut().poll_next(cx)) else {
                this.stream_state.set(JsonStreamState::Inactive);
                return Poll::Ready(None);
            };

            match next {
                Ok(event) => match &event.data {
                    Some(data) => {
                        return Poll::Ready(Some(
                            serde_json::from_str(data).map_err(JsonStreamError::Deserialize),
                        ));
                    }
                    // no payload to decode, e.g. an id-only keep-alive
                    None => continue,
                },
                Err(e) => return Poll::Ready(Some(Err(JsonStreamError::Stream(e)))),
            }
        }
    }
}

impl<T, S, E> Stream for JsonStream<T, S, serde_path_to_error::Error<serde_json::Error>>
where
    S: Stream<Item = Result<Event, E>>,
    T: DeserializeOwned,
{
    type Item = Result<T, JsonStreamError<E, serde_path_to_error::Error<serde_json::Error>>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        let mut stream = match this.stream_state.as_mut().project() {
            JsonStreamStateProjection::Active { stream } => stream,
            JsonStreamStateProjection::Inactive => return Poll::Ready(None),
        };

        loop {
            let Some(next) = ready!(stream.as_mut().poll_next(cx)) else {
                this.stream_state.set(JsonStreamState::Inactive);
                return Poll::Ready(None);
            };

            match next {
                Ok(event) => match &event.data {
                    Some(data) => {
                        let mut deserializer = serde_json::Deserializer::from_str(data);
                        return Poll::Ready(Some(
                            serde_path_to_error::deserialize(&mut deserializer)
                                .map_err(JsonStreamError::Deserialize),
                        ));
                    }
                    None => continue,
                },
                Err(e) => return Poll::Ready(Some(Err(JsonStreamError::Stream(e)))),
            }
        }
    }
}
