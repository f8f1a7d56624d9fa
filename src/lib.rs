//! Declarative HTTP endpoints with plugin middleware and an incremental
//! [Server-Sent Events](https://html.spec.whatwg.org/multipage/server-sent-events.html)
//! (SSE) decoder.
//!
//! `eventline` has two halves:
//!
//! - A small request layer: describe an API endpoint declaratively with the
//!   [`Endpoint`] trait (base address, path, method, body-encoding [`Task`],
//!   headers) and let [`Client`] build and execute the request, running
//!   registered [`Plugin`]s (logging, auth-token injection, ...) around it.
//! - The core: [`SseDecoder`], an incremental parser that turns an
//!   arbitrarily-chunked byte stream into complete events, correct across
//!   partial reads, with [`EventStream`] as its async [`Stream`][futures_core::Stream]
//!   adapter and [`JsonStream`][json_stream::JsonStream] for typed payloads.
//!
//! # Declaring an endpoint and streaming it
//!
//! ```ignore
//! use eventline::{Client, Endpoint, NetworkLoggerPlugin, Task};
//! use futures::StreamExt;
//! use reqwest::Url;
//!
//! struct Ticker;
//!
//! impl Endpoint for Ticker {
//!     fn base_url(&self) -> Url {
//!         Url::parse("https://api.example.com/v1/").unwrap()
//!     }
//!
//!     fn path(&self) -> String {
//!         "ticker/events".into()
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::builder().plugin(NetworkLoggerPlugin).build();
//!
//! let mut events = client.stream(&Ticker).await?;
//! while let Some(event) = events.next().await {
//!     let event = event?;
//!     println!("{:?}: {:?}", event.event, event.data);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Dropping the stream aborts the connection; no more bytes are pulled from
//! the network.
//!
//! # Using the decoder directly
//!
//! The decoder is a plain state object with no I/O, so any transport works -
//! feed it whatever chunks you have:
//!
//! ```rust
//! use eventline::SseDecoder;
//!
//! let mut decoder = SseDecoder::new();
//! let events = decoder.feed("id:42\nevent:update\ndata:{\"x\":1}\n\n").unwrap();
//!
//! assert_eq!(events[0].id.as_deref(), Some("42"));
//! assert_eq!(events[0].event.as_deref(), Some("update"));
//! assert_eq!(events[0].data.as_deref(), Some("{\"x\":1}\n"));
//! ```
//!
//! Already holding a [`reqwest::Response`]? [`response_to_stream`] skips the
//! endpoint layer entirely.

pub mod client;
pub(crate) mod constants;
pub mod decoder;
pub mod endpoint;
pub mod errors;
pub mod event;
pub mod event_stream;
pub mod json_stream;
mod parser;
pub mod plugin;
pub mod request;

pub use client::{Client, ClientBuilder, Response, SseStream, response_to_stream};
pub use decoder::SseDecoder;
pub use endpoint::{Endpoint, ParameterEncoding, Parameters, Task};
pub use errors::{DecodeError, EncodeError, Error, EventStreamError};
pub use event::Event;
pub use event_stream::EventStream;
pub use plugin::{AccessTokenPlugin, NetworkLoggerPlugin, Plugin};
pub use request::build_request;
