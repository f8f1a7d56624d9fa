//! The endpoint-driven HTTP client.

use std::{fmt, sync::Arc};

use bytes::Bytes;
use http_body_util::BodyDataStream;
use reqwest::{
    Body, StatusCode,
    header::{ACCEPT, HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;

use crate::{
    endpoint::Endpoint, errors::Error, event_stream::EventStream, plugin::Plugin,
    request::build_request,
};

/// Event stream returned by [`Client::stream`].
pub type SseStream = EventStream<BodyDataStream<Body>>;

/// A completed non-streaming response: the raw body plus the metadata the
/// post-response hook observes.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Issues requests described by [`Endpoint`]s, running every registered
/// [`Plugin`] around each one.
///
/// Holds no mutable state after construction: clones share the underlying
/// connection pool and plugin list, and concurrent callers each get their own
/// independent request (and, when streaming, their own decoder).
#[derive(Clone, Default)]
pub struct Client {
    http: reqwest::Client,
    plugins: Arc<[Arc<dyn Plugin>]>,
}

impl Client {
    /// A client with no plugins and a default `reqwest` client.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Performs one request/response round trip and returns the raw body.
    ///
    /// All failures surface directly; there is no local recovery and no
    /// retrying. Every plugin's `did_receive` hook observes the outcome
    /// exactly once, success or failure.
    pub async fn request(&self, endpoint: &impl Endpoint) -> Result<Response, Error> {
        let request = self.run_pre_send_hooks(build_request(endpoint)?);

        let outcome = self.send(request).await;
        for plugin in self.plugins.iter() {
            plugin.did_receive(&outcome);
        }
        outcome
    }

    /// Opens a connection and decodes its body as server-sent events.
    ///
    /// The stream is lazy and non-restartable: it yields events as they are
    /// decoded, ends normally when the server closes the connection, and ends
    /// with an error item on transport failure. Dropping it drops the
    /// response body, which aborts the underlying connection - no further
    /// bytes are requested from the network.
    ///
    /// `accept: text/event-stream` is set unless the endpoint chose its own
    /// accept header.
    pub async fn stream(&self, endpoint: &impl Endpoint) -> Result<SseStream, Error> {
        let mut request = build_request(endpoint)?;
        if !request.headers().contains_key(ACCEPT) {
            request
                .headers_mut()
                .insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        }
        let request = self.run_pre_send_hooks(request);

        let response = self.http.execute(request).await?;
        Ok(response_to_stream(response))
    }

    fn run_pre_send_hooks(&self, mut request: reqwest::Request) -> reqwest::Request {
        for plugin in self.plugins.iter() {
            request = plugin.prepare(request);
        }
        for plugin in self.plugins.iter() {
            plugin.will_send(&request);
        }
        request
    }

    async fn send(&self, request: reqwest::Request) -> Result<Response, Error> {
        let response = self.http.execute(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("plugins", &self.plugins.len())
            .finish_non_exhaustive()
    }
}

/// Configures a [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    http: Option<reqwest::Client>,
    plugins: Vec<Arc<dyn Plugin>>,
}

impl ClientBuilder {
    /// Uses a preconfigured `reqwest` client instead of the default one.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Registers a plugin. Hooks run in registration order.
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    pub fn build(self) -> Client {
        Client {
            http: self.http.unwrap_or_default(),
            plugins: self.plugins.into(),
        }
    }
}

/// Converts a [`Response`][reqwest::Response] you already hold into an
/// [`SseStream`], for callers driving `reqwest` themselves.
pub fn response_to_stream(response: reqwest::Response) -> SseStream {
    EventStream::new(BodyDataStream::new(Body::from(response)))
}
