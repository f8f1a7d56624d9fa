//! Declarative endpoint descriptions.
//!
//! An [`Endpoint`] names everything the client needs to build one request:
//! base address, path, method, headers, and exactly one body-encoding
//! [`Task`]. Endpoint definitions stay free of transport concerns; plugins
//! and the client supply those around them.

use bytes::Bytes;
use reqwest::{Method, Url, header::HeaderMap};
use serde::Serialize;
use serde_json::Value;

use crate::errors::EncodeError;

/// Named request parameters with tagged values.
///
/// Values are [`serde_json::Value`], so encoding strategies pattern-match the
/// shape of each value exhaustively instead of stringifying blindly.
pub type Parameters = serde_json::Map<String, Value>;

/// How one request's body (or query string) is produced.
#[derive(Debug, Clone)]
pub enum Task {
    /// No body.
    Plain,
    /// Raw bytes sent as-is.
    Bytes(Bytes),
    /// A JSON body. `content-type: application/json` is set unless the
    /// endpoint already chose one.
    Json(Value),
    /// Named parameters handed to an encoding strategy.
    Parameters {
        params: Parameters,
        encoding: ParameterEncoding,
    },
}

impl Task {
    /// JSON-encodes any serializable payload.
    pub fn json<T: Serialize>(payload: &T) -> Result<Task, EncodeError> {
        Ok(Task::Json(serde_json::to_value(payload)?))
    }

    /// Parameters appended to the URL query string.
    pub fn query(params: Parameters) -> Task {
        Task::Parameters {
            params,
            encoding: ParameterEncoding::Query,
        }
    }

    /// Parameters sent as a JSON object body.
    pub fn json_params(params: Parameters) -> Task {
        Task::Parameters {
            params,
            encoding: ParameterEncoding::JsonBody,
        }
    }
}

/// Where a [`Task::Parameters`] map ends up on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterEncoding {
    /// Appended to the URL query string. Values must be scalars; `null`
    /// parameters are omitted.
    Query,
    /// Serialized as a JSON object body.
    JsonBody,
}

/// A declarative description of one API endpoint.
///
/// ```rust
/// use eventline::Endpoint;
/// use reqwest::Url;
///
/// struct UserFeed {
///     user: u64,
/// }
///
/// impl Endpoint for UserFeed {
///     fn base_url(&self) -> Url {
///         Url::parse("https://api.example.com/v1/").unwrap()
///     }
///
///     fn path(&self) -> String {
///         format!("users/{}/feed", self.user)
///     }
/// }
/// ```
pub trait Endpoint {
    /// Base address requests are made against.
    fn base_url(&self) -> Url;

    /// Path resolved against [`base_url`][Endpoint::base_url].
    fn path(&self) -> String;

    fn method(&self) -> Method {
        Method::GET
    }

    fn task(&self) -> Task {
        Task::Plain
    }

    /// Extra headers. Applied before the task runs, so a content type set
    /// here wins over the task's default.
    fn headers(&self) -> Option<HeaderMap> {
        None
    }
}
