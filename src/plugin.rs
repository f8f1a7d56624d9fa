//! Cross-cutting request/response middleware.

use reqwest::{
    Request,
    header::{AUTHORIZATION, HeaderValue, InvalidHeaderValue},
};
use tracing::debug;

use crate::{client::Response, errors::Error};

/// Observes or mutates requests and responses without touching endpoint
/// definitions.
///
/// Plugins run in registration order with no short-circuiting, and are
/// expected not to fail: every hook is infallible by signature. All three
/// hooks have do-nothing defaults, so a plugin implements only what it needs.
pub trait Plugin: Send + Sync {
    /// Rewrites the built request before it is sent. Each plugin sees the
    /// previous plugin's output.
    fn prepare(&self, request: Request) -> Request {
        request
    }

    /// Called with the final request, after every `prepare` has run.
    fn will_send(&self, request: &Request) {
        let _ = request;
    }

    /// Called exactly once per send attempt with the terminal outcome,
    /// success or failure. Not called on the streaming path, which has no
    /// single terminal outcome to report.
    fn did_receive(&self, result: &Result<Response, Error>) {
        let _ = result;
    }
}

/// Injects `authorization: Bearer <token>` into requests that don't already
/// carry an authorization header.
#[derive(Debug, Clone)]
pub struct AccessTokenPlugin {
    header: HeaderValue,
}

impl AccessTokenPlugin {
    /// Fails if the token contains bytes that cannot appear in a header.
    pub fn new(token: impl AsRef<str>) -> Result<Self, InvalidHeaderValue> {
        let mut header = HeaderValue::from_str(&format!("Bearer {}", token.as_ref()))?;
        header.set_sensitive(true);
        Ok(Self { header })
    }
}

impl Plugin for AccessTokenPlugin {
    fn prepare(&self, mut request: Request) -> Request {
        if !request.headers().contains_key(AUTHORIZATION) {
            request
                .headers_mut()
                .insert(AUTHORIZATION, self.header.clone());
        }
        request
    }
}

/// Logs outgoing requests and their terminal outcomes at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkLoggerPlugin;

impl Plugin for NetworkLoggerPlugin {
    fn will_send(&self, request: &Request) {
        debug!(method = %request.method(), url = %request.url(), "sending request");
    }

    fn did_receive(&self, result: &Result<Response, Error>) {
        match result {
            Ok(response) => {
                debug!(status = %response.status, bytes = response.body.len(), "request finished");
            }
            Err(error) => debug!(%error, "request failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::{Method, Url};

    fn request() -> Request {
        Request::new(Method::GET, Url::parse("https://example.com/").unwrap())
    }

    #[test]
    fn access_token_is_added_when_missing() {
        let plugin = AccessTokenPlugin::new("s3cret").unwrap();
        let request = plugin.prepare(request());

        let header = request.headers().get(AUTHORIZATION).unwrap();
        assert!(header.is_sensitive());
        assert_eq!(header.to_str().unwrap(), "Bearer s3cret");
    }

    #[test]
    fn existing_authorization_is_left_alone() {
        let plugin = AccessTokenPlugin::new("s3cret").unwrap();

        let mut request = request();
        request
            .headers_mut()
            .insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));

        let request = plugin.prepare(request);
        assert_eq!(
            request.headers().get(AUTHORIZATION).unwrap(),
            "Basic abc"
        );
    }

    #[test]
    fn tokens_with_control_bytes_are_rejected() {
        assert!(AccessTokenPlugin::new("bad\ntoken").is_err());
    }
}
