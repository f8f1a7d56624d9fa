//! Turns an [`Endpoint`] description into a ready-to-send request.

use reqwest::{
    Body, Request,
    header::{CONTENT_TYPE, HeaderValue},
};
use serde_json::Value;

use crate::{
    endpoint::{Endpoint, ParameterEncoding, Parameters, Task},
    errors::{EncodeError, Error},
};

/// Builds the transport-level request: resolves the address, sets method and
/// endpoint headers, applies the task's body encoding. No validation beyond
/// what URL resolution itself performs, and no retries.
pub fn build_request(endpoint: &impl Endpoint) -> Result<Request, Error> {
    let url = endpoint.base_url().join(&endpoint.path())?;
    let mut request = Request::new(endpoint.method(), url);

    if let Some(headers) = endpoint.headers() {
        request.headers_mut().extend(headers);
    }

    apply_task(&mut request, endpoint.task())?;
    Ok(request)
}

fn apply_task(request: &mut Request, task: Task) -> Result<(), EncodeError> {
    match task {
        Task::Plain => Ok(()),
        Task::Bytes(bytes) => {
            *request.body_mut() = Some(Body::from(bytes));
            Ok(())
        }
        Task::Json(value) => set_json_body(request, &value),
        Task::Parameters { params, encoding } => match encoding {
            ParameterEncoding::Query => append_query(request, &params),
            ParameterEncoding::JsonBody => set_json_body(request, &Value::Object(params)),
        },
    }
}

fn set_json_body(request: &mut Request, value: &Value) -> Result<(), EncodeError> {
    let body = serde_json::to_vec(value)?;
    *request.body_mut() = Some(Body::from(body));

    if !request.headers().contains_key(CONTENT_TYPE) {
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    Ok(())
}

fn append_query(request: &mut Request, params: &Parameters) -> Result<(), EncodeError> {
    let mut pairs = request.url_mut().query_pairs_mut();

    for (name, value) in params {
        match value {
            // an unset parameter is simply not sent
            Value::Null => {}
            Value::Bool(flag) => {
                pairs.append_pair(name, if *flag { "true" } else { "false" });
            }
            Value::Number(number) => {
                pairs.append_pair(name, &number.to_string());
            }
            Value::String(text) => {
                pairs.append_pair(name, text);
            }
            Value::Array(_) | Value::Object(_) => {
                return Err(EncodeError::NonScalarQueryValue(name.clone()));
            }
        }
    }
    Ok(())
}
