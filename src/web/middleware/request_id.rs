//! # Request ID Middleware
//!
//! Every tile logs the request ID with its outcome, and the ID goes back to
//! the dashboard in `x-request-id`. A card that rendered degraded can then be
//! matched to the server log line that explains it. When the dashboard or a
//! proxy already sent a well-formed ID it is kept, so one ID follows the
//! request end to end.

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_INBOUND_LEN: usize = 128;

/// Request ID stored in the request extensions
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    /// Reuse the caller's ID when it is short and log-safe, otherwise mint one
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let inbound = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| is_log_safe(id));

        match inbound {
            Some(id) => Self(id.to_string()),
            None => Self(Uuid::new_v4().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_log_safe(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_INBOUND_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

/// Attach a [`RequestId`] to the request and echo it on the response
pub async fn add_request_id(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::from_headers(request.headers());
    let echoed = HeaderValue::from_str(request_id.as_str());
    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;
    // only ASCII IDs get this far
    if let Ok(value) = echoed {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
