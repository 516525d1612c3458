//! Request identification and URL reconstruction.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the client sent none
//! - Rebuild the absolute request URL handed to handlers
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A client-supplied `x-request-id` is kept as-is

use axum::http::{header, HeaderName, HeaderValue, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use url::Url;
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Fills `x-request-id` with a random UUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Request ID header value, if present and printable.
pub fn request_id<B>(request: &Request<B>) -> Option<String> {
    request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Absolute URL of a request.
///
/// Origin-form URIs are resolved against the `Host` header, or
/// `localhost` when it is missing or unusable.
pub fn full_url<B>(request: &Request<B>) -> Result<Url, url::ParseError> {
    let uri = request.uri();
    if let Some(url) = absolute_url(uri) {
        return Ok(url);
    }

    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    Url::parse(&format!("http://{}{}", host, path))
        .or_else(|_| Url::parse(&format!("http://localhost{}", path)))
}

fn absolute_url(uri: &Uri) -> Option<Url> {
    uri.scheme()?;
    Url::parse(&uri.to_string()).ok()
}
