//! Response object produced by handlers.

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Body carried by an [`ApiResponse`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResponseBody {
    #[default]
    Empty,
    Bytes(Bytes),
    Text(String),
    Json(serde_json::Value),
}

/// What a handler returns: status, headers and body.
#[derive(Debug, Clone, Default)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
}

impl ApiResponse {
    /// An empty `200 OK`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A `200 OK` JSON response with `content-type: application/json`.
    pub fn json(value: serde_json::Value) -> Self {
        Self::default()
            .with_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(ResponseBody::Json(value))
    }

    /// Serialize any value into a JSON response.
    pub fn try_json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::json(serde_json::to_value(value)?))
    }

    /// A `200 OK` plain text response.
    pub fn text(text: impl Into<String>) -> Self {
        Self::default()
            .with_header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            )
            .with_body(ResponseBody::Text(text.into()))
    }

    /// A `200 OK` response with raw bytes.
    pub fn bytes(bytes: impl Into<Bytes>) -> Self {
        Self::default().with_body(ResponseBody::Bytes(bytes.into()))
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: ResponseBody) -> Self {
        self.body = body;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let body = match self.body {
            ResponseBody::Empty => Body::empty(),
            ResponseBody::Bytes(bytes) => Body::from(bytes),
            ResponseBody::Text(text) => Body::from(text),
            ResponseBody::Json(value) => Body::from(value.to_string()),
        };

        let mut response = Response::new(body);
        *response.status_mut() = self.status;
        response.headers_mut().extend(self.headers);
        response
    }
}
