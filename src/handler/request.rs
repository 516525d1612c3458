//! Request object handed to handlers.

use axum::body::{Body, Bytes};
use axum::http::HeaderMap;
use serde::de::DeserializeOwned;
use url::Url;

use crate::handler::method::HttpMethod;
use crate::routing::ParameterBindings;

/// Errors raised while reading a request body.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("request body could not be read: {0}")]
    Read(#[from] axum::Error),

    #[error("request body has already been consumed")]
    Consumed,

    #[error("request body is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("request body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The request as seen by a handler.
///
/// The body is read lazily and only once; later reads fail with
/// [`BodyError::Consumed`].
pub struct ApiRequest {
    method: HttpMethod,
    url: Url,
    headers: HeaderMap,
    params: ParameterBindings,
    request_id: Option<String>,
    body: Option<Body>,
    body_limit: usize,
}

impl std::fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("params", &self.params)
            .field("request_id", &self.request_id)
            .field("body_consumed", &self.body.is_none())
            .finish()
    }
}

impl ApiRequest {
    pub fn new(method: HttpMethod, url: Url, headers: HeaderMap, body: Body) -> Self {
        Self {
            method,
            url,
            headers,
            params: ParameterBindings::new(),
            request_id: None,
            body: Some(body),
            body_limit: usize::MAX,
        }
    }

    pub fn with_params(mut self, params: ParameterBindings) -> Self {
        self.params = params;
        self
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    /// Upper bound on bytes read by [`ApiRequest::bytes`].
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Absolute request URL, including the query string.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Dynamic parameters resolved for the matched route.
    pub fn params(&self) -> &ParameterBindings {
        &self.params
    }

    /// Shorthand for a named capture.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.single(name)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Read the whole body as raw bytes.
    pub async fn bytes(&mut self) -> Result<Bytes, BodyError> {
        let body = self.body.take().ok_or(BodyError::Consumed)?;
        Ok(axum::body::to_bytes(body, self.body_limit).await?)
    }

    /// Read the whole body as UTF-8 text.
    pub async fn text(&mut self) -> Result<String, BodyError> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// Read the whole body and deserialize it from JSON.
    pub async fn json<T: DeserializeOwned>(&mut self) -> Result<T, BodyError> {
        let bytes = self.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
