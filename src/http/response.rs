//! Fallback responses produced by the router itself.
//!
//! # Responsibilities
//! - 404 when no route matches
//! - 405 with `Allow` when the route does not export the method
//! - 500 / 504 when the handler fails or runs past its deadline
//!
//! # Design Decisions
//! - Bodies are small JSON documents; handler error details never appear

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::handler::MethodSet;

pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not Found" }))).into_response()
}

/// 405 listing the methods the matched route does export.
pub fn method_not_allowed(allowed: MethodSet) -> Response {
    let mut response = (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method Not Allowed", "allowed": allowed })),
    )
        .into_response();

    if let Ok(value) = HeaderValue::from_str(&allowed.to_string()) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}

pub fn bad_request(reason: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": reason }))).into_response()
}

pub fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal Server Error" })),
    )
        .into_response()
}

pub fn gateway_timeout() -> Response {
    (
        StatusCode::GATEWAY_TIMEOUT,
        Json(json!({ "error": "Gateway Timeout" })),
    )
        .into_response()
}
