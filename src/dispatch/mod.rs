//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! MatchResult + Request<Body>
//!     → NoMatch                          → 404
//!     → method not exported / unknown    → 405 + Allow
//!     → ApiRequest (url, headers, params, lazy body)
//!     → handler under deadline + panic guard
//!         → Ok(Some(response))           → handler status
//!         → Ok(None)                     → empty 200
//!         → Err / panic                  → 500 (error logged only)
//!         → deadline elapsed             → 504
//! ```
//!
//! # Design Decisions
//! - Exactly one response per request; nothing escapes `handle`
//! - The handler runs on the request's own task, so a dropped connection
//!   drops the handler future with it

pub mod outcome;

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::FutureExt;

use crate::config::DispatchConfig;
use crate::handler::{ApiRequest, HttpMethod};
use crate::http::{request as http_request, response};
use crate::observability::metrics;
use crate::resilience::timeouts::{effective_deadline, with_deadline};
use crate::routing::{MatchResult, RouteMatch};

pub use outcome::DispatchOutcome;

/// Invokes matched handlers and turns every outcome into a response.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    default_timeout: Option<Duration>,
    body_limit: usize,
}

impl Dispatcher {
    pub fn new(config: &DispatchConfig, body_limit: usize) -> Self {
        Self {
            default_timeout: config.handler_timeout(),
            body_limit,
        }
    }

    /// Produce the response for one request.
    pub async fn handle(&self, method: &Method, result: MatchResult, request: Request<Body>) -> Response {
        let start = Instant::now();
        let request_id = http_request::request_id(&request);
        let path = request.uri().path().to_string();

        let (route, outcome, response) = match result {
            MatchResult::NoMatch => (
                metrics::UNMATCHED_ROUTE.to_string(),
                DispatchOutcome::NotFound,
                response::not_found(),
            ),
            MatchResult::Matched(matched) => {
                let route = matched.entry.pattern.to_string();
                let (outcome, response) = self
                    .invoke(method, matched, request, request_id.clone())
                    .await;
                (route, outcome, response)
            }
        };

        let status = outcome.status();
        let request_id = request_id.as_deref().unwrap_or("-");
        match outcome {
            DispatchOutcome::Failed | DispatchOutcome::TimedOut => tracing::warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                route = %route,
                status = status.as_u16(),
                outcome = %outcome,
                "Request dispatched"
            ),
            _ => tracing::debug!(
                request_id = %request_id,
                method = %method,
                path = %path,
                route = %route,
                status = status.as_u16(),
                outcome = %outcome,
                "Request dispatched"
            ),
        }
        metrics::record_request(method.as_str(), &route, status.as_u16(), start);

        response
    }

    async fn invoke(
        &self,
        method: &Method,
        matched: RouteMatch,
        request: Request<Body>,
        request_id: Option<String>,
    ) -> (DispatchOutcome, Response) {
        let RouteMatch { entry, params } = matched;
        let allowed = entry.methods();

        let exported = HttpMethod::from_http(method)
            .and_then(|m| entry.module.handler(m).cloned().map(|handler| (m, handler)));
        let Some((http_method, handler)) = exported else {
            return (
                DispatchOutcome::MethodNotAllowed { allowed },
                response::method_not_allowed(allowed),
            );
        };

        let url = match http_request::full_url(&request) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, uri = %request.uri(), "Cannot build request URL");
                return (DispatchOutcome::BadRequest, response::bad_request("invalid request URL"));
            }
        };

        let (parts, body) = request.into_parts();
        let api_request = ApiRequest::new(http_method, url, parts.headers, body)
            .with_params(params)
            .with_request_id(request_id.clone())
            .with_body_limit(self.body_limit);

        let deadline = effective_deadline(entry.timeout, self.default_timeout);
        let invocation = AssertUnwindSafe(async move { handler(api_request).await }).catch_unwind();
        let request_id = request_id.as_deref().unwrap_or("-");

        match with_deadline(deadline, invocation).await {
            Ok(Ok(Ok(Some(api_response)))) => (
                DispatchOutcome::Completed {
                    status: api_response.status(),
                },
                api_response.into_response(),
            ),
            Ok(Ok(Ok(None))) => (
                DispatchOutcome::Completed {
                    status: StatusCode::OK,
                },
                StatusCode::OK.into_response(),
            ),
            Ok(Ok(Err(error))) => {
                tracing::error!(
                    request_id = %request_id,
                    handler = %entry.identifier,
                    error = %error,
                    "Handler returned an error"
                );
                (DispatchOutcome::Failed, response::internal_error())
            }
            Ok(Err(panic)) => {
                tracing::error!(
                    request_id = %request_id,
                    handler = %entry.identifier,
                    panic = %panic_message(panic.as_ref()),
                    "Handler panicked"
                );
                (DispatchOutcome::Failed, response::internal_error())
            }
            Err(elapsed) => {
                tracing::warn!(
                    request_id = %request_id,
                    handler = %entry.identifier,
                    error = %elapsed,
                    "Handler timed out"
                );
                (DispatchOutcome::TimedOut, response::gateway_timeout())
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoutesConfig;
    use crate::handler::{ApiResponse, HandlerError, HandlerModule, LoadedHandler};
    use crate::routing::RouteTable;
    use axum::http::header;
    use serde_json::{json, Value};

    async fn hello(_req: ApiRequest) -> ApiResponse {
        ApiResponse::json(json!({ "hello": "world" }))
    }

    async fn post(req: ApiRequest) -> ApiResponse {
        ApiResponse::json(json!({ "post": req.param("post") }))
    }

    async fn echo(mut req: ApiRequest) -> Result<ApiResponse, HandlerError> {
        let body: Value = req.json().await?;
        Ok(ApiResponse::json(body).with_status(StatusCode::CREATED))
    }

    async fn failing(_req: ApiRequest) -> Result<ApiResponse, HandlerError> {
        Err("database password is hunter2".into())
    }

    async fn panicking(_req: ApiRequest) -> ApiResponse {
        panic!("secret panic detail")
    }

    async fn silent(_req: ApiRequest) {}

    async fn slow(_req: ApiRequest) -> ApiResponse {
        tokio::time::sleep(Duration::from_secs(5)).await;
        ApiResponse::empty()
    }

    fn table() -> RouteTable {
        let handlers = vec![
            LoadedHandler::new("hello", HandlerModule::new().get(hello)),
            LoadedHandler::new("blog/[post]", HandlerModule::new().get(post).delete(silent)),
            LoadedHandler::new("echo", HandlerModule::new().post(echo)),
            LoadedHandler::new("fail", HandlerModule::new().get(failing)),
            LoadedHandler::new("panic", HandlerModule::new().get(panicking)),
            LoadedHandler::new("slow", HandlerModule::new().get(slow))
                .with_timeout(Duration::from_millis(20)),
        ];
        RouteTable::build(handlers, &RoutesConfig::default()).unwrap()
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(&DispatchConfig::default(), 1024)
    }

    async fn send(method: Method, uri: &str, body: Body) -> Response {
        let table = table();
        let request = Request::builder()
            .method(method.clone())
            .uri(uri)
            .header(header::HOST, "test.local")
            .body(body)
            .unwrap();
        let result = table.resolve(request.uri().path());
        dispatcher().handle(&method, result, request).await
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_get_returns_handler_json() {
        let response = send(Method::GET, "/hello", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_json(response).await, json!({ "hello": "world" }));
    }

    #[tokio::test]
    async fn test_unexported_method_is_405() {
        let response = send(Method::POST, "/hello", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET");
        assert_eq!(body_json(response).await["allowed"], json!(["GET"]));
    }

    #[tokio::test]
    async fn test_unsupported_method_is_405() {
        let trace = Method::from_bytes(b"TRACE").unwrap();
        let response = send(trace, "/blog/1", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, DELETE");
    }

    #[tokio::test]
    async fn test_params_reach_handler() {
        let response = send(Method::GET, "/blog/42", Body::empty()).await;
        assert_eq!(body_json(response).await, json!({ "post": "42" }));
    }

    #[tokio::test]
    async fn test_no_match_is_404() {
        let response = send(Method::GET, "/missing", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_handler_error_is_generic_500() {
        let response = send(Method::GET, "/fail", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body_text(response).await.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_panic_is_generic_500() {
        let response = send(Method::GET, "/panic", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body_text(response).await.contains("secret"));
    }

    #[tokio::test]
    async fn test_no_response_is_empty_200() {
        let response = send(Method::DELETE, "/blog/42", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_route_deadline_is_504() {
        let response = send(Method::GET, "/slow", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_json_body_and_status() {
        let response = send(Method::POST, "/echo", Body::from(r#"{"n":1}"#)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await, json!({ "n": 1 }));
    }

    #[tokio::test]
    async fn test_oversized_body_fails_handler() {
        let big = format!(r#"{{"pad":"{}"}}"#, "x".repeat(4096));
        let response = send(Method::POST, "/echo", Body::from(big)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(3_u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
