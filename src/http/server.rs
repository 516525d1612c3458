//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with a single catch-all fallback
//! - Wire up middleware (request ID, tracing, body limit)
//! - Resolve every request against the current route table snapshot
//! - Serve until the shutdown future resolves

use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RouterConfig;
use crate::dispatch::Dispatcher;
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::routing::RouteTableHandle;

/// Application state injected into the fallback handler.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTableHandle>,
    pub dispatcher: Arc<Dispatcher>,
}

/// HTTP server exposing the handler routes.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &RouterConfig, routes: Arc<RouteTableHandle>) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(
            &config.dispatch,
            config.listener.max_body_size,
        ));
        let state = AppState { routes, dispatcher };

        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(&X_REQUEST_ID)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id = %request_id,
                    )
                }),
            )
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_size));

        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(middleware)
    }

    /// The fully layered router, for serving or for driving with `oneshot`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Every request lands here: resolve against the current snapshot, then dispatch.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let table = state.routes.snapshot();
    let method = request.method().clone();
    let result = table.resolve(request.uri().path());
    state.dispatcher.handle(&method, result, request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{ApiRequest, ApiResponse, HandlerModule, LoadedHandler};
    use crate::routing::RouteTable;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    async fn hello(_req: ApiRequest) -> ApiResponse {
        ApiResponse::text("hi")
    }

    fn server() -> HttpServer {
        let config = RouterConfig::default();
        let table = RouteTable::build(
            vec![LoadedHandler::new("hello", HandlerModule::new().get(hello))],
            &config.routes,
        )
        .unwrap();
        HttpServer::new(&config, Arc::new(RouteTableHandle::new(table)))
    }

    #[tokio::test]
    async fn test_request_id_is_generated_and_propagated() {
        let response = server()
            .router()
            .oneshot(Request::get("/hello").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(&X_REQUEST_ID));
    }

    #[tokio::test]
    async fn test_client_request_id_is_kept() {
        let response = server()
            .router()
            .oneshot(
                Request::get("/missing")
                    .header(&X_REQUEST_ID, "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[&X_REQUEST_ID], "abc-123");
    }

    #[tokio::test]
    async fn test_reserved_namespace_not_routed() {
        let response = server()
            .router()
            .oneshot(Request::get("/_api-routes/hello").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
