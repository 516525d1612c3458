//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use api_routes::config::RouterConfig;
use api_routes::handler::{ApiRequest, ApiResponse, HandlerCatalog, HandlerError, HandlerModule};
use api_routes::http::HttpServer;
use api_routes::lifecycle::build_route_table;
use api_routes::routing::RouteTableHandle;
use axum::http::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub async fn hello(_req: ApiRequest) -> ApiResponse {
    ApiResponse::json(json!({ "hello": "world" }))
}

pub async fn post(req: ApiRequest) -> ApiResponse {
    ApiResponse::json(json!({ "post": req.param("post"), "url": req.url().as_str() }))
}

pub async fn docs(req: ApiRequest) -> ApiResponse {
    ApiResponse::json(json!({ "path": req.params().multiple("path") }))
}

pub async fn echo(mut req: ApiRequest) -> Result<ApiResponse, HandlerError> {
    let body: Value = req.json().await?;
    Ok(ApiResponse::json(body).with_status(StatusCode::CREATED))
}

pub async fn broken(_req: ApiRequest) -> Result<ApiResponse, HandlerError> {
    Err("connection string postgres://admin:s3cret@db".into())
}

pub async fn which(req: ApiRequest) -> ApiResponse {
    ApiResponse::text(req.url().path().to_string())
}

/// Handler modules used across the integration suites.
pub fn catalog() -> HandlerCatalog {
    HandlerCatalog::new()
        .register("hello+api.rs", HandlerModule::new().get(hello))
        .register("blog/[post]+api.rs", HandlerModule::new().get(post))
        .register("docs/[...path]+api.rs", HandlerModule::new().get(docs))
        .register("echo+api.rs", HandlerModule::new().post(echo))
        .register("broken+api.rs", HandlerModule::new().get(broken))
}

/// Build the table for `config` and wrap it in a publishable handle.
pub fn routes(config: &RouterConfig, catalog: &HandlerCatalog) -> Arc<RouteTableHandle> {
    let table = build_route_table(config, catalog).expect("route table builds");
    Arc::new(RouteTableHandle::new(table))
}

/// A server running on an ephemeral port. Dropping it shuts the server down.
pub struct TestServer {
    pub addr: SocketAddr,
    pub routes: Arc<RouteTableHandle>,
    _shutdown: oneshot::Sender<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn spawn_server(config: RouterConfig, catalog: HandlerCatalog) -> TestServer {
    let routes = routes(&config, &catalog);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (tx, rx) = oneshot::channel::<()>();
    let server = HttpServer::new(&config, routes.clone());
    tokio::spawn(async move {
        let shutdown = async {
            let _ = rx.await;
        };
        server.run(listener, shutdown).await.unwrap();
    });

    TestServer {
        addr,
        routes,
        _shutdown: tx,
    }
}
