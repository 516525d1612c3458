//! Handler modules linked into the `api-routes` binary.

use api_routes::handler::{ApiRequest, ApiResponse, HandlerCatalog, HandlerError, HandlerModule};
use axum::http::StatusCode;
use serde_json::{json, Value};

async fn hello(_req: ApiRequest) -> ApiResponse {
    ApiResponse::json(json!({ "hello": "world" }))
}

async fn get_post(req: ApiRequest) -> Result<ApiResponse, HandlerError> {
    let post = req.param("post").ok_or("post parameter missing")?;
    Ok(ApiResponse::json(json!({ "post": post })))
}

async fn delete_post(req: ApiRequest) {
    tracing::info!(post = ?req.param("post"), "Post deleted");
}

async fn echo(mut req: ApiRequest) -> Result<ApiResponse, HandlerError> {
    let body: Value = req.json().await?;
    Ok(ApiResponse::json(body).with_status(StatusCode::CREATED))
}

async fn docs(req: ApiRequest) -> ApiResponse {
    let path = req.params().multiple("path").unwrap_or_default();
    ApiResponse::json(json!({ "path": path, "url": req.url().as_str() }))
}

async fn about(_req: ApiRequest) -> ApiResponse {
    ApiResponse::text("api-routes demo")
}

/// Every handler module this binary can serve.
pub fn catalog() -> HandlerCatalog {
    HandlerCatalog::new()
        .register("hello+api.rs", HandlerModule::new().get(hello))
        .register(
            "blog/[post]+api.rs",
            HandlerModule::new().get(get_post).delete(delete_post),
        )
        .register("echo+api.rs", HandlerModule::new().post(echo))
        .register("docs/[...path]+api.rs", HandlerModule::new().get(docs))
        .register("(marketing)/about/index+api.rs", HandlerModule::new().get(about))
}
