//! Per-method handler tables.
//!
//! # Design Decisions
//! - A module is a fixed-size table indexed by [`HttpMethod`], filled once
//!   when the module is registered and never mutated afterwards
//! - A missing slot is a valid state; the dispatcher answers it with 405
//! - Handlers are type-erased to boxed `Send` futures so modules can be shared
//!   across request tasks

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::handler::method::{HttpMethod, MethodSet};
use crate::handler::request::ApiRequest;
use crate::handler::response::ApiResponse;

/// Error raised from inside a handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// `Ok(None)` means the handler finished without producing a response.
pub type HandlerResult = Result<Option<ApiResponse>, HandlerError>;

/// Type-erased handler function.
pub type HandlerFn = Arc<dyn Fn(ApiRequest) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Values a handler future may resolve to.
pub trait IntoHandlerResult {
    fn into_handler_result(self) -> HandlerResult;
}

impl IntoHandlerResult for ApiResponse {
    fn into_handler_result(self) -> HandlerResult {
        Ok(Some(self))
    }
}

impl IntoHandlerResult for Option<ApiResponse> {
    fn into_handler_result(self) -> HandlerResult {
        Ok(self)
    }
}

impl IntoHandlerResult for () {
    fn into_handler_result(self) -> HandlerResult {
        Ok(None)
    }
}

impl<T: IntoHandlerResult> IntoHandlerResult for Result<T, HandlerError> {
    fn into_handler_result(self) -> HandlerResult {
        self.and_then(IntoHandlerResult::into_handler_result)
    }
}

/// The handlers backing one route.
#[derive(Clone, Default)]
pub struct HandlerModule {
    handlers: [Option<HandlerFn>; 7],
}

impl HandlerModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method`, replacing any previous one.
    pub fn on<F, Fut>(mut self, method: HttpMethod, handler: F) -> Self
    where
        F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoHandlerResult,
    {
        let handler: HandlerFn = Arc::new(move |request| {
            handler(request)
                .map(IntoHandlerResult::into_handler_result)
                .boxed()
        });
        self.handlers[method.index()] = Some(handler);
        self
    }

    pub fn get<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoHandlerResult,
    {
        self.on(HttpMethod::Get, handler)
    }

    pub fn post<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoHandlerResult,
    {
        self.on(HttpMethod::Post, handler)
    }

    pub fn put<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoHandlerResult,
    {
        self.on(HttpMethod::Put, handler)
    }

    pub fn patch<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoHandlerResult,
    {
        self.on(HttpMethod::Patch, handler)
    }

    pub fn delete<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoHandlerResult,
    {
        self.on(HttpMethod::Delete, handler)
    }

    pub fn head<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoHandlerResult,
    {
        self.on(HttpMethod::Head, handler)
    }

    pub fn options<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoHandlerResult,
    {
        self.on(HttpMethod::Options, handler)
    }

    /// The handler exported for `method`, if any.
    pub fn handler(&self, method: HttpMethod) -> Option<&HandlerFn> {
        self.handlers[method.index()].as_ref()
    }

    /// Methods this module exports.
    pub fn methods(&self) -> MethodSet {
        HttpMethod::ALL
            .into_iter()
            .filter(|m| self.handlers[m.index()].is_some())
            .collect()
    }
}

impl fmt::Debug for HandlerModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerModule")
            .field("methods", &self.methods())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::HeaderMap;

    fn request() -> ApiRequest {
        ApiRequest::new(
            HttpMethod::Get,
            url::Url::parse("http://localhost/").unwrap(),
            HeaderMap::new(),
            Body::empty(),
        )
    }

    async fn ok(_req: ApiRequest) -> Result<ApiResponse, HandlerError> {
        Ok(ApiResponse::text("ok"))
    }

    async fn nothing(_req: ApiRequest) {}

    async fn fails(_req: ApiRequest) -> Result<ApiResponse, HandlerError> {
        Err("boom".into())
    }

    #[test]
    fn test_methods_reflect_exports() {
        let module = HandlerModule::new().get(ok).delete(ok);
        assert_eq!(
            module.methods(),
            MethodSet::empty().with(HttpMethod::Get).with(HttpMethod::Delete)
        );
        assert!(module.handler(HttpMethod::Post).is_none());
        assert!(HandlerModule::new().methods().is_empty());
    }

    #[tokio::test]
    async fn test_return_values_are_normalized() {
        let module = HandlerModule::new().get(ok).post(nothing).put(fails);

        let got = module.handler(HttpMethod::Get).unwrap()(request()).await.unwrap();
        assert!(got.is_some());

        let got = module.handler(HttpMethod::Post).unwrap()(request()).await.unwrap();
        assert!(got.is_none());

        let got = module.handler(HttpMethod::Put).unwrap()(request()).await;
        assert_eq!(got.unwrap_err().to_string(), "boom");
    }
}
