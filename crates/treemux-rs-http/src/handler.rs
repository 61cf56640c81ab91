//! Handler type aliases and the built-in fallback responders.

use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::response::IntoResponse;
use http::{header, Method, StatusCode};

/// The request type handlers receive.
pub type Request = axum::extract::Request;

/// The response type handlers produce.
pub type Response = axum::response::Response;

/// A boxed future resolving to a [`Response`].
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// The type for route handler functions.
///
/// A handler is an async function that takes a [`Request`] and returns a
/// [`Response`]. It is wrapped in an `Arc` so it can be shared across
/// threads. Use [`handler_fn`] to build one from an ordinary async closure.
pub type Handler = Arc<dyn Fn(Request) -> BoxFuture + Send + Sync>;

/// Handler for requests whose path matched but whose method did not.
///
/// The second argument is the union of methods the path supports, sorted
/// by name.
pub type MethodNotAllowedHandler = Arc<dyn Fn(Request, Vec<Method>) -> BoxFuture + Send + Sync>;

/// Recovery hook invoked when a route handler panics: request method,
/// request path, and the panic payload.
pub type PanicHandler = Arc<dyn Fn(&Method, &str, Box<dyn Any + Send>) -> Response + Send + Sync>;

/// Wraps an async function or closure as a [`Handler`].
///
/// # Examples
///
/// ```
/// use treemux_rs_http::handler_fn;
///
/// let handler = handler_fn(|_req| async { "hello" });
/// ```
pub fn handler_fn<F, Fut, R>(f: F) -> Handler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    Arc::new(move |req| {
        let fut = f(req);
        Box::pin(async move { fut.await.into_response() })
    })
}

pub(crate) fn default_not_found() -> Handler {
    handler_fn(|_req| async { (StatusCode::NOT_FOUND, "404 page not found\n") })
}

pub(crate) fn default_method_not_allowed() -> MethodNotAllowedHandler {
    Arc::new(|_req, allowed| {
        Box::pin(async move {
            let joined = allowed
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, joined)]).into_response()
        })
    })
}

pub(crate) fn default_panic_handler() -> PanicHandler {
    Arc::new(|method, path, payload| {
        let detail = panic_message(payload.as_ref());
        tracing::error!(%method, path, detail, "handler panicked");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
