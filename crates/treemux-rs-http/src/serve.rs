//! Serving: request dispatch, panic recovery, and the axum bridge.
//!
//! [`TreeMux::dispatch`] turns one transport request into a response:
//! select the path representation, route it, attach the parameter context,
//! and render the disposition. Handler panics are caught around the whole
//! dispatch future and turned into responses by the configured hook.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::any;
use futures_util::FutureExt;
use http::{header, HeaderValue, StatusCode};
use percent_encoding::percent_decode_str;

use treemux_rs_core::TreemuxResult;

use crate::config::PathSource;
use crate::handler::{Handler, MethodNotAllowedHandler, PanicHandler, Request, Response};
use crate::mux::{Lookup, TreeMux};

/// The fallback handlers a dispatch needs after the routing decision. They
/// are cloned out of the router so no borrow of it outlives the lookup.
#[derive(Clone)]
pub(crate) struct AuxHandlers {
    pub(crate) not_found: Handler,
    pub(crate) method_not_allowed: MethodNotAllowedHandler,
    pub(crate) panic: PanicHandler,
}

impl TreeMux {
    pub(crate) fn aux_handlers(&self) -> AuxHandlers {
        AuxHandlers {
            not_found: self.not_found_handler.clone(),
            method_not_allowed: self.method_not_allowed_handler.clone(),
            panic: self.panic_handler.clone(),
        }
    }

    /// The request path in the representation selected by
    /// [`Self::path_source`], without the query string.
    pub(crate) fn request_path(&self, req: &Request) -> String {
        let raw = req.uri().path();
        match self.path_source {
            PathSource::RequestUri => raw.to_owned(),
            PathSource::DecodedPath => {
                percent_decode_str(raw).decode_utf8_lossy().into_owned()
            }
        }
    }

    /// Serves one request to completion: routing, context attachment,
    /// redirect/404/405 rendering, and panic recovery.
    pub async fn dispatch(&self, req: Request) -> Response {
        let path = self.request_path(&req);
        let outcome = self.route(req.method(), &path);
        run(outcome, self.aux_handlers(), req).await
    }

    /// Converts the router into an axum `Router` that serves every path
    /// and method through the tree.
    #[must_use]
    pub fn into_axum_router(self) -> axum::Router {
        let mux = Arc::new(self);
        let handler = move |req: Request| {
            let mux = mux.clone();
            async move { mux.dispatch(req).await }
        };

        axum::Router::new()
            .route("/{*path}", any(handler.clone()))
            .route("/", any(handler))
    }

    /// Binds `addr` and serves requests until the server is stopped.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the address or serving fails.
    pub async fn run(self, addr: &str) -> TreemuxResult<()> {
        let router = self.into_axum_router();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("listening on http://{addr}/");
        axum::serve(listener, router).await?;
        Ok(())
    }
}

/// Renders a routing disposition, catching panics from the handler.
pub(crate) async fn run(outcome: Lookup, aux: AuxHandlers, req: Request) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    match AssertUnwindSafe(run_inner(outcome, aux.clone(), req))
        .catch_unwind()
        .await
    {
        Ok(response) => response,
        Err(payload) => (aux.panic)(&method, &path, payload),
    }
}

async fn run_inner(outcome: Lookup, aux: AuxHandlers, mut req: Request) -> Response {
    match outcome {
        Lookup::Matched(m) => {
            req.extensions_mut().insert(m.context);
            (m.handler)(req).await
        }
        Lookup::Redirect { path, status } => {
            let location = match req.uri().query() {
                Some(query) => format!("{path}?{query}"),
                None => path,
            };
            redirect_response(status, &location)
        }
        Lookup::MethodNotAllowed { allowed } => (aux.method_not_allowed)(req, allowed).await,
        Lookup::NotFound => (aux.not_found)(req).await,
    }
}

fn redirect_response(status: StatusCode, location: &str) -> Response {
    // A decoded path can carry non-ASCII bytes, which are still legal in
    // the header as obs-text.
    match HeaderValue::from_bytes(location.as_bytes()) {
        Ok(value) => (status, [(header::LOCATION, value)]).into_response(),
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}
