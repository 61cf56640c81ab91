//! A clonable router handle that allows registration while serving.
//!
//! [`TreeMux`] itself separates registration (`&mut self`) from lookup
//! (`&self`), so a fully built router needs no synchronization at all.
//! [`SharedTreeMux`] is the opt-in alternative for applications that add
//! routes after the server has started: it holds the router under an
//! `RwLock`, takes the shared lock per lookup, and never holds the lock
//! across a handler await.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use http::Method;

use treemux_rs_core::TreemuxResult;

use crate::handler::{Handler, Request, Response};
use crate::mux::{Lookup, TreeMux};
use crate::serve;

/// A shared, mutable-while-serving wrapper around [`TreeMux`].
///
/// Clones share the same underlying router.
#[derive(Clone)]
pub struct SharedTreeMux {
    inner: Arc<RwLock<TreeMux>>,
}

impl SharedTreeMux {
    /// Wraps an already configured router.
    #[must_use]
    pub fn new(mux: TreeMux) -> Self {
        Self {
            inner: Arc::new(RwLock::new(mux)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, TreeMux> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TreeMux> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with exclusive access to the router, for configuration
    /// changes beyond route registration.
    pub fn update<R>(&self, f: impl FnOnce(&mut TreeMux) -> R) -> R {
        f(&mut self.write())
    }

    /// Registers `handler` for `method` on `pattern`. See
    /// [`TreeMux::handle`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`TreeMux::handle`].
    pub fn handle(&self, method: Method, pattern: &str, handler: Handler) -> TreemuxResult<()> {
        self.write().handle(method, pattern, handler)
    }

    /// Registers a GET handler. See [`TreeMux::handle`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`TreeMux::handle`].
    pub fn get(&self, pattern: &str, handler: Handler) -> TreemuxResult<()> {
        self.handle(Method::GET, pattern, handler)
    }

    /// Registers a POST handler. See [`TreeMux::handle`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`TreeMux::handle`].
    pub fn post(&self, pattern: &str, handler: Handler) -> TreemuxResult<()> {
        self.handle(Method::POST, pattern, handler)
    }

    /// Registers a PUT handler. See [`TreeMux::handle`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`TreeMux::handle`].
    pub fn put(&self, pattern: &str, handler: Handler) -> TreemuxResult<()> {
        self.handle(Method::PUT, pattern, handler)
    }

    /// Registers a PATCH handler. See [`TreeMux::handle`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`TreeMux::handle`].
    pub fn patch(&self, pattern: &str, handler: Handler) -> TreemuxResult<()> {
        self.handle(Method::PATCH, pattern, handler)
    }

    /// Registers a DELETE handler. See [`TreeMux::handle`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`TreeMux::handle`].
    pub fn delete(&self, pattern: &str, handler: Handler) -> TreemuxResult<()> {
        self.handle(Method::DELETE, pattern, handler)
    }

    /// Registers a HEAD handler. See [`TreeMux::handle`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`TreeMux::handle`].
    pub fn head(&self, pattern: &str, handler: Handler) -> TreemuxResult<()> {
        self.handle(Method::HEAD, pattern, handler)
    }

    /// Registers an OPTIONS handler. See [`TreeMux::handle`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`TreeMux::handle`].
    pub fn options(&self, pattern: &str, handler: Handler) -> TreemuxResult<()> {
        self.handle(Method::OPTIONS, pattern, handler)
    }

    /// Routes `path` for `method` under the shared lock. See
    /// [`TreeMux::route`].
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Lookup {
        self.read().route(method, path)
    }

    /// Serves one request. The shared lock is released before any handler
    /// future runs.
    pub async fn dispatch(&self, req: Request) -> Response {
        let (outcome, aux) = {
            let mux = self.read();
            let path = mux.request_path(&req);
            (mux.route(req.method(), &path), mux.aux_handlers())
        };
        serve::run(outcome, aux, req).await
    }

    /// Converts the handle into an axum `Router`. Other clones of the
    /// handle can keep registering routes while it serves.
    #[must_use]
    pub fn into_axum_router(self) -> axum::Router {
        let shared = self;
        let handler = move |req: Request| {
            let shared = shared.clone();
            async move { shared.dispatch(req).await }
        };

        axum::Router::new()
            .route("/{*path}", axum::routing::any(handler.clone()))
            .route("/", axum::routing::any(handler))
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

impl std::fmt::Debug for SharedTreeMux {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedTreeMux")
            .field("mux", &*self.read())
            .finish()
    }
}
