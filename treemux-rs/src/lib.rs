//! # treemux-rs
//!
//! A tree-based HTTP request multiplexer with backtracking route lookup.
//!
//! Routes are radix-tree patterns where `:name` matches one path segment
//! and a trailing `*name` matches the remaining suffix. Static routes win
//! over wildcards, wildcards over catch-alls, and a deeper route that
//! cannot serve the request method falls through to a shallower one that
//! can.
//!
//! This is the meta-crate that re-exports the implementation crates; most
//! applications only need the types at the root.
//!
//! # Examples
//!
//! ```
//! use treemux_rs::{handler_fn, Lookup, Method, TreeMux};
//!
//! # fn main() -> treemux_rs::TreemuxResult<()> {
//! let mut mux = TreeMux::new();
//! mux.get("/hello/:name", handler_fn(|req| async move {
//!     format!("hello, {}", treemux_rs::param(&req, "name"))
//! }))?;
//! mux.get("/static/*filepath", handler_fn(|req| async move {
//!     treemux_rs::catch_all(&req).to_owned()
//! }))?;
//!
//! assert!(matches!(mux.route(&Method::GET, "/hello/world"), Lookup::Matched(_)));
//! assert!(matches!(mux.route(&Method::GET, "/nope"), Lookup::NotFound));
//! # Ok(())
//! # }
//! ```

/// Radix tree, path utilities, request context, and error types.
pub use treemux_rs_core as core;

/// The router: registration, lookup, redirects, groups, and serving.
pub use treemux_rs_http as http;

// Re-export the most commonly used types at the crate root.
pub use treemux_rs_core::{catch_all, param, RouteContext, TreemuxError, TreemuxResult};
pub use treemux_rs_http::{
    handler_fn, Group, Handler, Lookup, Method, PathSource, RedirectBehavior, RouteMatch,
    SharedTreeMux, StatusCode, TreeMux,
};
