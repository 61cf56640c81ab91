//! # treemux-rs-http
//!
//! The TreeMux router: pattern registration with typed conflict errors,
//! the backtracking lookup over the radix tree, trailing-slash and
//! clean-path redirects, route groups, and the axum serving bridge.
//!
//! - [`mux`]: [`TreeMux`] registration, configuration, pure lookup, and
//!   serving (dispatch, panic recovery, the axum bridge)
//! - [`group`]: route groups sharing a path prefix
//! - [`config`]: redirect behavior and path source enums
//! - [`handler`]: handler type aliases and built-in fallback responders
//! - [`shared`]: the lock-guarded handle for registration while serving

pub mod config;
pub mod group;
pub mod handler;
pub mod mux;
mod serve;
pub mod shared;

// Re-export the most commonly used types at the crate root.
pub use config::{PathSource, RedirectBehavior};
pub use group::Group;
pub use handler::{
    handler_fn, BoxFuture, Handler, MethodNotAllowedHandler, PanicHandler, Request, Response,
};
pub use mux::{Lookup, RouteMatch, TreeMux};
pub use shared::SharedTreeMux;

// The http types that appear at the API boundary, so callers do not need
// their own `http` dependency.
pub use http::{Method, StatusCode};
