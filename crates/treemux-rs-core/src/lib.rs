//! # treemux-rs-core
//!
//! The matching engine behind treemux-rs: a radix tree keyed on URL path
//! bytes with backtracking lookup, plus the path utilities and the request
//! parameter context it produces. This crate has no async or transport
//! dependencies and provides the foundation for the router crate.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result alias
//! - [`path`] - Path splitting and canonicalization
//! - [`tree`] - The radix tree: insertion and backtracking search
//! - [`context`] - Per-request parameter bindings

pub mod context;
pub mod error;
pub mod path;
pub mod tree;

// Re-export the most commonly used types at the crate root.
pub use context::{catch_all, param, RouteContext};
pub use error::{TreemuxError, TreemuxResult};
