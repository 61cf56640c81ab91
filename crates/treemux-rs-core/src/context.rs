//! Per-request parameter bindings.
//!
//! A successful lookup produces a [`RouteContext`]: the wildcard names of
//! the matched pattern associated with the path segments they captured,
//! plus a reserved slot holding the catch-all suffix when the match ended
//! in a `*name` segment. The router attaches the context to the request's
//! extensions before invoking the handler, so bindings are reachable only
//! through the request being served.
//!
//! The context is built once per dispatch by extending a configured base
//! (if any) with the match's bindings; later bindings shadow earlier ones
//! on lookup. Handlers observe it immutably.

use std::fmt;
use std::slice;

/// Parameter bindings extracted for one matched route.
///
/// # Examples
///
/// ```
/// use treemux_rs_core::RouteContext;
///
/// let ctx = RouteContext::new().with_binding("id", "42");
/// assert_eq!(ctx.param("id"), "42");
/// assert_eq!(ctx.param("missing"), "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteContext {
    bindings: Vec<(String, String)>,
    catch_all: Option<String>,
}

impl RouteContext {
    /// Creates an empty context.
    pub const fn new() -> Self {
        Self {
            bindings: Vec::new(),
            catch_all: None,
        }
    }

    /// Returns a copy of this context with one more binding appended.
    #[must_use]
    pub fn with_binding(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.bindings.push((name.into(), value.into()));
        self
    }

    /// Appends bindings in order. Used by the router while assembling the
    /// context for a match; later entries shadow earlier ones on lookup.
    pub fn extend_pairs(&mut self, pairs: impl IntoIterator<Item = (String, String)>) {
        self.bindings.extend(pairs);
    }

    /// Stores the catch-all suffix under the reserved slot.
    pub fn set_catch_all(&mut self, value: impl Into<String>) {
        self.catch_all = Some(value.into());
    }

    /// Returns the value bound to `name`, or the empty string when unset.
    pub fn param(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    /// Returns the value bound to `name`, if any. When a name was bound
    /// more than once the most recent binding wins.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the catch-all suffix, or the empty string when the match
    /// did not end in a catch-all segment.
    pub fn catch_all(&self) -> &str {
        self.catch_all.as_deref().unwrap_or("")
    }

    /// Iterates over the bindings in insertion order.
    pub fn iter(&self) -> slice::Iter<'_, (String, String)> {
        self.bindings.iter()
    }

    /// Returns the number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` when no bindings are present.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<'c> IntoIterator for &'c RouteContext {
    type Item = &'c (String, String);
    type IntoIter = slice::Iter<'c, (String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

impl fmt::Display for RouteContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in &self.bindings {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value}")?;
            first = false;
        }
        Ok(())
    }
}

/// Returns the value bound to `name` on this request, or the empty string
/// when the request carries no context or no such binding.
pub fn param<'r, B>(request: &'r http::Request<B>, name: &str) -> &'r str {
    request
        .extensions()
        .get::<RouteContext>()
        .map_or("", |ctx| ctx.param(name))
}

/// Returns the catch-all suffix captured for this request, or the empty
/// string when the match did not end in a catch-all segment.
pub fn catch_all<B>(request: &http::Request<B>) -> &str {
    request
        .extensions()
        .get::<RouteContext>()
        .map_or("", RouteContext::catch_all)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(ctx: RouteContext) -> http::Request<()> {
        let mut req = http::Request::new(());
        req.extensions_mut().insert(ctx);
        req
    }

    #[test]
    fn test_param_lookup() {
        let ctx = RouteContext::new().with_binding("id", "42");
        assert_eq!(ctx.param("id"), "42");
        assert_eq!(ctx.get("id"), Some("42"));
        assert_eq!(ctx.param("other"), "");
        assert_eq!(ctx.get("other"), None);
    }

    #[test]
    fn test_later_bindings_shadow_earlier() {
        let mut ctx = RouteContext::new().with_binding("id", "base");
        ctx.extend_pairs([("id".to_owned(), "route".to_owned())]);
        assert_eq!(ctx.param("id"), "route");
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_catch_all_slot() {
        let mut ctx = RouteContext::new();
        assert_eq!(ctx.catch_all(), "");
        ctx.set_catch_all("banana/cat");
        assert_eq!(ctx.catch_all(), "banana/cat");
    }

    #[test]
    fn test_request_accessors() {
        let mut ctx = RouteContext::new().with_binding("seed", "banana");
        ctx.set_catch_all("banana/cat");
        let req = request_with(ctx);
        assert_eq!(param(&req, "seed"), "banana");
        assert_eq!(param(&req, "nope"), "");
        assert_eq!(catch_all(&req), "banana/cat");
    }

    #[test]
    fn test_accessors_without_context() {
        let req = http::Request::new(());
        assert_eq!(param(&req, "seed"), "");
        assert_eq!(catch_all(&req), "");
    }

    #[test]
    fn test_display_format() {
        let ctx = RouteContext::new()
            .with_binding("a", "1")
            .with_binding("b", "2");
        assert_eq!(ctx.to_string(), "a=1, b=2");
    }
}
