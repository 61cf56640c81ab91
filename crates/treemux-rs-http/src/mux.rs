//! The router itself: registration, configuration, and the pure lookup.
//!
//! [`TreeMux`] owns the routing tree and every behavior knob. Registration
//! takes `&mut self` and reports conflicts as [`TreemuxError`] values;
//! lookup takes `&self`, never mutates, and returns a [`Lookup`]
//! disposition that the serving layer renders into a response.

use std::collections::HashMap;
use std::fmt;

use http::{Method, StatusCode};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use treemux_rs_core::path::clean;
use treemux_rs_core::tree::Node;
use treemux_rs_core::{RouteContext, TreemuxError, TreemuxResult};

use crate::config::{PathSource, RedirectBehavior};
use crate::handler::{
    default_method_not_allowed, default_not_found, default_panic_handler, Handler,
    MethodNotAllowedHandler, PanicHandler,
};
use crate::group::Group;

/// Characters percent-escaped when registering the escaped form of a
/// route; everything a browser would not send verbatim in a path.
const PATTERN_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A tree-based HTTP request multiplexer.
///
/// Routes are `/`-separated patterns where a `:name` segment matches any
/// single path segment and a trailing `*name` segment matches the entire
/// remaining suffix. Static routes win over wildcards, wildcards over
/// catch-alls, and a deeper route that cannot serve the request method
/// falls through to a shallower one that can.
///
/// Configuration lives in public fields and can be changed freely before
/// or between registrations.
///
/// # Examples
///
/// ```
/// use http::Method;
/// use treemux_rs_http::{handler_fn, Lookup, TreeMux};
///
/// # fn main() -> treemux_rs_core::TreemuxResult<()> {
/// let mut mux = TreeMux::new();
/// mux.get("/users/:id", handler_fn(|req| async move {
///     format!("user {}", treemux_rs_core::param(&req, "id"))
/// }))?;
///
/// assert!(matches!(mux.route(&Method::GET, "/users/7"), Lookup::Matched(_)));
/// assert!(matches!(mux.route(&Method::GET, "/nope"), Lookup::NotFound));
/// # Ok(())
/// # }
/// ```
#[allow(clippy::struct_excessive_bools)]
pub struct TreeMux {
    root: Node<Handler>,

    /// Serve HEAD requests with the GET handler when no HEAD handler is
    /// registered for the matched route.
    pub head_can_use_get: bool,
    /// Redirect requests whose trailing slash disagrees with the
    /// registered pattern to the canonical form.
    pub redirect_trailing_slash: bool,
    /// When the exact path misses, retry with the cleaned path (duplicate
    /// slashes collapsed, `.` and `..` resolved) and redirect on a hit.
    pub redirect_clean_path: bool,
    /// Apply trailing-slash redirects to catch-all matches too, which are
    /// otherwise exempt.
    pub remove_catch_all_trailing_slash: bool,
    /// Status used for canonicalization redirects.
    pub redirect_behavior: RedirectBehavior,
    /// Per-method overrides of [`Self::redirect_behavior`].
    pub redirect_method_behavior: HashMap<Method, RedirectBehavior>,
    /// Which representation of the request path is matched.
    pub path_source: PathSource,
    /// Additionally register the percent-escaped form of each pattern when
    /// it differs; wildcard and catch-all tokens are kept verbatim.
    pub escape_added_routes: bool,
    /// Bindings every request context starts from.
    pub default_context: Option<RouteContext>,

    /// Serves requests no route matched.
    pub not_found_handler: Handler,
    /// Serves requests whose path matched but whose method did not.
    pub method_not_allowed_handler: MethodNotAllowedHandler,
    /// When set, serves OPTIONS requests that matched a path lacking its
    /// own OPTIONS handler.
    pub options_handler: Option<Handler>,
    /// Invoked when a route handler panics.
    pub panic_handler: PanicHandler,
}

/// The disposition of one route lookup.
#[derive(Debug)]
pub enum Lookup {
    /// A handler will serve the request.
    Matched(RouteMatch),
    /// The request should be redirected to the canonical path.
    Redirect {
        /// Target path, without the query string.
        path: String,
        status: StatusCode,
    },
    /// Some route matched the full path, but not the request method.
    MethodNotAllowed {
        /// Union of methods registered on every route matching the path,
        /// sorted by name.
        allowed: Vec<Method>,
    },
    /// No route matched.
    NotFound,
}

/// A successful lookup: the handler to invoke and the parameter context
/// extracted from the path.
pub struct RouteMatch {
    pub handler: Handler,
    pub context: RouteContext,
}

impl fmt::Debug for RouteMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl TreeMux {
    /// Creates a router with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::new(),
            head_can_use_get: true,
            redirect_trailing_slash: true,
            redirect_clean_path: true,
            remove_catch_all_trailing_slash: false,
            redirect_behavior: RedirectBehavior::Redirect301,
            redirect_method_behavior: HashMap::new(),
            path_source: PathSource::RequestUri,
            escape_added_routes: false,
            default_context: None,
            not_found_handler: default_not_found(),
            method_not_allowed_handler: default_method_not_allowed(),
            options_handler: None,
            panic_handler: default_panic_handler(),
        }
    }

    /// Registers `handler` for `method` requests on `pattern`.
    ///
    /// When [`Self::redirect_trailing_slash`] is on, a trailing slash on
    /// the pattern is stripped and remembered so requests are redirected
    /// to the slashed form.
    ///
    /// # Errors
    ///
    /// Returns a [`TreemuxError`] when the pattern is malformed or
    /// conflicts with an existing registration.
    pub fn handle(&mut self, method: Method, pattern: &str, handler: Handler) -> TreemuxResult<()> {
        if pattern.is_empty() {
            return Err(TreemuxError::EmptyPattern);
        }
        if !pattern.starts_with('/') {
            return Err(TreemuxError::MissingLeadingSlash(pattern.to_owned()));
        }
        tracing::debug!(%method, pattern, "registering route");

        let add_slash =
            self.redirect_trailing_slash && pattern.len() > 1 && pattern.ends_with('/');
        let trimmed = if add_slash {
            &pattern[..pattern.len() - 1]
        } else {
            pattern
        };

        self.root
            .insert(trimmed, method.clone(), handler.clone(), add_slash)?;

        if self.escape_added_routes {
            let escaped = escape_pattern(trimmed);
            if escaped != trimmed {
                // An explicit registration of the escaped form keeps its
                // own handler.
                match self.root.insert(&escaped, method, handler, add_slash) {
                    Ok(()) | Err(TreemuxError::HandlerConflict { .. }) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(())
    }

    /// Registers a GET handler. See [`Self::handle`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::handle`].
    pub fn get(&mut self, pattern: &str, handler: Handler) -> TreemuxResult<()> {
        self.handle(Method::GET, pattern, handler)
    }

    /// Registers a POST handler. See [`Self::handle`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::handle`].
    pub fn post(&mut self, pattern: &str, handler: Handler) -> TreemuxResult<()> {
        self.handle(Method::POST, pattern, handler)
    }

    /// Registers a PUT handler. See [`Self::handle`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::handle`].
    pub fn put(&mut self, pattern: &str, handler: Handler) -> TreemuxResult<()> {
        self.handle(Method::PUT, pattern, handler)
    }

    /// Registers a PATCH handler. See [`Self::handle`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::handle`].
    pub fn patch(&mut self, pattern: &str, handler: Handler) -> TreemuxResult<()> {
        self.handle(Method::PATCH, pattern, handler)
    }

    /// Registers a DELETE handler. See [`Self::handle`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::handle`].
    pub fn delete(&mut self, pattern: &str, handler: Handler) -> TreemuxResult<()> {
        self.handle(Method::DELETE, pattern, handler)
    }

    /// Registers a HEAD handler. See [`Self::handle`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::handle`].
    pub fn head(&mut self, pattern: &str, handler: Handler) -> TreemuxResult<()> {
        self.handle(Method::HEAD, pattern, handler)
    }

    /// Registers an OPTIONS handler. See [`Self::handle`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::handle`].
    pub fn options(&mut self, pattern: &str, handler: Handler) -> TreemuxResult<()> {
        self.handle(Method::OPTIONS, pattern, handler)
    }

    /// Creates a route group under `prefix`. Routes registered through the
    /// group are prefixed with it.
    ///
    /// # Errors
    ///
    /// Returns a [`TreemuxError`] when the prefix is empty or missing its
    /// leading slash.
    pub fn group(&mut self, prefix: &str) -> TreemuxResult<Group<'_>> {
        Group::new(self, prefix)
    }

    /// Routes `path` for `method` without side effects.
    ///
    /// `path` is the representation selected by [`Self::path_source`],
    /// without the query string. The same arguments always produce the
    /// same disposition.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Lookup {
        let had_trailing = path.len() > 1 && path.ends_with('/');
        let search_path = if had_trailing && self.redirect_trailing_slash {
            &path[..path.len() - 1]
        } else {
            path
        };

        let (found, search_owned) = if let Some(m) =
            self.root
                .search(method, strip_leading(search_path), self.head_can_use_get)
        {
            (m, None)
        } else {
            if !self.redirect_clean_path {
                return Lookup::NotFound;
            }
            // Exact path missed; retry with the canonical form.
            let cleaned = clean(search_path);
            let Some(m) =
                self.root
                    .search(method, strip_leading(&cleaned), self.head_can_use_get)
            else {
                return Lookup::NotFound;
            };
            if let Some(status) = self.redirect_status(method) {
                return Lookup::Redirect {
                    path: cleaned,
                    status,
                };
            }
            (m, Some(cleaned))
        };
        let search_path = search_owned.as_deref().unwrap_or(search_path);

        // The method check precedes slash canonicalization: a wrong-method
        // hit on the normalized path answers 405, not a redirect.
        let mut handler = found.handler().cloned();
        if handler.is_none() && *method == Method::OPTIONS {
            handler = self.options_handler.clone();
        }
        let Some(handler) = handler else {
            return Lookup::MethodNotAllowed {
                allowed: self.allowed_methods(search_path),
            };
        };

        if (!found.is_catch_all() || self.remove_catch_all_trailing_slash)
            && self.redirect_trailing_slash
            && had_trailing != found.add_slash()
        {
            let target = if found.add_slash() {
                format!("{search_path}/")
            } else if search_path != "/" {
                // The slash was already stripped before the search.
                search_path.to_owned()
            } else {
                // The root path never redirects.
                String::new()
            };
            if !target.is_empty() {
                if let Some(status) = self.redirect_status(method) {
                    return Lookup::Redirect {
                        path: target,
                        status,
                    };
                }
            }
        }

        let is_catch_all = found.is_catch_all();
        let decode = self.path_source == PathSource::RequestUri;
        let mut pairs = found.into_params();
        if decode {
            for (_, value) in &mut pairs {
                *value = decode_param(value);
            }
        }

        let mut context = self.default_context.clone().unwrap_or_default();
        if is_catch_all {
            if let Some((_, value)) = pairs.last() {
                context.set_catch_all(value.clone());
            }
        }
        context.extend_pairs(pairs);

        Lookup::Matched(RouteMatch { handler, context })
    }

    /// Union of methods registered on every route matching `path`, sorted
    /// by name. HEAD is implied by GET when [`Self::head_can_use_get`] is
    /// on.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let mut allowed = self.root.allowed_methods(strip_leading(path));
        if self.head_can_use_get
            && allowed.contains(&Method::GET)
            && !allowed.contains(&Method::HEAD)
        {
            allowed.push(Method::HEAD);
        }
        allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        allowed
    }

    fn redirect_status(&self, method: &Method) -> Option<StatusCode> {
        self.redirect_method_behavior
            .get(method)
            .copied()
            .unwrap_or(self.redirect_behavior)
            .status()
    }
}

impl Default for TreeMux {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TreeMux {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeMux")
            .field("head_can_use_get", &self.head_can_use_get)
            .field("redirect_trailing_slash", &self.redirect_trailing_slash)
            .field("redirect_clean_path", &self.redirect_clean_path)
            .field(
                "remove_catch_all_trailing_slash",
                &self.remove_catch_all_trailing_slash,
            )
            .field("redirect_behavior", &self.redirect_behavior)
            .field("path_source", &self.path_source)
            .field("escape_added_routes", &self.escape_added_routes)
            .field("has_options_handler", &self.options_handler.is_some())
            .finish_non_exhaustive()
    }
}

fn strip_leading(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

fn decode_param(raw: &str) -> String {
    // Values that fail to decode are kept verbatim.
    percent_decode_str(raw)
        .decode_utf8()
        .map_or_else(|_| raw.to_owned(), |decoded| decoded.into_owned())
}

fn escape_pattern(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|segment| {
            if segment.starts_with(':') || segment.starts_with('*') {
                segment.to_owned()
            } else {
                utf8_percent_encode(segment, PATTERN_ESCAPE).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
