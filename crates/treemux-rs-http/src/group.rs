//! Route groups: registering routes under a shared path prefix.

use http::Method;

use treemux_rs_core::{TreemuxError, TreemuxResult};

use crate::handler::Handler;
use crate::mux::TreeMux;

/// A view of a [`TreeMux`] that prefixes every registered pattern.
///
/// Groups nest: each level contributes its prefix, and a trailing slash on
/// a prefix is dropped since the patterns registered through the group
/// supply their own leading slash.
///
/// # Examples
///
/// ```
/// use treemux_rs_http::{handler_fn, TreeMux};
///
/// # fn main() -> treemux_rs_core::TreemuxResult<()> {
/// let mut mux = TreeMux::new();
/// let mut api = mux.group("/api")?;
/// let mut v1 = api.group("/v1")?;
/// v1.get("/users/:id", handler_fn(|_req| async { "user" }))?;
/// // Registered as GET /api/v1/users/:id.
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Group<'m> {
    mux: &'m mut TreeMux,
    prefix: String,
}

impl<'m> Group<'m> {
    pub(crate) fn new(mux: &'m mut TreeMux, prefix: &str) -> TreemuxResult<Self> {
        let prefix = combine_prefix("", prefix)?;
        Ok(Self { mux, prefix })
    }

    /// The accumulated path prefix of this group.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Creates a nested group under this group's prefix.
    ///
    /// # Errors
    ///
    /// Returns a [`TreemuxError`] when the prefix is empty or missing its
    /// leading slash.
    pub fn group(&mut self, prefix: &str) -> TreemuxResult<Group<'_>> {
        let prefix = combine_prefix(&self.prefix, prefix)?;
        Ok(Group {
            mux: &mut *self.mux,
            prefix,
        })
    }

    /// Registers `handler` for `method` on this group's prefix plus
    /// `pattern`.
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
        let combined = format!("{}{pattern}", self.prefix);
        self.mux.handle(method, &combined, handler)
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
}

fn combine_prefix(parent: &str, prefix: &str) -> TreemuxResult<String> {
    if prefix.is_empty() {
        return Err(TreemuxError::EmptyPattern);
    }
    if !prefix.starts_with('/') {
        return Err(TreemuxError::MissingLeadingSlash(prefix.to_owned()));
    }
    let mut combined = format!("{parent}{prefix}");
    // Sub-patterns carry their own leading slash.
    if combined.ends_with('/') {
        combined.pop();
    }
    Ok(combined)
}
