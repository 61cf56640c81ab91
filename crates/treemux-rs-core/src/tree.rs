//! The radix tree: pattern insertion and backtracking path search.
//!
//! Patterns are stored byte-wise. Static tokens radix-share prefixes (a
//! slash separator is always its own node), each node holds at most one
//! wildcard child and at most one catch-all child, and handlers hang off
//! leaves in a per-method map. Wildcard names are not stored on the
//! wildcard nodes themselves: the full name list for a pattern lives on
//! its leaf and is zipped against the captured segments after a match.
//!
//! The search prefers static children over the wildcard child over the
//! catch-all child, but it is not greedy: a deeper node that matches the
//! whole path without a handler for the requested method is only kept as
//! a candidate, and the unwind falls through to less specific routes that
//! can actually serve the method.

use std::collections::HashMap;
use std::fmt;

use http::Method;

use crate::error::{TreemuxError, TreemuxResult};

/// One vertex of the routing tree, generic over the stored handler type.
pub struct Node<T> {
    /// Label bytes. For static nodes a (possibly split) token fragment;
    /// for the catch-all child the bound name.
    path: Vec<u8>,
    /// Registration count through this child, used to order siblings.
    priority: u32,
    /// First byte of each static child, parallel to `static_children`.
    static_indices: Vec<u8>,
    static_children: Vec<Box<Node<T>>>,
    wildcard_child: Option<Box<Node<T>>>,
    catch_all_child: Option<Box<Node<T>>>,
    is_catch_all: bool,
    /// The registered pattern carried a trailing slash.
    add_slash: bool,
    leaf_handlers: HashMap<Method, T>,
    /// Wildcard names in pattern order, catch-all name last.
    leaf_wildcard_names: Vec<String>,
}

/// The outcome of a tree search.
///
/// `handler` is `None` when some node matched the full path but had no
/// entry for the requested method; the node itself is still reported so
/// the caller can distinguish 405 from 404 and inspect slash metadata.
pub struct Match<'t, T> {
    node: &'t Node<T>,
    handler: Option<&'t T>,
    /// Captured segments, pushed during unwind (reverse pattern order).
    params: Vec<String>,
}

impl<'t, T> Match<'t, T> {
    /// The handler registered for the requested method, if any.
    pub fn handler(&self) -> Option<&'t T> {
        self.handler
    }

    /// Whether the matched node is a catch-all leaf.
    pub const fn is_catch_all(&self) -> bool {
        self.node.is_catch_all
    }

    /// Whether the matched pattern was registered with a trailing slash.
    pub const fn add_slash(&self) -> bool {
        self.node.add_slash
    }

    /// Consumes the match, pairing the leaf's wildcard names with the
    /// captured segments in pattern order. Values are raw: the caller
    /// decides whether to percent-decode them.
    pub fn into_params(self) -> Vec<(String, String)> {
        debug_assert_eq!(self.node.leaf_wildcard_names.len(), self.params.len());
        self.node
            .leaf_wildcard_names
            .iter()
            .cloned()
            .zip(self.params.into_iter().rev())
            .collect()
    }
}

impl<T> Node<T> {
    /// Creates an empty root node.
    pub fn new() -> Self {
        Self::with_label(b"/")
    }

    fn with_label(label: &[u8]) -> Self {
        Self {
            path: label.to_vec(),
            priority: 0,
            static_indices: Vec::new(),
            static_children: Vec::new(),
            wildcard_child: None,
            catch_all_child: None,
            is_catch_all: false,
            add_slash: false,
            leaf_handlers: HashMap::new(),
            leaf_wildcard_names: Vec::new(),
        }
    }

    /// Registers `value` for `method` under `pattern`.
    ///
    /// The pattern must begin with a slash. `add_slash` marks the leaf as
    /// registered with a trailing slash (the caller strips the slash
    /// itself when trailing-slash redirects are enabled).
    ///
    /// # Errors
    ///
    /// Returns a [`TreemuxError`] when the pattern is malformed or
    /// conflicts with an existing registration.
    pub fn insert(
        &mut self,
        pattern: &str,
        method: Method,
        value: T,
        add_slash: bool,
    ) -> TreemuxResult<()> {
        let stripped = match pattern.strip_prefix('/') {
            Some(p) => p,
            None if pattern.is_empty() => return Err(TreemuxError::EmptyPattern),
            None => return Err(TreemuxError::MissingLeadingSlash(pattern.to_owned())),
        };
        let node = self.add_path(stripped.as_bytes(), Vec::new(), false, pattern)?;
        if add_slash {
            node.add_slash = true;
        }
        node.set_handler(method, value, pattern)
    }

    /// Searches for `path` (leading slash already stripped). See the
    /// module docs for the preference and fall-through rules.
    pub fn search(&self, method: &Method, path: &str, head_can_use_get: bool) -> Option<Match<'_, T>> {
        self.search_inner(method, path.as_bytes(), head_can_use_get)
    }

    /// Collects every method that has a handler on some node fully
    /// matching `path` (leading slash already stripped). Used to build
    /// the `Allow` header for 405 responses.
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let mut allowed = Vec::new();
        self.gather_allowed(path.as_bytes(), &mut allowed);
        allowed
    }

    fn set_handler(&mut self, method: Method, value: T, pattern: &str) -> TreemuxResult<()> {
        if self.leaf_handlers.contains_key(&method) {
            return Err(TreemuxError::HandlerConflict {
                method,
                pattern: pattern.to_owned(),
            });
        }
        self.leaf_handlers.insert(method, value);
        Ok(())
    }

    fn add_path(
        &mut self,
        path: &[u8],
        wildcards: Vec<String>,
        in_static_token: bool,
        pattern: &str,
    ) -> TreemuxResult<&mut Self> {
        if path.is_empty() {
            if !wildcards.is_empty() {
                if self.leaf_wildcard_names.is_empty() {
                    self.leaf_wildcard_names = wildcards;
                } else if self.leaf_wildcard_names != wildcards {
                    return Err(TreemuxError::WildcardNameConflict {
                        pattern: pattern.to_owned(),
                        names: wildcards.join(", "),
                        existing: self.leaf_wildcard_names.join(", "),
                    });
                }
            }
            return Ok(self);
        }

        let mut c = path[0];
        let next_slash = path.iter().position(|&b| b == b'/');
        let (mut this_token, token_end) = if c == b'/' {
            (&path[..1], 1)
        } else if let Some(i) = next_slash {
            (&path[..i], i)
        } else {
            (path, path.len())
        };
        let remaining = &path[token_end..];

        if c == b'*' && !in_static_token {
            // The catch-all consumes the rest of the path, so nothing may
            // follow it in the pattern.
            if token_end != path.len() {
                return Err(TreemuxError::CatchAllNotLast(pattern.to_owned()));
            }
            let name = &this_token[1..];
            if name.is_empty() {
                return Err(TreemuxError::MissingParameterName(pattern.to_owned()));
            }
            if let Some(existing) = self.catch_all_child.as_deref() {
                if existing.path.as_slice() != name {
                    return Err(TreemuxError::CatchAllNameConflict {
                        pattern: pattern.to_owned(),
                        existing: String::from_utf8_lossy(&existing.path).into_owned(),
                    });
                }
            }
            let mut names = wildcards;
            names.push(String::from_utf8_lossy(name).into_owned());
            let child = self.catch_all_child.get_or_insert_with(|| {
                let mut node = Self::with_label(name);
                node.is_catch_all = true;
                Box::new(node)
            });
            if child.leaf_wildcard_names.is_empty() {
                child.leaf_wildcard_names = names;
            } else if child.leaf_wildcard_names != names {
                return Err(TreemuxError::WildcardNameConflict {
                    pattern: pattern.to_owned(),
                    names: names.join(", "),
                    existing: child.leaf_wildcard_names.join(", "),
                });
            }
            return Ok(&mut **child);
        }

        if c == b':' && !in_static_token {
            let name = &this_token[1..];
            if name.is_empty() {
                return Err(TreemuxError::MissingParameterName(pattern.to_owned()));
            }
            let mut names = wildcards;
            names.push(String::from_utf8_lossy(name).into_owned());
            let child = self
                .wildcard_child
                .get_or_insert_with(|| Box::new(Self::with_label(b":")));
            return child.add_path(remaining, names, false, pattern);
        }

        // Static token. A leading backslash escapes a literal `*`, `:`,
        // or `\` at the start of the token, but never in the continuation
        // of a token a radix split landed inside.
        let mut path = path;
        if c == b'\\'
            && !in_static_token
            && path.len() > 1
            && matches!(path[1], b'*' | b':' | b'\\')
        {
            c = path[1];
            path = &path[1..];
            this_token = &this_token[1..];
        }

        // Anything after a split inside this token is still static, even
        // if it begins with `*` or `:`.
        let next_static = c != b'/';

        if let Some(i) = self.static_indices.iter().position(|&b| b == c) {
            let prefix_split = self.split_common_prefix(i, this_token);
            self.static_children[i].priority += 1;
            let i = self.sort_static_child(i);
            return self.static_children[i].add_path(
                &path[prefix_split..],
                wildcards,
                next_static,
                pattern,
            );
        }

        self.static_indices.push(c);
        self.static_children.push(Box::new(Self::with_label(this_token)));
        let last = self.static_children.len() - 1;
        self.static_children[last].add_path(remaining, wildcards, next_static, pattern)
    }

    /// Merges `token` into the static child at `index`, inserting an
    /// intermediate node at the common prefix when the labels diverge.
    /// Returns how many bytes of the path the caller should consume.
    fn split_common_prefix(&mut self, index: usize, token: &[u8]) -> usize {
        let child = &self.static_children[index];
        if token.starts_with(&child.path) {
            // The existing label is a prefix of (or equal to) the new
            // token; descend without any split.
            return child.path.len();
        }

        let common = common_prefix_len(&child.path, token);
        let mut old = std::mem::replace(
            &mut self.static_children[index],
            Box::new(Self::with_label(&token[..common])),
        );
        old.path.drain(..common);

        let replacement = &mut self.static_children[index];
        replacement.priority = old.priority;
        replacement.static_indices = vec![old.path[0]];
        replacement.static_children = vec![old];
        common
    }

    /// Bubbles the child at `index` toward the front while its priority
    /// exceeds its left neighbor's, returning its new position.
    fn sort_static_child(&mut self, mut index: usize) -> usize {
        while index > 0
            && self.static_children[index].priority > self.static_children[index - 1].priority
        {
            self.static_children.swap(index, index - 1);
            self.static_indices.swap(index, index - 1);
            index -= 1;
        }
        index
    }

    fn search_inner<'t>(
        &'t self,
        method: &Method,
        path: &[u8],
        head_can_use_get: bool,
    ) -> Option<Match<'t, T>> {
        if path.is_empty() {
            // A structural node with no handlers is not a match at all.
            if self.leaf_handlers.is_empty() {
                return None;
            }
            let mut handler = self.leaf_handlers.get(method);
            if handler.is_none() && head_can_use_get && *method == Method::HEAD {
                handler = self.leaf_handlers.get(&Method::GET);
            }
            return Some(Match {
                node: self,
                handler,
                params: Vec::new(),
            });
        }

        let first = path[0];
        let mut best: Option<Match<'t, T>> = None;
        if let Some(i) = self.static_indices.iter().position(|&b| b == first) {
            let child = &self.static_children[i];
            if path.starts_with(&child.path) {
                best = child.search_inner(method, &path[child.path.len()..], head_can_use_get);
            }
        }
        // A static match with a handler is final; a handlerless one is
        // kept as the candidate while we look for something better.
        if best.as_ref().is_some_and(|m| m.handler.is_some()) {
            return best;
        }

        if let Some(wildcard) = &self.wildcard_child {
            let split_at = path.iter().position(|&b| b == b'/').unwrap_or(path.len());
            let (token, rest) = path.split_at(split_at);
            // Wildcards never match an empty segment.
            if !token.is_empty() {
                if let Some(mut matched) = wildcard.search_inner(method, rest, head_can_use_get) {
                    if matched.handler.is_some() || best.is_none() {
                        matched.params.push(String::from_utf8_lossy(token).into_owned());
                        if matched.handler.is_some() {
                            return Some(matched);
                        }
                        best = Some(matched);
                    }
                }
            }
        }

        if let Some(catch_all) = &self.catch_all_child {
            let mut handler = catch_all.leaf_handlers.get(method);
            if handler.is_none() && head_can_use_get && *method == Method::HEAD {
                handler = catch_all.leaf_handlers.get(&Method::GET);
            }
            // The catch-all consumes everything left, so there is nothing
            // further to try: take it when it can serve the method, or as
            // the candidate of last resort.
            if handler.is_some() || best.is_none() {
                return Some(Match {
                    node: catch_all,
                    handler,
                    params: vec![String::from_utf8_lossy(path).into_owned()],
                });
            }
        }

        best
    }

    fn gather_allowed(&self, path: &[u8], allowed: &mut Vec<Method>) {
        if path.is_empty() {
            for method in self.leaf_handlers.keys() {
                if !allowed.contains(method) {
                    allowed.push(method.clone());
                }
            }
            return;
        }

        let first = path[0];
        if let Some(i) = self.static_indices.iter().position(|&b| b == first) {
            let child = &self.static_children[i];
            if path.starts_with(&child.path) {
                child.gather_allowed(&path[child.path.len()..], allowed);
            }
        }
        if let Some(wildcard) = &self.wildcard_child {
            let split_at = path.iter().position(|&b| b == b'/').unwrap_or(path.len());
            let (token, rest) = path.split_at(split_at);
            if !token.is_empty() {
                wildcard.gather_allowed(rest, allowed);
            }
        }
        if let Some(catch_all) = &self.catch_all_child {
            for method in catch_all.leaf_handlers.keys() {
                if !allowed.contains(method) {
                    allowed.push(method.clone());
                }
            }
        }
    }
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("path", &String::from_utf8_lossy(&self.path))
            .field("methods", &self.leaf_handlers.keys().collect::<Vec<_>>())
            .field("wildcard_names", &self.leaf_wildcard_names)
            .field("static_children", &self.static_children)
            .field("wildcard_child", &self.wildcard_child)
            .field("catch_all_child", &self.catch_all_child)
            .finish_non_exhaustive()
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
