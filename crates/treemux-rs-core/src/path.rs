//! URL path splitting and canonicalization.
//!
//! Both functions here are total: any input string produces a result, and
//! malformed input simply yields segments that will not match anything in
//! the tree.

/// The decomposition of a raw request path into its matching units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPath<'p> {
    /// The non-empty `/`-separated segments, in order.
    pub segments: Vec<&'p str>,
    /// Whether the input began with a slash.
    pub had_leading_slash: bool,
    /// Whether the input ended with a slash (the bare root path `/` does
    /// not count as trailing).
    pub had_trailing_slash: bool,
}

/// Splits a raw path into non-empty segments plus slash metadata.
///
/// Repeated slashes produce no empty segments; an empty or all-slash input
/// yields zero segments.
///
/// # Examples
///
/// ```
/// use treemux_rs_core::path::split;
///
/// let p = split("/apple/banana/");
/// assert_eq!(p.segments, vec!["apple", "banana"]);
/// assert!(p.had_leading_slash);
/// assert!(p.had_trailing_slash);
/// ```
pub fn split(path: &str) -> SplitPath<'_> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    SplitPath {
        had_leading_slash: path.starts_with('/'),
        had_trailing_slash: path.len() > 1 && path.ends_with('/') && !segments.is_empty(),
        segments,
    }
}

/// Returns the canonical form of a URL path.
///
/// Duplicate slashes collapse, `.` segments are dropped, `..` segments
/// remove the preceding segment (a rooted `..` stays at the root). The
/// result always begins with a slash and keeps the input's trailing slash
/// except at the root. An empty input cleans to `/`.
///
/// # Examples
///
/// ```
/// use treemux_rs_core::path::clean;
///
/// assert_eq!(clean("/a//b/./c/../d"), "/a/b/d");
/// assert_eq!(clean("/../x"), "/x");
/// assert_eq!(clean("x/"), "/x/");
/// ```
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return "/".to_owned();
    }

    let trailing = path.len() > 1 && path.ends_with('/');
    let mut kept: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                kept.pop();
            }
            s => kept.push(s),
        }
    }

    let mut cleaned = String::with_capacity(path.len() + 1);
    for segment in &kept {
        cleaned.push('/');
        cleaned.push_str(segment);
    }
    if cleaned.is_empty() {
        cleaned.push('/');
    }
    if trailing && cleaned != "/" {
        cleaned.push('/');
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain() {
        let p = split("/apple/banana/cat");
        assert_eq!(p.segments, vec!["apple", "banana", "cat"]);
        assert!(p.had_leading_slash);
        assert!(!p.had_trailing_slash);
    }

    #[test]
    fn test_split_trailing_slash() {
        let p = split("/apple/");
        assert_eq!(p.segments, vec!["apple"]);
        assert!(p.had_trailing_slash);
    }

    #[test]
    fn test_split_collapses_empty_segments() {
        let p = split("//a///b//");
        assert_eq!(p.segments, vec!["a", "b"]);
    }

    #[test]
    fn test_split_root_and_empty() {
        assert!(split("/").segments.is_empty());
        assert!(!split("/").had_trailing_slash);
        assert!(split("").segments.is_empty());
        assert!(!split("").had_leading_slash);
    }

    #[test]
    fn test_split_relative() {
        let p = split("a/b");
        assert_eq!(p.segments, vec!["a", "b"]);
        assert!(!p.had_leading_slash);
    }

    #[test]
    fn test_clean_identity() {
        assert_eq!(clean("/"), "/");
        assert_eq!(clean("/abc"), "/abc");
        assert_eq!(clean("/a/b/c"), "/a/b/c");
        assert_eq!(clean("/abc/"), "/abc/");
    }

    #[test]
    fn test_clean_missing_root() {
        assert_eq!(clean(""), "/");
        assert_eq!(clean("abc"), "/abc");
        assert_eq!(clean("abc/def"), "/abc/def");
        assert_eq!(clean("a/"), "/a/");
    }

    #[test]
    fn test_clean_duplicate_slashes() {
        assert_eq!(clean("//"), "/");
        assert_eq!(clean("/abc//"), "/abc/");
        assert_eq!(clean("/abc//def//ghi"), "/abc/def/ghi");
        assert_eq!(clean("//abc"), "/abc");
    }

    #[test]
    fn test_clean_dot_segments() {
        assert_eq!(clean("/abc/./def"), "/abc/def");
        assert_eq!(clean("/./abc/def"), "/abc/def");
        assert_eq!(clean("/abc/."), "/abc");
    }

    #[test]
    fn test_clean_dotdot_segments() {
        assert_eq!(clean("/abc/def/.."), "/abc");
        assert_eq!(clean("/abc/def/../ghi/../jkl"), "/abc/jkl");
        assert_eq!(clean("/abc/def/../.."), "/");
        assert_eq!(clean("/abc/def/../../.."), "/");
    }

    #[test]
    fn test_clean_rooted_dotdot() {
        assert_eq!(clean("/../abc"), "/abc");
        assert_eq!(clean("/.."), "/");
    }
}
