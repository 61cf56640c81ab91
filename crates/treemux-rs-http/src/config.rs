//! Router behavior configuration.
//!
//! These enums are plain data with `serde` derives so applications can load
//! them from a settings file alongside their own configuration.

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// How a request whose path needs canonicalization is answered.
///
/// Applies to trailing-slash mismatches and clean-path rewrites. The
/// per-method override map on the router consults the same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RedirectBehavior {
    /// `301 Moved Permanently`.
    #[default]
    Redirect301,
    /// `307 Temporary Redirect`.
    Redirect307,
    /// `308 Permanent Redirect`.
    Redirect308,
    /// Alias for 307: the client keeps the request method.
    TemporaryRedirect,
    /// Alias for 308: the client keeps the request method.
    PermanentRedirect,
    /// Skip the redirect and serve the canonical route's handler directly.
    UseHandler,
}

impl RedirectBehavior {
    /// The response status for this behavior, or `None` for
    /// [`Self::UseHandler`].
    #[must_use]
    pub const fn status(self) -> Option<StatusCode> {
        match self {
            Self::Redirect301 => Some(StatusCode::MOVED_PERMANENTLY),
            Self::Redirect307 | Self::TemporaryRedirect => Some(StatusCode::TEMPORARY_REDIRECT),
            Self::Redirect308 | Self::PermanentRedirect => Some(StatusCode::PERMANENT_REDIRECT),
            Self::UseHandler => None,
        }
    }
}

/// Which representation of the request path feeds the route lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathSource {
    /// Match against the raw request URI. Percent-encoded bytes do not
    /// split segments, so an encoded slash stays inside a single
    /// parameter; extracted parameter values are decoded afterwards.
    #[default]
    RequestUri,
    /// Match against the percent-decoded path. An encoded slash becomes a
    /// real separator before matching, and parameter values are taken
    /// as-is.
    DecodedPath,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_status_codes() {
        assert_eq!(
            RedirectBehavior::Redirect301.status(),
            Some(StatusCode::MOVED_PERMANENTLY)
        );
        assert_eq!(
            RedirectBehavior::Redirect307.status(),
            Some(StatusCode::TEMPORARY_REDIRECT)
        );
        assert_eq!(
            RedirectBehavior::TemporaryRedirect.status(),
            Some(StatusCode::TEMPORARY_REDIRECT)
        );
        assert_eq!(
            RedirectBehavior::Redirect308.status(),
            Some(StatusCode::PERMANENT_REDIRECT)
        );
        assert_eq!(
            RedirectBehavior::PermanentRedirect.status(),
            Some(StatusCode::PERMANENT_REDIRECT)
        );
        assert_eq!(RedirectBehavior::UseHandler.status(), None);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(RedirectBehavior::default(), RedirectBehavior::Redirect301);
        assert_eq!(PathSource::default(), PathSource::RequestUri);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&RedirectBehavior::UseHandler).unwrap();
        assert_eq!(json, "\"use-handler\"");
        let source: PathSource = serde_json::from_str("\"decoded-path\"").unwrap();
        assert_eq!(source, PathSource::DecodedPath);
    }
}
