//! Fall-through routing tests.
//!
//! One routing table, exercised from every angle: static routes,
//! single-segment wildcards, and a catch-all competing for the same paths
//! under different methods. The router must prefer static > wildcard >
//! catch-all, but back out of a deeper match that cannot serve the
//! request method.

use http::Method;
use treemux_rs_core::RouteContext;
use treemux_rs_http::{handler_fn, Handler, Lookup, TreeMux};

// ============================================================================
// Helpers: the shared routing table
// ============================================================================

fn ok() -> Handler {
    handler_fn(|_req| async { "ok" })
}

fn fixture() -> TreeMux {
    let mut mux = TreeMux::new();
    mux.get("/apple/banana/cat", ok()).unwrap();
    mux.get("/apple/potato", ok()).unwrap();
    mux.post("/apple/banana/:abc", ok()).unwrap();
    mux.post("/apple/ban/def", ok()).unwrap();
    mux.delete("/apple/:seed", ok()).unwrap();
    mux.delete("/apple/*path", ok()).unwrap();
    mux.options("/apple/*path", ok()).unwrap();
    mux
}

fn matched(mux: &TreeMux, method: &Method, path: &str) -> RouteContext {
    match mux.route(method, path) {
        Lookup::Matched(m) => m.context,
        other => panic!("{method} {path}: expected a match, got {other:?}"),
    }
}

fn allowed(mux: &TreeMux, method: &Method, path: &str) -> Vec<Method> {
    match mux.route(method, path) {
        Lookup::MethodNotAllowed { allowed } => allowed,
        other => panic!("{method} {path}: expected 405, got {other:?}"),
    }
}

// ============================================================================
// Fall-through between match kinds
// ============================================================================

/// 1. A POST to a path owned by a GET-only static route falls through to
/// the wildcard that can serve POST.
#[test]
fn test_post_falls_past_static_get_route_to_wildcard() {
    let mux = fixture();
    let ctx = matched(&mux, &Method::POST, "/apple/banana/cat");
    assert_eq!(ctx.param("abc"), "cat");
}

/// 2. When both a wildcard and a catch-all could match, the wildcard wins.
#[test]
fn test_wildcard_preferred_over_catch_all() {
    let mux = fixture();
    let ctx = matched(&mux, &Method::DELETE, "/apple/banana");
    assert_eq!(ctx.param("seed"), "banana");
    assert_eq!(ctx.catch_all(), "");
}

/// 3. A DELETE two segments deep has no static or wildcard route, so the
/// catch-all takes the whole suffix.
#[test]
fn test_delete_falls_through_to_catch_all() {
    let mux = fixture();
    let ctx = matched(&mux, &Method::DELETE, "/apple/banana/cat");
    assert_eq!(ctx.param("path"), "banana/cat");
    assert_eq!(ctx.catch_all(), "banana/cat");
}

/// 4. A static route that only serves POST is skipped for OPTIONS, which
/// the catch-all can serve.
#[test]
fn test_options_skips_post_only_static_route() {
    let mux = fixture();
    let ctx = matched(&mux, &Method::OPTIONS, "/apple/ban/def");
    assert_eq!(ctx.param("path"), "ban/def");
}

/// 5. Catch-all values keep interior slashes and cover single segments.
#[test]
fn test_catch_all_values() {
    let mux = fixture();
    let ctx = matched(&mux, &Method::OPTIONS, "/apple/banana/cat");
    assert_eq!(ctx.param("path"), "banana/cat");

    let ctx = matched(&mux, &Method::OPTIONS, "/apple/bbbb");
    assert_eq!(ctx.param("path"), "bbbb");
}

/// 6. Static routes keep serving their own methods despite the competing
/// wildcard and catch-all routes.
#[test]
fn test_static_routes_unaffected_by_fall_through() {
    let mux = fixture();
    let ctx = matched(&mux, &Method::GET, "/apple/banana/cat");
    assert!(ctx.is_empty());
    assert!(matched(&mux, &Method::GET, "/apple/potato").is_empty());
    assert!(matched(&mux, &Method::POST, "/apple/ban/def").is_empty());
}

// ============================================================================
// Method-not-allowed and not-found boundaries
// ============================================================================

/// 7. A GET on a POST-only path is 405, and the Allow set is the union of
/// methods across every route matching the path.
#[test]
fn test_get_on_post_only_path_is_405_with_allow_union() {
    let mux = fixture();
    assert_eq!(
        allowed(&mux, &Method::GET, "/apple/ban/def"),
        vec![Method::DELETE, Method::OPTIONS, Method::POST]
    );
}

/// 8. PATCH matches paths fully but no route serves it anywhere, so every
/// such path answers 405; HEAD rides along with GET in the Allow set.
#[test]
fn test_patch_is_405_everywhere_it_matches() {
    let mux = fixture();
    assert_eq!(
        allowed(&mux, &Method::PATCH, "/apple/banana/cat"),
        vec![
            Method::DELETE,
            Method::GET,
            Method::HEAD,
            Method::OPTIONS,
            Method::POST,
        ]
    );
    assert_eq!(
        allowed(&mux, &Method::PATCH, "/apple/potato"),
        vec![Method::DELETE, Method::GET, Method::HEAD, Method::OPTIONS]
    );
}

/// 9. Paths nothing matches are 404, including the catch-all's own root:
/// a catch-all needs at least one segment after its prefix.
#[test]
fn test_unmatched_paths_are_404() {
    let mux = fixture();
    assert!(matches!(mux.route(&Method::GET, "/abc"), Lookup::NotFound));
    assert!(matches!(
        mux.route(&Method::OPTIONS, "/apple"),
        Lookup::NotFound
    ));
}

/// 10. HEAD is served by the GET handler at the matched leaf, and the
/// fall-through rules apply to the substituted method too.
#[test]
fn test_head_follows_get_through_the_tree() {
    let mux = fixture();
    assert!(matched(&mux, &Method::HEAD, "/apple/banana/cat").is_empty());
    assert!(matched(&mux, &Method::HEAD, "/apple/potato").is_empty());

    let mut strict = fixture();
    strict.head_can_use_get = false;
    assert!(matches!(
        strict.route(&Method::HEAD, "/apple/potato"),
        Lookup::MethodNotAllowed { .. }
    ));
}

/// 11. The same lookup repeated always produces the same disposition.
#[test]
fn test_lookup_is_idempotent() {
    let mux = fixture();
    for _ in 0..3 {
        let ctx = matched(&mux, &Method::POST, "/apple/banana/cat");
        assert_eq!(ctx.param("abc"), "cat");
        assert!(matches!(mux.route(&Method::GET, "/abc"), Lookup::NotFound));
        assert_eq!(
            allowed(&mux, &Method::GET, "/apple/ban/def"),
            vec![Method::DELETE, Method::OPTIONS, Method::POST]
        );
    }
}
