//! A small demo binary: a JSON API under `/api` and a static file tree
//! under `/static`, routed by treemux-rs.
//!
//! Settings load from `fileserver.toml` in the working directory and fall
//! back to defaults when the file is missing.

use std::path::PathBuf;

use axum::response::IntoResponse;
use serde::Deserialize;
use treemux_rs::{catch_all, handler_fn, param, Handler, StatusCode, TreeMux};

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Settings {
    /// Address the server binds.
    addr: String,
    /// Directory served under `/static`.
    static_root: PathBuf,
    /// Filter directive for tracing, e.g. "info" or "fileserver=debug".
    log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_owned(),
            static_root: PathBuf::from("public"),
            log_level: "info".to_owned(),
        }
    }
}

impl Settings {
    fn load(path: &str) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(err) => {
                eprintln!("ignoring malformed {path}: {err}");
                Self::default()
            }
        }
    }
}

fn setup_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .ok();
}

/// Serves files below `root`, keyed by the catch-all remainder of the path.
fn static_files(root: PathBuf) -> Handler {
    handler_fn(move |req| {
        let root = root.clone();
        async move {
            let rel = catch_all(&req);
            // Reject rooted paths and traversal out of the root.
            if rel.starts_with('/') || rel.split('/').any(|segment| segment == "..") {
                return (StatusCode::BAD_REQUEST, "invalid path\n").into_response();
            }
            let full = root.join(rel);
            match tokio::fs::read(&full).await {
                Ok(bytes) => bytes.into_response(),
                Err(err) => {
                    tracing::debug!(path = %full.display(), %err, "static file miss");
                    (StatusCode::NOT_FOUND, "file not found\n").into_response()
                }
            }
        }
    })
}

fn routes(settings: &Settings) -> anyhow::Result<TreeMux> {
    let mut mux = TreeMux::new();

    mux.get(
        "/",
        handler_fn(|_req| async {
            "fileserver demo: try /api/users/42 or /static/<path>\n"
        }),
    )?;

    let mut api = mux.group("/api")?;
    api.get(
        "/users/:id",
        handler_fn(|req| async move {
            let id = param(&req, "id").to_owned();
            axum::Json(serde_json::json!({
                "id": id,
                "name": format!("user-{id}"),
            }))
        }),
    )?;
    api.get(
        "/users/:id/files/*rest",
        handler_fn(|req| async move {
            axum::Json(serde_json::json!({
                "id": param(&req, "id"),
                "file": catch_all(&req),
            }))
        }),
    )?;

    mux.get("/static/*filepath", static_files(settings.static_root.clone()))?;

    mux.options_handler = Some(handler_fn(|_req| async { StatusCode::NO_CONTENT }));
    mux.not_found_handler = handler_fn(|req| async move {
        let path = req.uri().path().to_owned();
        (StatusCode::NOT_FOUND, format!("no route for {path}\n"))
    });

    Ok(mux)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load("fileserver.toml");
    setup_logging(&settings.log_level);
    tracing::info!(
        addr = %settings.addr,
        static_root = %settings.static_root.display(),
        "starting fileserver"
    );

    let mux = routes(&settings)?;
    mux.run(&settings.addr).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_parse() {
        let settings: Settings = toml::from_str(
            r#"
            addr = "0.0.0.0:9000"
            static_root = "/srv/www"
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(settings.addr, "0.0.0.0:9000");
        assert_eq!(settings.static_root, PathBuf::from("/srv/www"));
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_settings_missing_fields_use_defaults() {
        let settings: Settings = toml::from_str(r#"addr = "127.0.0.1:9999""#).unwrap();
        assert_eq!(settings.addr, "127.0.0.1:9999");
        assert_eq!(settings.static_root, PathBuf::from("public"));
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_routes_register() {
        let mux = routes(&Settings::default()).unwrap();
        let allowed = mux.allowed_methods("/api/users/7");
        assert!(allowed.contains(&treemux_rs::Method::GET));
    }
}
