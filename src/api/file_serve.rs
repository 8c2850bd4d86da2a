use axum::{
    body::Body,
    extract::{Path, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::Response,
};

use super::AppState;
use tracing::debug;

/// Validates that a filename is safe and doesn't contain path traversal sequences
fn is_safe_filename(filename: &str) -> bool {
    let trimmed = filename.trim();
    !filename.contains("..")
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.starts_with('.')
        && !filename.is_empty()
        && !trimmed.is_empty()
        && filename.len() <= 255
}

fn content_type_for(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "woff2" => "font/woff2",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

async fn read_static(state: &AppState, filename: &str) -> Result<Response<Body>, StatusCode> {
    let file_path = state.static_dir.join(filename);
    match tokio::fs::read(&file_path).await {
        Ok(contents) => Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, content_type_for(filename))
            .body(Body::from(contents))
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR),
        Err(e) => {
            debug!(file_path = %file_path.display(), error = %e, "Static file not served");
            Err(StatusCode::NOT_FOUND)
        }
    }
}

pub async fn serve_index(State(state): State<AppState>) -> Result<Response<Body>, StatusCode> {
    read_static(&state, "index.html").await
}

pub async fn serve_static_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response<Body>, StatusCode> {
    if !is_safe_filename(&filename) {
        return Err(StatusCode::BAD_REQUEST);
    }
    read_static(&state, &filename).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_filename_validation() {
        assert!(is_safe_filename("index.html"));
        assert!(is_safe_filename("app.js"));
        assert!(is_safe_filename("style-v2.css"));
        assert!(is_safe_filename("favicon.ico"));

        // Path traversal attempts should fail
        assert!(!is_safe_filename("../etc/passwd"));
        assert!(!is_safe_filename("..\\windows\\system32"));
        assert!(!is_safe_filename("dir/../file.html"));

        // Directory separators should fail
        assert!(!is_safe_filename("dir/file.html"));
        assert!(!is_safe_filename("folder\\file.html"));
        assert!(!is_safe_filename("/etc/passwd"));

        // Hidden files should fail
        assert!(!is_safe_filename(".env"));
        assert!(!is_safe_filename(".gitignore"));

        assert!(!is_safe_filename(""));
        assert!(!is_safe_filename(" "));
        assert!(!is_safe_filename(".."));
        assert!(!is_safe_filename("."));
    }

    #[test]
    fn test_filename_length_limits() {
        let max_filename = "a".repeat(255);
        assert!(is_safe_filename(&max_filename));

        let over_limit = "a".repeat(256);
        assert!(!is_safe_filename(&over_limit));
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("index.html"), "text/html; charset=utf-8");
        assert_eq!(content_type_for("APP.JS"), "text/javascript; charset=utf-8");
        assert_eq!(content_type_for("logo.svg"), "image/svg+xml");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }
}
