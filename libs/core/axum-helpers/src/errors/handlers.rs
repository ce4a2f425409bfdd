use axum::{
    http::{Method, StatusCode, Uri},
    response::Response,
};

use super::error_response;

/// Router fallback for unknown paths.
pub async fn not_found(method: Method, uri: Uri) -> Response {
    tracing::debug!(%method, %uri, "No route matched");
    error_response(
        StatusCode::NOT_FOUND,
        format!("No handler for {} {}", method, uri.path()),
    )
}
