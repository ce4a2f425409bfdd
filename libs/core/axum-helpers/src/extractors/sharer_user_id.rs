//! Caller identity extractor.

use crate::errors::AppError;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};

/// Header carrying the id of the acting user.
pub const SHARER_USER_ID_HEADER: &str = "X-Sharer-User-Id";

/// The caller's user id, taken from the `X-Sharer-User-Id` header.
///
/// Missing or non-numeric values are rejected with 400. Whether the user
/// exists is left to the service layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharerUserId(pub i64);

impl<S> FromRequestParts<S> for SharerUserId
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts.headers.get(SHARER_USER_ID_HEADER).ok_or_else(|| {
            AppError::BadRequest(format!("Missing {} header", SHARER_USER_ID_HEADER))
                .into_response()
        })?;

        value
            .to_str()
            .ok()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .map(SharerUserId)
            .ok_or_else(|| {
                AppError::BadRequest(format!("Invalid {} header", SHARER_USER_ID_HEADER))
                    .into_response()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new().route(
            "/whoami",
            get(|SharerUserId(id): SharerUserId| async move { id.to_string() }),
        )
    }

    #[tokio::test]
    async fn test_reads_header() {
        let response = app()
            .oneshot(
                Request::get("/whoami")
                    .header(SHARER_USER_ID_HEADER, "17")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"17");
    }

    #[tokio::test]
    async fn test_missing_header_is_bad_request() {
        let response = app()
            .oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_garbage_header_is_bad_request() {
        let response = app()
            .oneshot(
                Request::get("/whoami")
                    .header(SHARER_USER_ID_HEADER, "seventeen")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
