//! Query-string extractor with validation.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Query parameters that have passed `validator::Validate`.
///
/// Used for pagination windows, where an out-of-range `from`/`size` must be a 400.
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        params
            .validate()
            .map_err(|e| AppError::from(e).into_response())?;

        Ok(ValidatedQuery(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Window {
        #[validate(range(min = 0))]
        #[serde(default)]
        from: i64,
        #[validate(range(min = 1))]
        #[serde(default = "default_size")]
        size: i64,
    }

    fn default_size() -> i64 {
        20
    }

    fn app() -> Router {
        Router::new().route(
            "/page",
            get(|ValidatedQuery(w): ValidatedQuery<Window>| async move {
                format!("{}:{}", w.from, w.size)
            }),
        )
    }

    async fn status_of(uri: &str) -> StatusCode {
        app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_defaults_and_bounds() {
        assert_eq!(status_of("/page").await, StatusCode::OK);
        assert_eq!(status_of("/page?from=0&size=1").await, StatusCode::OK);
        assert_eq!(status_of("/page?from=-1").await, StatusCode::BAD_REQUEST);
        assert_eq!(status_of("/page?size=0").await, StatusCode::BAD_REQUEST);
        assert_eq!(status_of("/page?size=ten").await, StatusCode::BAD_REQUEST);
    }
}
