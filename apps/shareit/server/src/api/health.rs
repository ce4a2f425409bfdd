//! Readiness probe backed by the configured storage.

use crate::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};

/// Pings Postgres when it backs the repositories; in-memory storage is always ready.
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "storage",
        Box::pin(async {
            match &state.db {
                Some(db) => database::postgres::check_health(db)
                    .await
                    .map_err(|e| format!("Database ping failed: {}", e)),
                None => Ok(()),
            }
        }),
    )];

    run_health_checks(checks).await.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment, StorageBackend};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use core_config::{app_info, server::ServerConfig};
    use domain_shareit::Repositories;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn memory_state() -> AppState {
        AppState {
            config: Config {
                app: app_info!(),
                server: ServerConfig::default(),
                environment: Environment::Development,
                storage: StorageBackend::Memory,
                database: None,
            },
            repositories: Repositories::in_memory(),
            db: None,
        }
    }

    #[tokio::test]
    async fn test_memory_storage_is_ready() {
        let response = crate::api::ready_router(memory_state())
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["storage"], "connected");
        assert_eq!(body["status"], "ready");
    }
}
