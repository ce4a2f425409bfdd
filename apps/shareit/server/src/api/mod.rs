use axum::{Router, routing::get};

use crate::state::AppState;

pub mod health;

/// The ShareIt resource routes; docs and middleware are added by `create_router`.
pub fn routes(state: &AppState) -> Router {
    domain_shareit::router(&state.repositories)
}

/// `GET /ready`, probing the configured storage.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
