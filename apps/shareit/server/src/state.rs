//! Shared application state.

use database::postgres::DatabaseConnection;
use domain_shareit::Repositories;

/// Cloned into handlers that need more than a domain service (Arc clones only)
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub repositories: Repositories,
    /// Pool behind the repositories; `None` with in-memory storage
    pub db: Option<DatabaseConnection>,
}
