use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use tracing::debug;

use crate::common::DatabaseError;

/// Round-trips `SELECT 1` to prove the pool can serve queries.
pub async fn check_health(db: &DatabaseConnection) -> Result<(), DatabaseError> {
    debug!("Running PostgreSQL health check");

    let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1".to_owned());
    db.query_one_raw(stmt)
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::MockDatabase;

    #[tokio::test]
    async fn test_health_check_fails_without_rows_configured() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = check_health(&db).await;
        assert!(matches!(result, Err(DatabaseError::HealthCheckFailed(_))));
    }
}
