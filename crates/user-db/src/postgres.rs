//! PostgreSQL connection helpers.

use sqlx::PgPool;
use std::time::Duration;

/// Ping the database through the pool, giving up after `timeout`.
///
/// A timeout is reported as [`sqlx::Error::PoolTimedOut`].
pub async fn ping(pool: &PgPool, timeout: Duration) -> Result<(), sqlx::Error> {
    match tokio::time::timeout(timeout, sqlx::query("SELECT 1").execute(pool)).await {
        Ok(result) => result.map(|_| ()),
        Err(_) => Err(sqlx::Error::PoolTimedOut),
    }
}
