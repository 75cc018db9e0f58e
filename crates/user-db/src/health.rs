//! Liveness and readiness answers for the health endpoints.
//!
//! Liveness never looks at dependencies. Readiness pings the database on every
//! call and reports failures as values, never as errors.

use sqlx::PgPool;
use std::time::Duration;
use user_common::health::HealthStatus;

use crate::{postgres, Database};

#[derive(Clone)]
pub struct HealthProbe {
    pool: Option<PgPool>,
    timeout: Duration,
}

impl HealthProbe {
    /// Probe a provisioned database.
    pub fn new(db: &Database) -> Self {
        Self::with_pool(db.pg.clone(), db.ping_timeout())
    }

    /// Probe an arbitrary pool, bounding each ping by `timeout`.
    pub fn with_pool(pool: PgPool, timeout: Duration) -> Self {
        Self {
            pool: Some(pool),
            timeout,
        }
    }

    /// Probe for a service running with the database disabled.
    pub fn without_database() -> Self {
        Self {
            pool: None,
            timeout: Duration::ZERO,
        }
    }

    /// The process is up and handling requests.
    pub fn liveness(&self) -> HealthStatus {
        HealthStatus::Alive
    }

    /// Whether the service can take traffic right now.
    pub async fn readiness(&self) -> HealthStatus {
        let Some(pool) = &self.pool else {
            return HealthStatus::Ready;
        };

        match postgres::ping(pool, self.timeout).await {
            Ok(()) => HealthStatus::Ready,
            Err(e) => {
                tracing::warn!(error = %e, "Readiness check failed: database unavailable");
                HealthStatus::error(format!("db error: {e}"))
            }
        }
    }
}
