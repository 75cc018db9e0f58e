//! Background pool health monitor.
//!
//! Pings the pool once per health-check period and logs transitions between
//! healthy and unhealthy. Readiness does not read this state; it always pings.

use sqlx::PgPool;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{postgres, Database};

impl Database {
    /// Start the monitor for this pool. It stops when `shutdown` is cancelled.
    pub fn spawn_health_monitor(&self, shutdown: CancellationToken) -> JoinHandle<()> {
        spawn_health_monitor(
            self.pg.clone(),
            self.health_check_period,
            self.ping_timeout,
            shutdown,
        )
    }
}

pub fn spawn_health_monitor(
    pool: PgPool,
    period: Duration,
    timeout: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // Provisioning already verified the pool.
        let mut healthy = true;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("Health monitor shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let result = postgres::ping(&pool, timeout).await;
                    healthy = record(healthy, result);
                }
            }
        }
    })
}

/// Log a state change, if any, and return the new state.
fn record(was_healthy: bool, result: Result<(), sqlx::Error>) -> bool {
    match (was_healthy, result) {
        (true, Err(e)) => {
            warn!(error = %e, "PostgreSQL became unreachable");
            false
        }
        (false, Ok(())) => {
            info!("PostgreSQL is reachable again");
            true
        }
        (false, Err(e)) => {
            debug!(error = %e, "PostgreSQL still unreachable");
            false
        }
        (true, Ok(())) => true,
    }
}
