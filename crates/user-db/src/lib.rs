//! # user-db
//!
//! PostgreSQL pool lifecycle for the user service:
//! - **Provisioning** — parse the configured endpoint, apply the pool policy,
//!   build the pool and verify it with one ping before anyone can use it
//! - **Health** — liveness/readiness answers and a background health monitor

pub mod descriptor;
pub mod error;
pub mod health;
pub mod monitor;
pub mod postgres;
pub mod provision;

pub use descriptor::{Descriptor, PoolPolicy};
pub use error::ProvisionError;
pub use health::HealthProbe;
pub use provision::{provision, provision_with_cancel};

use sqlx::PgPool;
use std::time::Duration;
use user_common::config::DatabaseConfig;

/// A provisioned, verified pool shared through Axum state.
///
/// Only [`provision`] hands these out, so every `Database` has answered at
/// least one ping.
#[derive(Clone, Debug)]
pub struct Database {
    pub pg: PgPool,
    ping_timeout: Duration,
    health_check_period: Duration,
}

impl Database {
    fn new(pg: PgPool, config: &DatabaseConfig) -> Self {
        Self {
            pg,
            ping_timeout: config.connect_timeout,
            health_check_period: config.health_check_period,
        }
    }

    /// The policy the underlying pool was actually built with.
    pub fn policy(&self) -> PoolPolicy {
        PoolPolicy::of(self.pg.options())
    }

    pub fn ping_timeout(&self) -> Duration {
        self.ping_timeout
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        postgres::ping(&self.pg, self.ping_timeout).await
    }

    /// Close every connection. Pending acquires fail with `PoolClosed`.
    pub async fn close(&self) {
        tracing::info!("Closing PostgreSQL pool");
        self.pg.close().await;
    }
}
