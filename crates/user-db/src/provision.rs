//! Pool provisioning: parse → apply policy → construct → verify.
//!
//! All-or-nothing. Either a pool that has answered one ping comes back, or an
//! error does and every connection opened along the way is closed.

use std::future::Future;
use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use user_common::config::DatabaseConfig;

use crate::descriptor::Descriptor;
use crate::error::ProvisionError;
use crate::{postgres, Database};

/// Provision a verified pool for `config`.
pub async fn provision(config: &DatabaseConfig) -> Result<Database, ProvisionError> {
    provision_with_cancel(config, CancellationToken::new()).await
}

/// Provision a verified pool, giving up with [`ProvisionError::Cancelled`] once `cancel` fires.
pub async fn provision_with_cancel(
    config: &DatabaseConfig,
    cancel: CancellationToken,
) -> Result<Database, ProvisionError> {
    let descriptor = Descriptor::parse(config)?;
    let timeout = config.connect_timeout;
    let policy = descriptor.policy();

    info!(
        endpoint = %descriptor,
        max_connections = policy.max_connections,
        min_connections = policy.min_connections,
        max_lifetime = ?policy.max_lifetime,
        idle_timeout = ?policy.idle_timeout,
        timeout = ?timeout,
        "Connecting to PostgreSQL..."
    );

    let pool = construct(descriptor, timeout, &cancel).await?;
    let pool = verify(pool, timeout, &cancel).await?;

    info!("Connected to PostgreSQL");
    Ok(Database::new(pool, config))
}

async fn construct(
    descriptor: Descriptor,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<PgPool, ProvisionError> {
    let connecting = async {
        match tokio::time::timeout(timeout, descriptor.connect()).await {
            Ok(result) => result,
            Err(_) => Err(sqlx::Error::PoolTimedOut),
        }
    };

    // Dropping the pending connect drops the pool it was building.
    cancellable(cancel, connecting)
        .await?
        .map_err(|e| {
            warn!(error = %e, "Failed to construct PostgreSQL pool");
            ProvisionError::Connection(e)
        })
}

/// Issue the single startup ping. The pool is closed on every failure path.
pub(crate) async fn verify(
    pool: PgPool,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<PgPool, ProvisionError> {
    let outcome = match cancellable(cancel, postgres::ping(&pool, timeout)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            warn!(error = %e, "PostgreSQL pool failed its first ping");
            Err(ProvisionError::Ping(e))
        }
        Err(cancelled) => Err(cancelled),
    };

    match outcome {
        Ok(()) => Ok(pool),
        Err(e) => {
            pool.close().await;
            debug!("Closed unverified PostgreSQL pool");
            Err(e)
        }
    }
}

async fn cancellable<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, ProvisionError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ProvisionError::Cancelled),
        output = fut => Ok(output),
    }
}
