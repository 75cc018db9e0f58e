//! # user-service
//!
//! Server binary: loads configuration, provisions the PostgreSQL pool, and
//! serves the health endpoints until Ctrl+C or SIGTERM.
//!
//! Startup is fail-fast. If the database is enabled and cannot be provisioned,
//! the process logs the error code and exits non-zero without ever binding
//! the listener.

use clap::Parser;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use user_api::{build_router, AppState};
use user_common::config::{AppConfig, LogFormat};
use user_db::HealthProbe;

#[derive(Debug, Parser)]
#[command(name = "user-service", version, about = "User service HTTP entrypoint")]
struct Cli {
    /// Config file name; `config` matches config.toml, config.yaml, config.json.
    /// Missing files are ignored.
    #[arg(long, env = "USER_SERVICE_CONFIG", default_value = "config")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration. The log format lives in it, so a broken config is
    // reported through the default subscriber.
    let config = match AppConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::default());
            tracing::error!(kind = "CONFIG_PARSE_ERROR", error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    // Initialize tracing (structured logging)
    init_tracing(config.log.format);

    tracing::info!("Starting user-service v{}", env!("CARGO_PKG_VERSION"));

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    // Connect to the database
    let db = if config.database.enabled {
        match user_db::provision_with_cancel(&config.database, shutdown.clone()).await {
            Ok(db) => Some(db),
            Err(e) => {
                tracing::error!(kind = e.error_code(), error = %e, "Database provisioning failed");
                return Err(e.into());
            }
        }
    } else {
        tracing::warn!("Database disabled; readiness will not check it");
        None
    };

    let monitor = db
        .as_ref()
        .map(|db| db.spawn_health_monitor(shutdown.clone()));
    let probe = db
        .as_ref()
        .map_or_else(HealthProbe::without_database, HealthProbe::new);

    // === REST API Server ===
    let router = build_router(AppState { probe });
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("REST API listening on http://{}", listener.local_addr()?);

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await;

    shutdown.cancel();
    if let Some(monitor) = monitor {
        if let Err(e) = monitor.await {
            tracing::warn!(error = %e, "Health monitor ended abnormally");
        }
    }
    if let Some(db) = db {
        db.close().await;
    }

    served?;
    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "user_service=debug,user_db=debug,user_api=debug,tower_http=debug".into()
            }),
        )
        .with_target(true)
        .with_thread_ids(true);

    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Cancel `token` on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
    token.cancel();
}
