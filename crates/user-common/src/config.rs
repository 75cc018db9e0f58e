//! Service configuration loaded from environment variables and an optional config file.
//!
//! Every value has a default, so the service starts with no configuration at all.
//! Config precedence: flat env vars (`DB_URI`, `HTTP_PORT`, ...) >
//! prefixed env vars (`USER_SERVICE__DATABASE__URI`) > config file > defaults.
//! A `.env` file is loaded into the process environment first when present.

use serde::Deserialize;
use std::time::Duration;
use validator::{Validate, ValidationError};

/// Flat environment variables and the config keys they override.
pub const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("HTTP_HOST", "server.host"),
    ("HTTP_PORT", "server.port"),
    ("DB_ENABLED", "database.enabled"),
    ("DB_URI", "database.uri"),
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_USER", "database.user"),
    ("DB_PASSWORD", "database.password"),
    ("DB_NAME", "database.name"),
    ("DB_MAX_CONN", "database.max_connections"),
    ("DB_MIN_CONN", "database.min_connections"),
    ("DB_MAX_CONN_LIFE_TIME", "database.max_conn_lifetime"),
    ("DB_MAX_IDLE_TIME", "database.max_idle_time"),
    ("DB_HEALTH_CHECK_PERIOD", "database.health_check_period"),
    ("DB_CONNECT_TIMEOUT", "database.connect_timeout"),
    ("LOG_FORMAT", "log.format"),
];

/// Whole-second aliases for the duration variables (`DB_CONNECT_TIMEOUT_SECS=5`).
/// The duration-string names above win when both are set.
pub const SECONDS_ALIASES: &[(&str, &str)] = &[
    ("DB_MAX_CONN_LIFETIME_SECS", "database.max_conn_lifetime"),
    ("DB_MAX_IDLE_TIME_SECS", "database.max_idle_time"),
    ("DB_HEALTH_CHECK_PERIOD_SECS", "database.health_check_period"),
    ("DB_CONNECT_TIMEOUT_SECS", "database.connect_timeout"),
];

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Load configuration from `.env`, `config_file` (optional) and the process environment.
    pub fn load(config_file: &str) -> Result<Self, config::ConfigError> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        Self::load_from(config_file, |var| std::env::var(var).ok())
    }

    /// Load configuration, resolving the flat env overrides through `lookup`.
    ///
    /// Split out from [`AppConfig::load`] so callers can supply variables
    /// without touching the process environment.
    pub fn load_from<F>(config_file: &str, lookup: F) -> Result<Self, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = config::Config::builder()
            // Defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8001)?
            .set_default("database.enabled", true)?
            .set_default("database.host", "localhost")?
            .set_default("database.port", 5432)?
            .set_default("database.user", "postgres")?
            .set_default("database.password", "postgres")?
            .set_default("database.name", "postgres")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 5)?
            .set_default("database.max_conn_lifetime", "10m")?
            .set_default("database.max_idle_time", "10m")?
            .set_default("database.health_check_period", "1m")?
            .set_default("database.connect_timeout", "5s")?
            .set_default("log.format", "pretty")?
            // Optional config file
            .add_source(config::File::with_name(config_file).required(false))
            // Environment variables (USER_SERVICE__SERVER__PORT, USER_SERVICE__DATABASE__URI, etc.)
            .add_source(config::Environment::with_prefix("USER_SERVICE").separator("__"));

        for &(var, key) in SECONDS_ALIASES {
            let value = lookup(var).map(|secs| format!("{}s", secs.trim()));
            builder = builder.set_override_option(key, value)?;
        }
        for &(var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(key, lookup(var))?;
        }

        builder.build()?.try_deserialize()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
}

/// How to reach PostgreSQL and how the connection pool is shaped.
#[derive(Debug, Deserialize, Clone, Validate)]
#[validate(schema(function = "validate_pool_policy"))]
pub struct DatabaseConfig {
    /// When false the service runs without a database and readiness ignores it.
    pub enabled: bool,
    /// Full connection URI. Takes precedence over the individual parts below.
    pub uri: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Database name
    pub name: String,
    #[validate(range(min = 1, message = "max_connections must be at least 1"))]
    pub max_connections: u32,
    pub min_connections: u32,
    /// Duration strings such as `10m` or `90s`. Zero keeps connections for
    /// the lifetime of the pool.
    #[serde(with = "humantime_serde")]
    pub max_conn_lifetime: Duration,
    /// Zero never reaps idle connections.
    #[serde(with = "humantime_serde")]
    pub max_idle_time: Duration,
    #[serde(with = "humantime_serde")]
    pub health_check_period: Duration,
    /// Bound for pool construction, the startup ping and every readiness ping.
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
}

/// A connection endpoint as configured, before any backend-specific parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    Uri(&'a str),
    Parts {
        host: &'a str,
        port: u16,
        user: &'a str,
        password: &'a str,
        database: &'a str,
    },
}

impl DatabaseConfig {
    /// The endpoint to connect to. A non-blank `uri` wins over the parts.
    pub fn endpoint(&self) -> Endpoint<'_> {
        match self.uri.as_deref().map(str::trim) {
            Some(uri) if !uri.is_empty() => Endpoint::Uri(uri),
            _ => Endpoint::Parts {
                host: &self.host,
                port: self.port,
                user: &self.user,
                password: &self.password,
                database: &self.name,
            },
        }
    }

    /// Connection lifetime cap, `None` when unbounded.
    pub fn lifetime_limit(&self) -> Option<Duration> {
        non_zero(self.max_conn_lifetime)
    }

    /// Idle reaping threshold, `None` when idle connections are kept.
    pub fn idle_limit(&self) -> Option<Duration> {
        non_zero(self.max_idle_time)
    }
}

fn non_zero(duration: Duration) -> Option<Duration> {
    (!duration.is_zero()).then_some(duration)
}

fn validate_pool_policy(cfg: &DatabaseConfig) -> Result<(), ValidationError> {
    if cfg.min_connections > cfg.max_connections {
        let mut err = ValidationError::new("pool_bounds");
        err.message = Some(
            format!(
                "min_connections ({}) must not exceed max_connections ({})",
                cfg.min_connections, cfg.max_connections
            )
            .into(),
        );
        return Err(err);
    }
    for (name, value) in [
        ("health_check_period", cfg.health_check_period),
        ("connect_timeout", cfg.connect_timeout),
    ] {
        if value.is_zero() {
            let mut err = ValidationError::new("non_zero_period");
            err.message = Some(format!("{name} must be greater than zero").into());
            return Err(err);
        }
    }
    Ok(())
}
