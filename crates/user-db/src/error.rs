//! Pool provisioning errors.

use thiserror::Error;

/// Why a pool could not be provisioned.
///
/// The variants are disjoint so operators can tell a bad configuration from an
/// unreachable server from a server that accepted the pool but failed the first ping.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Error parsing postgres config: {reason}")]
    ConfigParse { reason: String },

    #[error("Error connecting to postgres database: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Error pinging database: {0}")]
    Ping(#[source] sqlx::Error),

    #[error("Provisioning cancelled")]
    Cancelled,
}

impl ProvisionError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::ConfigParse {
            reason: reason.into(),
        }
    }

    /// Error code string for logs and exit diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse { .. } => "CONFIG_PARSE_ERROR",
            Self::Connection(_) => "CONNECTION_ERROR",
            Self::Ping(_) => "PING_ERROR",
            Self::Cancelled => "CANCELLED",
        }
    }
}
