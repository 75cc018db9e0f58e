//! Health probe results.

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Outcome of a liveness or readiness probe.
///
/// Built fresh for every probe and serialized as `{"status": "..."}`, where an
/// error carries its detail in the `status` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Alive,
    Ready,
    Error { detail: String },
}

impl HealthStatus {
    /// An error status. Blank details are replaced so the body is never empty.
    pub fn error(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        let detail = if detail.trim().is_empty() {
            "error".to_string()
        } else {
            detail
        };
        Self::Error { detail }
    }

    pub fn status(&self) -> &str {
        match self {
            Self::Alive => "alive",
            Self::Ready => "ready",
            Self::Error { detail } => detail,
        }
    }

    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Error { .. })
    }
}

impl Serialize for HealthStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut body = serializer.serialize_struct("HealthStatus", 1)?;
        body.serialize_field("status", self.status())?;
        body.end()
    }
}
