use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse server state shown in the navigation badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthStatus {
    #[default]
    Unknown,
    Healthy,
    Error,
}

impl HealthStatus {
    pub fn from_payload(status: &str) -> Self {
        if status.eq_ignore_ascii_case("healthy") {
            Self::Healthy
        } else {
            Self::Error
        }
    }

    /// Returns CSS class name for the badge
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Unknown => "health-unknown",
            Self::Healthy => "health-healthy",
            Self::Error => "health-error",
        }
    }
}

/// Body returned by `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub api_version: Option<String>,
}

/// Most recent health probe result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerHealth {
    pub status: HealthStatus,
    pub database: Option<String>,
    pub api_version: Option<String>,
    pub last_checked: Option<DateTime<Utc>>,
}

impl ServerHealth {
    pub fn from_response(response: HealthResponse, checked_at: DateTime<Utc>) -> Self {
        Self {
            status: HealthStatus::from_payload(&response.status),
            database: response.database,
            api_version: response.api_version,
            last_checked: Some(checked_at),
        }
    }

    pub fn unreachable(checked_at: DateTime<Utc>) -> Self {
        Self {
            status: HealthStatus::Error,
            database: None,
            api_version: None,
            last_checked: Some(checked_at),
        }
    }

    /// Healthy API with a connected database.
    pub fn is_online(&self) -> bool {
        self.status == HealthStatus::Healthy && self.database.as_deref() == Some("connected")
    }

    pub fn label(&self) -> &'static str {
        if self.is_online() {
            "Online"
        } else if self.status == HealthStatus::Error {
            "Offline"
        } else {
            "Checking"
        }
    }
}
