//! Monitoring session entity - a bounded window of exposure recording

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Record;
use crate::core::identity::{EntityId, EntityPrefix};

/// Session lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum SessionStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::Completed => write!(f, "completed"),
            SessionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(SessionStatus::Active),
            "completed" => Ok(SessionStatus::Completed),
            "cancelled" => Ok(SessionStatus::Cancelled),
            _ => Err(format!("Unknown session status: {}", s)),
        }
    }
}

/// A monitoring session. Top-level entity created under the application's
/// active period; its own `period` field is what exposures are keyed against
/// (a session may cover a sub-period of monitoring activity).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringSession {
    /// Unique identifier
    pub id: EntityId,

    /// Owning user
    pub user_id: String,

    /// Period the session monitors (exposures are scoped to this)
    pub period: String,

    /// Session name ("Q3 review")
    pub name: String,

    /// First day of the monitoring window
    pub start_date: NaiveDate,

    /// Last day of the monitoring window (>= start_date)
    pub end_date: NaiveDate,

    /// Lifecycle status, Active on creation
    #[serde(default)]
    pub status: SessionStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Record for MonitoringSession {
    const COLLECTION: &'static str = "monitoringSessions";
    const PREFIX: EntityPrefix = EntityPrefix::Sess;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn period(&self) -> &str {
        &self.period
    }
}

impl MonitoringSession {
    /// Create a new active session
    pub fn new(
        user_id: impl Into<String>,
        period: impl Into<String>,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Sess),
            user_id: user_id.into(),
            period: period.into(),
            name: name.into(),
            start_date,
            end_date,
            status: SessionStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}
