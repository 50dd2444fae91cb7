//! Goal entity - root of the register hierarchy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::codes;
use crate::core::entity::Record;
use crate::core::identity::{EntityId, EntityPrefix};

/// An organizational goal. Owns zero or more potential risks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    /// Unique identifier
    pub id: EntityId,

    /// Owning user
    pub user_id: String,

    /// Owning period
    pub period: String,

    /// Display code derived from the sequence number ("S1", "S2", ...).
    /// Assigned at creation as max(existing)+1 and never reused.
    pub code: String,

    /// Per-(user, period) sequence number, 1-based
    pub sequence_number: u32,

    /// Short name
    pub name: String,

    /// Detailed description
    pub description: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Record for Goal {
    const COLLECTION: &'static str = "goals";
    const PREFIX: EntityPrefix = EntityPrefix::Goal;

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

impl Goal {
    /// Create a new goal with a caller-assigned sequence number
    pub fn new(
        user_id: impl Into<String>,
        period: impl Into<String>,
        sequence_number: u32,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Goal),
            user_id: user_id.into(),
            period: period.into(),
            code: codes::goal(sequence_number),
            sequence_number,
            name: name.into(),
            description: description.into(),
            created_at: Utc::now(),
        }
    }
}
