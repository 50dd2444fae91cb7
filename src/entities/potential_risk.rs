//! Potential risk entity - brainstormed risk against a goal

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::codes;
use crate::core::entity::Record;
use crate::core::identity::{EntityId, EntityPrefix};

/// Risk category - domain the risk originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    Policy,
    Legal,
    Reputation,
    Compliance,
    Financial,
    Fraud,
    Operational,
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskCategory::Policy => "policy",
            RiskCategory::Legal => "legal",
            RiskCategory::Reputation => "reputation",
            RiskCategory::Compliance => "compliance",
            RiskCategory::Financial => "financial",
            RiskCategory::Fraud => "fraud",
            RiskCategory::Operational => "operational",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for RiskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "policy" => Ok(RiskCategory::Policy),
            "legal" => Ok(RiskCategory::Legal),
            "reputation" => Ok(RiskCategory::Reputation),
            "compliance" => Ok(RiskCategory::Compliance),
            "financial" => Ok(RiskCategory::Financial),
            "fraud" => Ok(RiskCategory::Fraud),
            "operational" => Ok(RiskCategory::Operational),
            _ => Err(format!("Unknown risk category: {}", s)),
        }
    }
}

/// A potential risk identified against a goal. Owns zero or more risk causes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialRisk {
    /// Unique identifier
    pub id: EntityId,

    /// Parent goal
    pub goal_id: EntityId,

    /// Owning user
    pub user_id: String,

    /// Owning period
    pub period: String,

    /// Sequence number scoped per parent goal, 1-based
    pub sequence_number: u32,

    /// What could go wrong
    pub description: String,

    /// Category (user-assessed, may be absent on fresh suggestions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<RiskCategory>,

    /// Risk owner (person or unit)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// When the risk was identified
    pub identified_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Record for PotentialRisk {
    const COLLECTION: &'static str = "potentialRisks";
    const PREFIX: EntityPrefix = EntityPrefix::Risk;

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

impl PotentialRisk {
    /// Create a new potential risk with a caller-assigned sequence number
    pub fn new(
        goal_id: EntityId,
        user_id: impl Into<String>,
        period: impl Into<String>,
        sequence_number: u32,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Risk),
            goal_id,
            user_id: user_id.into(),
            period: period.into(),
            sequence_number,
            description: description.into(),
            category: None,
            owner: None,
            identified_at: now,
            updated_at: now,
        }
    }

    /// Composite display code: `{goal_code}.PR{sequence}`
    pub fn code(&self, goal_code: &str) -> String {
        codes::potential_risk(goal_code, self.sequence_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_potential_risk_creation() {
        let goal_id = EntityId::new(EntityPrefix::Goal);
        let pr = PotentialRisk::new(goal_id.clone(), "u1", "2025", 2, "Vendor outage");

        assert!(pr.id.to_string().starts_with("RISK-"));
        assert_eq!(pr.goal_id, goal_id);
        assert_eq!(pr.sequence_number, 2);
        assert!(pr.category.is_none());
        assert_eq!(pr.identified_at, pr.updated_at);
    }

    #[test]
    fn test_code_composition() {
        let pr = PotentialRisk::new(EntityId::new(EntityPrefix::Goal), "u1", "2025", 2, "x");
        assert_eq!(pr.code("S1"), "S1.PR2");
    }

    #[test]
    fn test_category_serializes_lowercase() {
        let mut pr = PotentialRisk::new(EntityId::new(EntityPrefix::Goal), "u1", "2025", 1, "x");
        pr.category = Some(RiskCategory::Financial);

        let json = serde_json::to_string(&pr).unwrap();
        assert!(json.contains("\"category\":\"financial\""));
        assert!(json.contains("\"goalId\""));
    }
}
