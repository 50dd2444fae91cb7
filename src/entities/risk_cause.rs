//! Risk cause entity - analyzed root cause of a potential risk

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::codes;
use crate::core::entity::Record;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::scoring::{self, Impact, Likelihood, RiskLevel};

/// Where the cause originates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum RiskSource {
    #[default]
    Internal,
    External,
}

impl std::fmt::Display for RiskSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskSource::Internal => write!(f, "internal"),
            RiskSource::External => write!(f, "external"),
        }
    }
}

impl std::str::FromStr for RiskSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "internal" => Ok(RiskSource::Internal),
            "external" => Ok(RiskSource::External),
            _ => Err(format!("Unknown risk source: {}", s)),
        }
    }
}

/// A root cause decomposed from a potential risk. Owns zero or more control
/// measures. Likelihood and impact start unset; once both are present a risk
/// level is derivable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskCause {
    /// Unique identifier
    pub id: EntityId,

    /// Parent potential risk
    pub potential_risk_id: EntityId,

    /// Grandparent goal (denormalized for cascade queries)
    pub goal_id: EntityId,

    /// Owning user
    pub user_id: String,

    /// Owning period
    pub period: String,

    /// Sequence number scoped per parent potential risk, 1-based
    pub sequence_number: u32,

    /// Cause description
    pub description: String,

    /// Internal or external origin
    pub source: RiskSource,

    /// Key risk indicator text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_risk_indicator: Option<String>,

    /// Tolerated deviation for the indicator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_tolerance: Option<String>,

    /// Assessed likelihood (unset until analysis)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likelihood: Option<Likelihood>,

    /// Assessed impact (unset until analysis)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<Impact>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// When likelihood/impact were last analyzed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_updated_at: Option<DateTime<Utc>>,
}

impl Record for RiskCause {
    const COLLECTION: &'static str = "riskCauses";
    const PREFIX: EntityPrefix = EntityPrefix::Cause;

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

impl RiskCause {
    /// Create a new risk cause with a caller-assigned sequence number
    pub fn new(
        potential_risk_id: EntityId,
        goal_id: EntityId,
        user_id: impl Into<String>,
        period: impl Into<String>,
        sequence_number: u32,
        description: impl Into<String>,
        source: RiskSource,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Cause),
            potential_risk_id,
            goal_id,
            user_id: user_id.into(),
            period: period.into(),
            sequence_number,
            description: description.into(),
            source,
            key_risk_indicator: None,
            risk_tolerance: None,
            likelihood: None,
            impact: None,
            created_at: Utc::now(),
            analysis_updated_at: None,
        }
    }

    /// Composite display code: `{potential_risk_code}.PC{sequence}`
    pub fn code(&self, potential_risk_code: &str) -> String {
        codes::risk_cause(potential_risk_code, self.sequence_number)
    }

    /// Risk score, or None while likelihood or impact is unset
    pub fn score(&self) -> Option<u8> {
        match (self.likelihood, self.impact) {
            (Some(l), Some(i)) => Some(scoring::score(l, i)),
            _ => None,
        }
    }

    /// Derived risk level, or None while the score is not determinable
    pub fn risk_level(&self) -> Option<RiskLevel> {
        self.score().map(scoring::level_from_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cause() -> RiskCause {
        RiskCause::new(
            EntityId::new(EntityPrefix::Risk),
            EntityId::new(EntityPrefix::Goal),
            "u1",
            "2025",
            1,
            "Unpatched dependencies",
            RiskSource::Internal,
        )
    }

    #[test]
    fn test_cause_creation() {
        let c = cause();
        assert!(c.id.to_string().starts_with("CAUSE-"));
        assert!(c.likelihood.is_none());
        assert!(c.score().is_none());
        assert!(c.risk_level().is_none());
    }

    #[test]
    fn test_score_and_level_once_analyzed() {
        let mut c = cause();
        c.likelihood = Some(Likelihood::High);
        c.impact = Some(Impact::VeryHigh);

        assert_eq!(c.score(), Some(20));
        assert_eq!(c.risk_level(), Some(RiskLevel::VeryHigh));
    }

    #[test]
    fn test_partial_analysis_has_no_score() {
        let mut c = cause();
        c.likelihood = Some(Likelihood::High);
        assert_eq!(c.score(), None);
    }

    #[test]
    fn test_code_composition() {
        let c = cause();
        assert_eq!(c.code("S1.PR1"), "S1.PR1.PC1");
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut c = cause();
        c.likelihood = Some(Likelihood::Medium);
        c.key_risk_indicator = Some("patch lag in days".to_string());

        let yaml = serde_yml::to_string(&c).unwrap();
        let parsed: RiskCause = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed.id, c.id);
        assert_eq!(parsed.likelihood, Some(Likelihood::Medium));
        assert_eq!(parsed.impact, None);
    }
}
