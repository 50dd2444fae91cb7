//! Control measure entity - mitigation attached to a risk cause

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::codes;
use crate::core::entity::Record;
use crate::core::identity::{EntityId, EntityPrefix};

/// Control measure type. Ordering groups controls by type before sequence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum ControlType {
    #[default]
    Preventive,
    Mitigating,
    Corrective,
}

impl ControlType {
    /// Short tag used in composite display codes ("S1.PR1.PC1.Prv.1")
    pub fn code_tag(&self) -> &'static str {
        match self {
            ControlType::Preventive => "Prv",
            ControlType::Mitigating => "Mit",
            ControlType::Corrective => "Cor",
        }
    }

    pub fn all() -> &'static [ControlType] {
        &[
            ControlType::Preventive,
            ControlType::Mitigating,
            ControlType::Corrective,
        ]
    }
}

impl std::fmt::Display for ControlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlType::Preventive => write!(f, "preventive"),
            ControlType::Mitigating => write!(f, "mitigating"),
            ControlType::Corrective => write!(f, "corrective"),
        }
    }
}

impl std::str::FromStr for ControlType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "preventive" | "prv" => Ok(ControlType::Preventive),
            "mitigating" | "mit" => Ok(ControlType::Mitigating),
            "corrective" | "cor" => Ok(ControlType::Corrective),
            _ => Err(format!("Unknown control type: {}", s)),
        }
    }
}

/// A control measure on a risk cause. Sequence numbers are scoped per
/// `(riskCauseId, controlType)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlMeasure {
    /// Unique identifier
    pub id: EntityId,

    /// Parent risk cause
    pub risk_cause_id: EntityId,

    /// Ancestor potential risk (denormalized for cascade queries)
    pub potential_risk_id: EntityId,

    /// Ancestor goal (denormalized for cascade queries)
    pub goal_id: EntityId,

    /// Owning user
    pub user_id: String,

    /// Owning period
    pub period: String,

    /// Sequence number scoped per (cause, control type), 1-based
    pub sequence_number: u32,

    /// Preventive, mitigating or corrective
    pub control_type: ControlType,

    /// What the control does
    pub description: String,

    /// Key control indicator text; also drives negative-target detection in
    /// monitoring performance derivation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_control_indicator: Option<String>,

    /// Target value for the indicator (free text, parsed numerically)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Person responsible for the control
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_person: Option<String>,

    /// Implementation deadline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,

    /// Allocated budget (positive when present)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Record for ControlMeasure {
    const COLLECTION: &'static str = "controlMeasures";
    const PREFIX: EntityPrefix = EntityPrefix::Ctrl;

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

impl ControlMeasure {
    /// Create a new control measure with a caller-assigned sequence number
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        risk_cause_id: EntityId,
        potential_risk_id: EntityId,
        goal_id: EntityId,
        user_id: impl Into<String>,
        period: impl Into<String>,
        sequence_number: u32,
        control_type: ControlType,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Ctrl),
            risk_cause_id,
            potential_risk_id,
            goal_id,
            user_id: user_id.into(),
            period: period.into(),
            sequence_number,
            control_type,
            description: description.into(),
            key_control_indicator: None,
            target: None,
            responsible_person: None,
            deadline: None,
            budget: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Composite display code: `{cause_code}.{type_tag}.{sequence}`
    pub fn code(&self, risk_cause_code: &str) -> String {
        codes::control_measure(risk_cause_code, self.control_type, self.sequence_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control(control_type: ControlType, seq: u32) -> ControlMeasure {
        ControlMeasure::new(
            EntityId::new(EntityPrefix::Cause),
            EntityId::new(EntityPrefix::Risk),
            EntityId::new(EntityPrefix::Goal),
            "u1",
            "2025",
            seq,
            control_type,
            "Quarterly dependency audit",
        )
    }

    #[test]
    fn test_control_creation() {
        let c = control(ControlType::Preventive, 1);
        assert!(c.id.to_string().starts_with("CTRL-"));
        assert_eq!(c.control_type, ControlType::Preventive);
        assert_eq!(c.created_at, c.updated_at);
    }

    #[test]
    fn test_code_uses_type_tag() {
        assert_eq!(
            control(ControlType::Preventive, 1).code("S1.PR1.PC1"),
            "S1.PR1.PC1.Prv.1"
        );
        assert_eq!(
            control(ControlType::Corrective, 2).code("S1.PR1.PC1"),
            "S1.PR1.PC1.Cor.2"
        );
    }

    #[test]
    fn test_type_ordering_groups_before_sequence() {
        // Preventive < Mitigating < Corrective, used when sorting listings
        let mut keys = vec![
            (ControlType::Corrective, 1u32),
            (ControlType::Preventive, 2),
            (ControlType::Mitigating, 1),
            (ControlType::Preventive, 1),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                (ControlType::Preventive, 1),
                (ControlType::Preventive, 2),
                (ControlType::Mitigating, 1),
                (ControlType::Corrective, 1),
            ]
        );
    }

    #[test]
    fn test_serializes_camel_case() {
        let c = control(ControlType::Mitigating, 1);
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"controlType\":\"mitigating\""));
        assert!(json.contains("\"riskCauseId\""));
    }
}
