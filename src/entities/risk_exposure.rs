//! Risk exposure entity - one observation per (session, cause) pair

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Record;
use crate::core::identity::{EntityId, EntityPrefix};

/// Monitoring data for one control measure inside an exposure record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoredControl {
    /// The control being monitored
    pub control_measure_id: EntityId,

    /// Realized value of the key control indicator (free text, parsed
    /// numerically for performance derivation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realization_kci: Option<String>,

    /// Derived performance percentage (recomputed on every upsert from the
    /// control's target and the realization above)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_percentage: Option<i64>,

    /// Link to supporting evidence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supporting_evidence_url: Option<String>,

    /// Observations made during monitoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring_result_notes: Option<String>,

    /// Agreed follow-up plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_plan: Option<String>,
}

/// A risk exposure observation. Identity key for upsert is
/// `(monitoringSessionId, riskCauseId)`: at most one record exists per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskExposure {
    /// Unique identifier
    pub id: EntityId,

    /// Session this observation belongs to
    pub monitoring_session_id: EntityId,

    /// Observed risk cause
    pub risk_cause_id: EntityId,

    /// Ancestor potential risk (denormalized for cascade queries)
    pub potential_risk_id: EntityId,

    /// Ancestor goal (denormalized for cascade queries)
    pub goal_id: EntityId,

    /// Owning user
    pub user_id: String,

    /// Period of the owning session
    pub period: String,

    /// Observed exposure value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_value: Option<f64>,

    /// Unit of the exposure value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_unit: Option<String>,

    /// Free-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_notes: Option<String>,

    /// Per-control monitoring entries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub monitored_controls: Vec<MonitoredControl>,

    /// First time this (session, cause) pair was recorded; preserved by upsert
    pub recorded_at: DateTime<Utc>,

    /// Refreshed on every upsert
    pub updated_at: DateTime<Utc>,
}

impl Record for RiskExposure {
    const COLLECTION: &'static str = "riskExposures";
    const PREFIX: EntityPrefix = EntityPrefix::Expo;

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exposure_roundtrip() {
        let expo = RiskExposure {
            id: EntityId::new(EntityPrefix::Expo),
            monitoring_session_id: EntityId::new(EntityPrefix::Sess),
            risk_cause_id: EntityId::new(EntityPrefix::Cause),
            potential_risk_id: EntityId::new(EntityPrefix::Risk),
            goal_id: EntityId::new(EntityPrefix::Goal),
            user_id: "u1".to_string(),
            period: "2025-Q3".to_string(),
            exposure_value: Some(12.5),
            exposure_unit: Some("incidents".to_string()),
            exposure_notes: None,
            monitored_controls: vec![MonitoredControl {
                control_measure_id: EntityId::new(EntityPrefix::Ctrl),
                realization_kci: Some("120".to_string()),
                performance_percentage: Some(120),
                supporting_evidence_url: None,
                monitoring_result_notes: None,
                follow_up_plan: None,
            }],
            recorded_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let yaml = serde_yml::to_string(&expo).unwrap();
        let parsed: RiskExposure = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed.id, expo.id);
        assert_eq!(parsed.monitored_controls.len(), 1);
        assert_eq!(parsed.monitored_controls[0].performance_percentage, Some(120));
    }

    #[test]
    fn test_empty_controls_omitted() {
        let expo = RiskExposure {
            id: EntityId::new(EntityPrefix::Expo),
            monitoring_session_id: EntityId::new(EntityPrefix::Sess),
            risk_cause_id: EntityId::new(EntityPrefix::Cause),
            potential_risk_id: EntityId::new(EntityPrefix::Risk),
            goal_id: EntityId::new(EntityPrefix::Goal),
            user_id: "u1".to_string(),
            period: "2025".to_string(),
            exposure_value: None,
            exposure_unit: None,
            exposure_notes: None,
            monitored_controls: Vec::new(),
            recorded_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&expo).unwrap();
        assert!(!json.contains("monitoredControls"));
    }
}
