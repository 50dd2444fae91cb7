//! Exposure recording
//!
//! The monitoring flow upserts one [`RiskExposure`] per
//! `(monitoringSessionId, riskCauseId)` pair. Eligibility is checked against
//! the session's own period, not the application's active one, so a session
//! covering a sub-period still resolves the causes it monitors. Performance
//! percentages are recomputed from each control's stored target on every
//! upsert; they are never accepted from the caller.

use chrono::Utc;

use super::RiskRegister;
use crate::core::entity::Record;
use crate::core::identity::EntityId;
use crate::entities::{MonitoredControl, MonitoringSession, RiskExposure};
use crate::repo::{self, RepoError};
use crate::scoring;

/// Caller-supplied monitoring data for one control
#[derive(Debug, Clone, Default)]
pub struct MonitoredControlDraft {
    pub control_measure_id: String,
    pub realization_kci: Option<String>,
    pub supporting_evidence_url: Option<String>,
    pub monitoring_result_notes: Option<String>,
    pub follow_up_plan: Option<String>,
}

/// Caller-supplied exposure observation for one cause in one session
#[derive(Debug, Clone, Default)]
pub struct ExposureDraft {
    pub exposure_value: Option<f64>,
    pub exposure_unit: Option<String>,
    pub exposure_notes: Option<String>,
    pub controls: Vec<MonitoredControlDraft>,
}

impl RiskRegister {
    /// Create or update the exposure record for `(session, cause)`.
    ///
    /// An existing record keeps its `recordedAt`; everything else is replaced
    /// by the draft. A fresh record gets both timestamps set now.
    pub fn record_exposure(
        &mut self,
        session_id: &str,
        risk_cause_id: &str,
        draft: ExposureDraft,
    ) -> Result<RiskExposure, RepoError> {
        let store = self.store.clone();
        let store = store.as_ref();

        // Sessions are looked up by user only: the session's own period
        // defines the scope for everything below
        let Some(doc) = store.get(MonitoringSession::COLLECTION, session_id)? else {
            return Err(RepoError::NotFound {
                id: session_id.to_string(),
            });
        };
        let session: MonitoringSession = repo::decode(doc)?;
        if session.user_id != self.context().user_id {
            return Err(RepoError::ContextMismatch {
                id: session_id.to_string(),
            });
        }
        let sctx = self.context().with_period(&session.period);

        let cause = repo::risk_cause::find(store, risk_cause_id, &sctx)?.ok_or_else(|| {
            RepoError::NotFound {
                id: risk_cause_id.to_string(),
            }
        })?;

        let mut monitored = Vec::with_capacity(draft.controls.len());
        for entry in draft.controls {
            let control = repo::control_measure::find(store, &entry.control_measure_id, &sctx)?
                .ok_or_else(|| RepoError::NotFound {
                    id: entry.control_measure_id.clone(),
                })?;
            if control.risk_cause_id != cause.id {
                return Err(RepoError::Validation(format!(
                    "control '{}' does not belong to cause '{}'",
                    control.id, cause.id
                )));
            }

            let performance = match (&control.target, &entry.realization_kci) {
                (Some(target), Some(realization)) => scoring::performance_percentage(
                    target,
                    realization,
                    control.key_control_indicator.as_deref().unwrap_or(""),
                ),
                _ => None,
            };

            monitored.push(MonitoredControl {
                control_measure_id: control.id.clone(),
                realization_kci: entry.realization_kci,
                performance_percentage: performance,
                supporting_evidence_url: entry.supporting_evidence_url,
                monitoring_result_notes: entry.monitoring_result_notes,
                follow_up_plan: entry.follow_up_plan,
            });
        }

        let now = Utc::now();
        let existing =
            repo::risk_exposure::find_for_session_and_cause(store, session_id, risk_cause_id, &sctx)?;

        let exposure = match existing {
            Some(mut expo) => {
                expo.exposure_value = draft.exposure_value;
                expo.exposure_unit = draft.exposure_unit;
                expo.exposure_notes = draft.exposure_notes;
                expo.monitored_controls = monitored;
                expo.updated_at = now;
                expo
            }
            None => RiskExposure {
                id: EntityId::new(crate::core::identity::EntityPrefix::Expo),
                monitoring_session_id: session.id.clone(),
                risk_cause_id: cause.id.clone(),
                potential_risk_id: cause.potential_risk_id.clone(),
                goal_id: cause.goal_id.clone(),
                user_id: session.user_id.clone(),
                period: session.period.clone(),
                exposure_value: draft.exposure_value,
                exposure_unit: draft.exposure_unit,
                exposure_notes: draft.exposure_notes,
                monitored_controls: monitored,
                recorded_at: now,
                updated_at: now,
            },
        };

        repo::risk_exposure::save(store, &exposure)?;
        self.splice_exposure(exposure.clone());
        Ok(exposure)
    }

    fn splice_exposure(&mut self, exposure: RiskExposure) {
        if let Some(slot) = self
            .exposures
            .iter_mut()
            .find(|e| e.id == exposure.id)
        {
            *slot = exposure;
        } else {
            self.exposures.push(exposure);
        }
    }

    pub fn delete_exposure(&mut self, id: &str) -> Result<(), RepoError> {
        // Exposures carry the session period; try the active context first,
        // then each cached session's period
        let store = self.store.clone();
        let mut result = repo::risk_exposure::delete(store.as_ref(), id, self.context());
        if matches!(result, Err(RepoError::ContextMismatch { .. })) {
            for period in self
                .sessions
                .iter()
                .map(|s| s.period.clone())
                .collect::<Vec<_>>()
            {
                let sctx = self.context().with_period(period);
                result = repo::risk_exposure::delete(store.as_ref(), id, &sctx);
                if result.is_ok() {
                    break;
                }
            }
        }
        result?;
        self.exposures.retain(|e| e.id.to_string() != id);
        Ok(())
    }
}
