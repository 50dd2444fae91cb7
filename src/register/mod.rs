//! The coordinating register
//!
//! [`RiskRegister`] owns an in-memory working copy of every collection for
//! the active `(user, period)` context, loaded through a staged pipeline in
//! dependency order. Mutations write through the repository layer and splice
//! the cache in place, so sorted views stay current without a full reload.

pub mod monitoring;

use std::sync::Arc;

use crate::core::codes;
use crate::core::context::RegisterContext;
use crate::entities::{
    ControlMeasure, ControlType, Goal, MonitoringSession, PotentialRisk, RiskCause, RiskExposure,
    RiskSource, SessionStatus,
};
use crate::repo::{self, RepoError};
use crate::scoring::{self, ControlGuidance, Impact, Likelihood};
use crate::store::DocumentStore;
use crate::suggest::Suggestion;

pub use crate::repo::control_measure::ControlMeasureUpdate;
pub use crate::repo::goal::GoalUpdate;
pub use crate::repo::monitoring_session::SessionUpdate;
pub use crate::repo::potential_risk::PotentialRiskUpdate;
pub use crate::repo::risk_cause::RiskCauseUpdate;

/// Per-collection load progress. A flag is true once its stage of the fetch
/// pipeline has completed for the current period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadingFlags {
    pub goals: bool,
    pub potential_risks: bool,
    pub risk_causes: bool,
    pub control_measures: bool,
    pub sessions: bool,
    pub exposures: bool,
}

/// Working copy of one context's register plus the monitoring subtree.
pub struct RiskRegister {
    store: Arc<dyn DocumentStore>,
    ctx: RegisterContext,
    goals: Vec<Goal>,
    potential_risks: Vec<PotentialRisk>,
    risk_causes: Vec<RiskCause>,
    control_measures: Vec<ControlMeasure>,
    sessions: Vec<MonitoringSession>,
    exposures: Vec<RiskExposure>,
    loading: LoadingFlags,
    // Period the caches were last fully populated for; None until the whole
    // pipeline has succeeded, reset on failure or period switch.
    data_fetched_for: Option<String>,
}

impl RiskRegister {
    pub fn new(store: Arc<dyn DocumentStore>, ctx: RegisterContext) -> Self {
        Self {
            store,
            ctx,
            goals: Vec::new(),
            potential_risks: Vec::new(),
            risk_causes: Vec::new(),
            control_measures: Vec::new(),
            sessions: Vec::new(),
            exposures: Vec::new(),
            loading: LoadingFlags::default(),
            data_fetched_for: None,
        }
    }

    pub fn context(&self) -> &RegisterContext {
        &self.ctx
    }

    pub fn loading(&self) -> LoadingFlags {
        self.loading
    }

    /// True once every stage has completed for the active period
    pub fn is_loaded(&self) -> bool {
        self.data_fetched_for.as_deref() == Some(self.ctx.period.as_str())
    }

    /// Switch the active period, discarding every cached collection
    pub fn switch_period(&mut self, period: impl Into<String>) {
        self.ctx = self.ctx.with_period(period);
        self.clear_caches();
    }

    fn clear_caches(&mut self) {
        self.goals.clear();
        self.potential_risks.clear();
        self.risk_causes.clear();
        self.control_measures.clear();
        self.sessions.clear();
        self.exposures.clear();
        self.loading = LoadingFlags::default();
        self.data_fetched_for = None;
    }

    // ---- fetch pipeline ----

    /// Reload every collection for the active period. Stages run in
    /// dependency order; a failure leaves the completed stages' flags set,
    /// clears everything downstream and leaves the register marked unloaded.
    pub fn refresh(&mut self) -> Result<(), RepoError> {
        self.data_fetched_for = None;
        self.loading = LoadingFlags::default();
        match self.run_fetch_pipeline() {
            Ok(()) => {
                self.data_fetched_for = Some(self.ctx.period.clone());
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Refresh only when the cache does not already cover the active period
    pub fn refresh_if_needed(&mut self) -> Result<(), RepoError> {
        if self.is_loaded() {
            return Ok(());
        }
        self.refresh()
    }

    fn run_fetch_pipeline(&mut self) -> Result<(), RepoError> {
        let store = self.store.clone();

        self.goals = repo::goal::list(store.as_ref(), &self.ctx)?;
        self.sort_goals();
        self.loading.goals = true;

        self.potential_risks = repo::potential_risk::list(store.as_ref(), &self.ctx)?;
        self.loading.potential_risks = true;

        self.risk_causes = repo::risk_cause::list(store.as_ref(), &self.ctx)?;
        self.loading.risk_causes = true;

        self.control_measures = repo::control_measure::list(store.as_ref(), &self.ctx)?;
        self.loading.control_measures = true;

        self.sessions = repo::monitoring_session::list(store.as_ref(), &self.ctx)?;
        self.loading.sessions = true;

        // Exposure eligibility follows each session's own period
        let mut exposures = Vec::new();
        for session in &self.sessions {
            let sctx = self.ctx.with_period(&session.period);
            exposures.extend(repo::risk_exposure::list_for_session(
                store.as_ref(),
                &session.id.to_string(),
                &sctx,
            )?);
        }
        self.exposures = exposures;
        self.loading.exposures = true;

        Ok(())
    }

    fn sort_goals(&mut self) {
        self.goals.sort_by(|a, b| codes::natural_cmp(&a.code, &b.code));
    }

    // ---- cached views ----

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn potential_risks(&self) -> &[PotentialRisk] {
        &self.potential_risks
    }

    pub fn risk_causes(&self) -> &[RiskCause] {
        &self.risk_causes
    }

    pub fn control_measures(&self) -> &[ControlMeasure] {
        &self.control_measures
    }

    pub fn sessions(&self) -> &[MonitoringSession] {
        &self.sessions
    }

    pub fn exposures(&self) -> &[RiskExposure] {
        &self.exposures
    }

    /// Potential risks under one goal, sorted by sequence
    pub fn risks_for_goal(&self, goal_id: &str) -> Vec<&PotentialRisk> {
        let mut risks: Vec<&PotentialRisk> = self
            .potential_risks
            .iter()
            .filter(|r| r.goal_id.to_string() == goal_id)
            .collect();
        risks.sort_by_key(|r| r.sequence_number);
        risks
    }

    /// Risk causes under one potential risk, sorted by sequence
    pub fn causes_for_risk(&self, potential_risk_id: &str) -> Vec<&RiskCause> {
        let mut causes: Vec<&RiskCause> = self
            .risk_causes
            .iter()
            .filter(|c| c.potential_risk_id.to_string() == potential_risk_id)
            .collect();
        causes.sort_by_key(|c| c.sequence_number);
        causes
    }

    /// Control measures under one cause, grouped by type then sequence
    pub fn controls_for_cause(&self, risk_cause_id: &str) -> Vec<&ControlMeasure> {
        let mut controls: Vec<&ControlMeasure> = self
            .control_measures
            .iter()
            .filter(|c| c.risk_cause_id.to_string() == risk_cause_id)
            .collect();
        controls.sort_by_key(|c| (c.control_type, c.sequence_number));
        controls
    }

    // ---- cache-first single reads ----

    pub fn get_goal(&self, id: &str) -> Result<Option<Goal>, RepoError> {
        if let Some(goal) = self.goals.iter().find(|g| g.id.to_string() == id) {
            return Ok(Some(goal.clone()));
        }
        repo::goal::find(self.store.as_ref(), id, &self.ctx)
    }

    pub fn get_potential_risk(&self, id: &str) -> Result<Option<PotentialRisk>, RepoError> {
        if let Some(risk) = self.potential_risks.iter().find(|r| r.id.to_string() == id) {
            return Ok(Some(risk.clone()));
        }
        repo::potential_risk::find(self.store.as_ref(), id, &self.ctx)
    }

    pub fn get_risk_cause(&self, id: &str) -> Result<Option<RiskCause>, RepoError> {
        if let Some(cause) = self.risk_causes.iter().find(|c| c.id.to_string() == id) {
            return Ok(Some(cause.clone()));
        }
        repo::risk_cause::find(self.store.as_ref(), id, &self.ctx)
    }

    pub fn get_control_measure(&self, id: &str) -> Result<Option<ControlMeasure>, RepoError> {
        if let Some(ctrl) = self.control_measures.iter().find(|c| c.id.to_string() == id) {
            return Ok(Some(ctrl.clone()));
        }
        repo::control_measure::find(self.store.as_ref(), id, &self.ctx)
    }

    pub fn get_session(&self, id: &str) -> Result<Option<MonitoringSession>, RepoError> {
        if let Some(session) = self.sessions.iter().find(|s| s.id.to_string() == id) {
            return Ok(Some(session.clone()));
        }
        repo::monitoring_session::find(self.store.as_ref(), id, &self.ctx)
    }

    // ---- display codes ----

    /// Composite code of a potential risk ("S1.PR2"), requires the parent
    /// goal to be resolvable
    pub fn potential_risk_code(&self, risk: &PotentialRisk) -> Result<Option<String>, RepoError> {
        let goal_id = risk.goal_id.to_string();
        Ok(self.get_goal(&goal_id)?.map(|g| risk.code(&g.code)))
    }

    /// Composite code of a risk cause ("S1.PR2.PC1")
    pub fn risk_cause_code(&self, cause: &RiskCause) -> Result<Option<String>, RepoError> {
        let Some(risk) = self.get_potential_risk(&cause.potential_risk_id.to_string())? else {
            return Ok(None);
        };
        Ok(self
            .potential_risk_code(&risk)?
            .map(|code| cause.code(&code)))
    }

    /// Composite code of a control measure ("S1.PR2.PC1.Prv.1")
    pub fn control_measure_code(
        &self,
        control: &ControlMeasure,
    ) -> Result<Option<String>, RepoError> {
        let Some(cause) = self.get_risk_cause(&control.risk_cause_id.to_string())? else {
            return Ok(None);
        };
        Ok(self.risk_cause_code(&cause)?.map(|code| control.code(&code)))
    }

    // ---- goal mutations ----

    pub fn add_goal(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Goal, RepoError> {
        self.refresh_if_needed()?;
        let name = name.into();
        let description = description.into();
        // Validate before reserving so a rejected insert burns no number
        repo::goal::validate_new(&name, &description)?;
        let live_max = self
            .goals
            .iter()
            .map(|g| g.sequence_number)
            .max()
            .unwrap_or(0);
        let seq = repo::sequence::reserve(
            self.store.as_ref(),
            &self.ctx,
            repo::sequence::GOALS,
            live_max,
        )?;
        let goal = Goal::new(&self.ctx.user_id, &self.ctx.period, seq, name, description);
        repo::goal::insert(self.store.as_ref(), &goal)?;
        self.goals.push(goal.clone());
        self.sort_goals();
        Ok(goal)
    }

    pub fn update_goal(&mut self, id: &str, patch: GoalUpdate) -> Result<Goal, RepoError> {
        let updated = repo::goal::update(self.store.as_ref(), id, &self.ctx, patch)?;
        if let Some(slot) = self.goals.iter_mut().find(|g| g.id.to_string() == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    /// Delete a goal and its whole subtree, then purge the caches
    pub fn delete_goal(&mut self, id: &str) -> Result<(), RepoError> {
        repo::goal::delete(self.store.as_ref(), id, &self.ctx)?;
        self.goals.retain(|g| g.id.to_string() != id);
        self.potential_risks.retain(|r| r.goal_id.to_string() != id);
        self.risk_causes.retain(|c| c.goal_id.to_string() != id);
        self.control_measures.retain(|c| c.goal_id.to_string() != id);
        self.exposures.retain(|e| e.goal_id.to_string() != id);
        Ok(())
    }

    // ---- potential risk mutations ----

    pub fn add_potential_risk(
        &mut self,
        goal_id: &str,
        description: impl Into<String>,
    ) -> Result<PotentialRisk, RepoError> {
        self.refresh_if_needed()?;
        let description = description.into();
        repo::validate_description(&description)?;
        let goal = self
            .get_goal(goal_id)?
            .ok_or_else(|| RepoError::NotFound {
                id: goal_id.to_string(),
            })?;
        let live_max = self
            .risks_for_goal(goal_id)
            .iter()
            .map(|r| r.sequence_number)
            .max()
            .unwrap_or(0);
        let seq = repo::sequence::reserve(
            self.store.as_ref(),
            &self.ctx,
            &repo::sequence::potential_risks(&goal.id.to_string()),
            live_max,
        )?;
        let risk = PotentialRisk::new(
            goal.id.clone(),
            &self.ctx.user_id,
            &self.ctx.period,
            seq,
            description,
        );
        repo::potential_risk::insert(self.store.as_ref(), &risk)?;
        self.potential_risks.push(risk.clone());
        Ok(risk)
    }

    pub fn update_potential_risk(
        &mut self,
        id: &str,
        patch: PotentialRiskUpdate,
    ) -> Result<PotentialRisk, RepoError> {
        let updated = repo::potential_risk::update(self.store.as_ref(), id, &self.ctx, patch)?;
        if let Some(slot) = self
            .potential_risks
            .iter_mut()
            .find(|r| r.id.to_string() == id)
        {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    pub fn delete_potential_risk(&mut self, id: &str) -> Result<(), RepoError> {
        repo::potential_risk::delete(self.store.as_ref(), id, &self.ctx)?;
        self.potential_risks.retain(|r| r.id.to_string() != id);
        self.risk_causes
            .retain(|c| c.potential_risk_id.to_string() != id);
        self.control_measures
            .retain(|c| c.potential_risk_id.to_string() != id);
        self.exposures
            .retain(|e| e.potential_risk_id.to_string() != id);
        Ok(())
    }

    /// Best-effort bulk delete: every id is attempted, per-id outcomes
    /// returned in input order
    pub fn delete_potential_risks(
        &mut self,
        ids: &[String],
    ) -> Vec<(String, Result<(), RepoError>)> {
        ids.iter()
            .map(|id| (id.clone(), self.delete_potential_risk(id)))
            .collect()
    }

    /// Bulk import of suggested risks under one goal. Sequence numbers keep
    /// incrementing across the batch; per-item outcomes preserve input order.
    pub fn import_potential_risks(
        &mut self,
        goal_id: &str,
        suggestions: Vec<Suggestion>,
    ) -> Vec<Result<PotentialRisk, RepoError>> {
        suggestions
            .into_iter()
            .map(|s| {
                let risk = self.add_potential_risk(goal_id, s.description)?;
                if s.category.is_some() {
                    return self.update_potential_risk(
                        &risk.id.to_string(),
                        PotentialRiskUpdate {
                            category: s.category,
                            ..Default::default()
                        },
                    );
                }
                Ok(risk)
            })
            .collect()
    }

    // ---- risk cause mutations ----

    pub fn add_risk_cause(
        &mut self,
        potential_risk_id: &str,
        description: impl Into<String>,
        source: RiskSource,
    ) -> Result<RiskCause, RepoError> {
        self.refresh_if_needed()?;
        let description = description.into();
        repo::validate_description(&description)?;
        let risk = self
            .get_potential_risk(potential_risk_id)?
            .ok_or_else(|| RepoError::NotFound {
                id: potential_risk_id.to_string(),
            })?;
        let live_max = self
            .causes_for_risk(potential_risk_id)
            .iter()
            .map(|c| c.sequence_number)
            .max()
            .unwrap_or(0);
        let seq = repo::sequence::reserve(
            self.store.as_ref(),
            &self.ctx,
            &repo::sequence::risk_causes(&risk.id.to_string()),
            live_max,
        )?;
        let cause = RiskCause::new(
            risk.id.clone(),
            risk.goal_id.clone(),
            &self.ctx.user_id,
            &self.ctx.period,
            seq,
            description,
            source,
        );
        repo::risk_cause::insert(self.store.as_ref(), &cause)?;
        self.risk_causes.push(cause.clone());
        Ok(cause)
    }

    pub fn update_risk_cause(
        &mut self,
        id: &str,
        patch: RiskCauseUpdate,
    ) -> Result<RiskCause, RepoError> {
        let updated = repo::risk_cause::update(self.store.as_ref(), id, &self.ctx, patch)?;
        if let Some(slot) = self.risk_causes.iter_mut().find(|c| c.id.to_string() == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    /// Record likelihood and impact for a cause
    pub fn analyze_risk_cause(
        &mut self,
        id: &str,
        likelihood: Likelihood,
        impact: Impact,
    ) -> Result<RiskCause, RepoError> {
        let updated =
            repo::risk_cause::set_analysis(self.store.as_ref(), id, &self.ctx, likelihood, impact)?;
        if let Some(slot) = self.risk_causes.iter_mut().find(|c| c.id.to_string() == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    /// Control-type guidance for a cause based on its derived risk level
    pub fn guidance_for_cause(&self, id: &str) -> Result<ControlGuidance, RepoError> {
        let cause = self
            .get_risk_cause(id)?
            .ok_or_else(|| RepoError::NotFound { id: id.to_string() })?;
        Ok(scoring::control_guidance(cause.risk_level()))
    }

    pub fn delete_risk_cause(&mut self, id: &str) -> Result<(), RepoError> {
        repo::risk_cause::delete(self.store.as_ref(), id, &self.ctx)?;
        self.risk_causes.retain(|c| c.id.to_string() != id);
        self.control_measures
            .retain(|c| c.risk_cause_id.to_string() != id);
        self.exposures.retain(|e| e.risk_cause_id.to_string() != id);
        Ok(())
    }

    pub fn delete_risk_causes(&mut self, ids: &[String]) -> Vec<(String, Result<(), RepoError>)> {
        ids.iter()
            .map(|id| (id.clone(), self.delete_risk_cause(id)))
            .collect()
    }

    /// Bulk import of suggested causes under one potential risk
    pub fn import_risk_causes(
        &mut self,
        potential_risk_id: &str,
        suggestions: Vec<Suggestion>,
    ) -> Vec<Result<RiskCause, RepoError>> {
        suggestions
            .into_iter()
            .map(|s| {
                self.add_risk_cause(
                    potential_risk_id,
                    s.description,
                    s.source.unwrap_or_default(),
                )
            })
            .collect()
    }

    // ---- control measure mutations ----

    pub fn add_control_measure(
        &mut self,
        risk_cause_id: &str,
        control_type: ControlType,
        description: impl Into<String>,
    ) -> Result<ControlMeasure, RepoError> {
        self.refresh_if_needed()?;
        let description = description.into();
        repo::validate_description(&description)?;
        let cause = self
            .get_risk_cause(risk_cause_id)?
            .ok_or_else(|| RepoError::NotFound {
                id: risk_cause_id.to_string(),
            })?;
        let live_max = self
            .controls_for_cause(risk_cause_id)
            .iter()
            .filter(|c| c.control_type == control_type)
            .map(|c| c.sequence_number)
            .max()
            .unwrap_or(0);
        let seq = repo::sequence::reserve(
            self.store.as_ref(),
            &self.ctx,
            &repo::sequence::control_measures(&cause.id.to_string(), control_type),
            live_max,
        )?;
        let control = ControlMeasure::new(
            cause.id.clone(),
            cause.potential_risk_id.clone(),
            cause.goal_id.clone(),
            &self.ctx.user_id,
            &self.ctx.period,
            seq,
            control_type,
            description,
        );
        repo::control_measure::insert(self.store.as_ref(), &control)?;
        self.control_measures.push(control.clone());
        Ok(control)
    }

    pub fn update_control_measure(
        &mut self,
        id: &str,
        patch: ControlMeasureUpdate,
    ) -> Result<ControlMeasure, RepoError> {
        let updated = repo::control_measure::update(self.store.as_ref(), id, &self.ctx, patch)?;
        if let Some(slot) = self
            .control_measures
            .iter_mut()
            .find(|c| c.id.to_string() == id)
        {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    pub fn delete_control_measure(&mut self, id: &str) -> Result<(), RepoError> {
        repo::control_measure::delete(self.store.as_ref(), id, &self.ctx)?;
        self.control_measures.retain(|c| c.id.to_string() != id);
        Ok(())
    }

    pub fn delete_control_measures(
        &mut self,
        ids: &[String],
    ) -> Vec<(String, Result<(), RepoError>)> {
        ids.iter()
            .map(|id| (id.clone(), self.delete_control_measure(id)))
            .collect()
    }

    /// Re-fetch one cause's controls from the store and splice them into the
    /// cache, replacing whatever was there for that cause
    pub fn fetch_controls_for_cause(
        &mut self,
        risk_cause_id: &str,
    ) -> Result<Vec<ControlMeasure>, RepoError> {
        let fresh =
            repo::control_measure::list_for_cause(self.store.as_ref(), risk_cause_id, &self.ctx)?;
        self.control_measures
            .retain(|c| c.risk_cause_id.to_string() != risk_cause_id);
        self.control_measures.extend(fresh.iter().cloned());
        Ok(fresh)
    }

    // ---- monitoring session mutations ----

    pub fn add_session(
        &mut self,
        name: impl Into<String>,
        start_date: chrono::NaiveDate,
        end_date: chrono::NaiveDate,
    ) -> Result<MonitoringSession, RepoError> {
        self.refresh_if_needed()?;
        let session = MonitoringSession::new(
            &self.ctx.user_id,
            &self.ctx.period,
            name,
            start_date,
            end_date,
        );
        repo::monitoring_session::insert(self.store.as_ref(), &session)?;
        self.sessions.push(session.clone());
        self.sessions.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(session)
    }

    pub fn update_session(
        &mut self,
        id: &str,
        patch: SessionUpdate,
    ) -> Result<MonitoringSession, RepoError> {
        let updated = repo::monitoring_session::update(self.store.as_ref(), id, &self.ctx, patch)?;
        if let Some(slot) = self.sessions.iter_mut().find(|s| s.id.to_string() == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    pub fn complete_session(&mut self, id: &str) -> Result<MonitoringSession, RepoError> {
        self.update_session(
            id,
            SessionUpdate {
                status: Some(SessionStatus::Completed),
                ..Default::default()
            },
        )
    }

    pub fn delete_session(&mut self, id: &str) -> Result<(), RepoError> {
        repo::monitoring_session::delete(self.store.as_ref(), id, &self.ctx)?;
        self.sessions.retain(|s| s.id.to_string() != id);
        self.exposures
            .retain(|e| e.monitoring_session_id.to_string() != id);
        Ok(())
    }

    /// Exposures recorded in one session, oldest first
    pub fn exposures_for_session(&self, session_id: &str) -> Vec<&RiskExposure> {
        let mut exposures: Vec<&RiskExposure> = self
            .exposures
            .iter()
            .filter(|e| e.monitoring_session_id.to_string() == session_id)
            .collect();
        exposures.sort_by_key(|e| e.recorded_at);
        exposures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn register() -> RiskRegister {
        RiskRegister::new(
            Arc::new(MemoryStore::new()),
            RegisterContext::new("u1", "2025"),
        )
    }

    #[test]
    fn test_refresh_marks_loaded() {
        let mut reg = register();
        assert!(!reg.is_loaded());
        reg.refresh().unwrap();
        assert!(reg.is_loaded());
        assert!(reg.loading().goals);
        assert!(reg.loading().exposures);
    }

    #[test]
    fn test_add_goal_assigns_next_sequence() {
        let mut reg = register();
        let g1 = reg.add_goal("First", "d").unwrap();
        let g2 = reg.add_goal("Second", "d").unwrap();
        assert_eq!(g1.code, "S1");
        assert_eq!(g2.code, "S2");
    }

    #[test]
    fn test_sequence_not_reused_after_delete() {
        let mut reg = register();
        reg.add_goal("First", "d").unwrap();
        let g2 = reg.add_goal("Second", "d").unwrap();
        reg.delete_goal(&g2.id.to_string()).unwrap();

        let g3 = reg.add_goal("Third", "d").unwrap();
        assert_eq!(g3.code, "S3");
    }

    #[test]
    fn test_sequence_survives_reopen_after_delete() {
        let store = Arc::new(MemoryStore::new());
        let ctx = RegisterContext::new("u1", "2025");
        let mut reg = RiskRegister::new(store.clone(), ctx.clone());
        reg.add_goal("First", "d").unwrap();
        let g2 = reg.add_goal("Second", "d").unwrap();
        reg.delete_goal(&g2.id.to_string()).unwrap();

        // A fresh register over the same store must not hand the number back
        let mut reopened = RiskRegister::new(store, ctx);
        let g3 = reopened.add_goal("Third", "d").unwrap();
        assert_eq!(g3.code, "S3");
    }

    #[test]
    fn test_control_sequence_not_reused_after_delete() {
        let mut reg = register();
        let g = reg.add_goal("G", "d").unwrap();
        let r = reg.add_potential_risk(&g.id.to_string(), "r").unwrap();
        let c = reg
            .add_risk_cause(&r.id.to_string(), "c", RiskSource::Internal)
            .unwrap();

        reg.add_control_measure(&c.id.to_string(), ControlType::Preventive, "p1")
            .unwrap();
        let p2 = reg
            .add_control_measure(&c.id.to_string(), ControlType::Preventive, "p2")
            .unwrap();
        reg.delete_control_measure(&p2.id.to_string()).unwrap();

        let p3 = reg
            .add_control_measure(&c.id.to_string(), ControlType::Preventive, "p3")
            .unwrap();
        assert_eq!(p3.sequence_number, 3);
    }

    #[test]
    fn test_goal_list_sorted_naturally() {
        let mut reg = register();
        for i in 0..11 {
            reg.add_goal(format!("Goal {}", i), "d").unwrap();
        }
        let codes: Vec<&str> = reg.goals().iter().map(|g| g.code.as_str()).collect();
        assert_eq!(codes[0], "S1");
        assert_eq!(codes[9], "S10");
        assert_eq!(codes[10], "S11");
    }

    #[test]
    fn test_child_sequences_scoped_per_parent() {
        let mut reg = register();
        let g1 = reg.add_goal("G1", "d").unwrap();
        let g2 = reg.add_goal("G2", "d").unwrap();

        let r1 = reg.add_potential_risk(&g1.id.to_string(), "a").unwrap();
        let r2 = reg.add_potential_risk(&g1.id.to_string(), "b").unwrap();
        let r3 = reg.add_potential_risk(&g2.id.to_string(), "c").unwrap();

        assert_eq!(r1.sequence_number, 1);
        assert_eq!(r2.sequence_number, 2);
        assert_eq!(r3.sequence_number, 1);
    }

    #[test]
    fn test_control_sequence_scoped_per_type() {
        let mut reg = register();
        let g = reg.add_goal("G", "d").unwrap();
        let r = reg.add_potential_risk(&g.id.to_string(), "r").unwrap();
        let c = reg
            .add_risk_cause(&r.id.to_string(), "c", RiskSource::Internal)
            .unwrap();

        let p1 = reg
            .add_control_measure(&c.id.to_string(), ControlType::Preventive, "p1")
            .unwrap();
        let m1 = reg
            .add_control_measure(&c.id.to_string(), ControlType::Mitigating, "m1")
            .unwrap();
        let p2 = reg
            .add_control_measure(&c.id.to_string(), ControlType::Preventive, "p2")
            .unwrap();

        assert_eq!(p1.sequence_number, 1);
        assert_eq!(m1.sequence_number, 1);
        assert_eq!(p2.sequence_number, 2);
    }

    #[test]
    fn test_composite_codes_resolve() {
        let mut reg = register();
        let g = reg.add_goal("G", "d").unwrap();
        let r = reg.add_potential_risk(&g.id.to_string(), "r").unwrap();
        let c = reg
            .add_risk_cause(&r.id.to_string(), "c", RiskSource::Internal)
            .unwrap();
        let ctrl = reg
            .add_control_measure(&c.id.to_string(), ControlType::Preventive, "p")
            .unwrap();

        assert_eq!(
            reg.potential_risk_code(&r).unwrap().as_deref(),
            Some("S1.PR1")
        );
        assert_eq!(
            reg.risk_cause_code(&c).unwrap().as_deref(),
            Some("S1.PR1.PC1")
        );
        assert_eq!(
            reg.control_measure_code(&ctrl).unwrap().as_deref(),
            Some("S1.PR1.PC1.Prv.1")
        );
    }

    #[test]
    fn test_delete_risk_purges_subtree_from_cache() {
        let mut reg = register();
        let g = reg.add_goal("G", "d").unwrap();
        let r1 = reg.add_potential_risk(&g.id.to_string(), "r1").unwrap();
        let r2 = reg.add_potential_risk(&g.id.to_string(), "r2").unwrap();
        let c = reg
            .add_risk_cause(&r1.id.to_string(), "c", RiskSource::Internal)
            .unwrap();
        reg.add_control_measure(&c.id.to_string(), ControlType::Preventive, "p")
            .unwrap();

        reg.delete_potential_risk(&r1.id.to_string()).unwrap();

        assert_eq!(reg.potential_risks().len(), 1);
        assert_eq!(reg.potential_risks()[0].id, r2.id);
        assert!(reg.risk_causes().is_empty());
        assert!(reg.control_measures().is_empty());
        assert_eq!(reg.goals().len(), 1);
    }

    #[test]
    fn test_bulk_delete_is_best_effort() {
        let mut reg = register();
        let g = reg.add_goal("G", "d").unwrap();
        let r = reg.add_potential_risk(&g.id.to_string(), "r").unwrap();

        // Absent ids succeed (idempotent delete), real ones are removed
        let results = reg.delete_potential_risks(&[
            r.id.to_string(),
            "RISK-01HQ3K4N5M6P7R8S9T0VWXYZAB".to_string(),
        ]);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
        assert!(reg.potential_risks().is_empty());
    }

    #[test]
    fn test_switch_period_clears_cache() {
        let mut reg = register();
        reg.add_goal("G", "d").unwrap();
        assert_eq!(reg.goals().len(), 1);

        reg.switch_period("2026");
        assert!(!reg.is_loaded());
        assert!(reg.goals().is_empty());

        reg.refresh().unwrap();
        assert!(reg.goals().is_empty());

        reg.switch_period("2025");
        reg.refresh().unwrap();
        assert_eq!(reg.goals().len(), 1);
    }

    #[test]
    fn test_guidance_follows_analysis() {
        let mut reg = register();
        let g = reg.add_goal("G", "d").unwrap();
        let r = reg.add_potential_risk(&g.id.to_string(), "r").unwrap();
        let c = reg
            .add_risk_cause(&r.id.to_string(), "c", RiskSource::Internal)
            .unwrap();
        let id = c.id.to_string();

        assert!(reg.guidance_for_cause(&id).unwrap().recommended.is_empty());

        reg.analyze_risk_cause(&id, Likelihood::High, Impact::VeryHigh)
            .unwrap();
        assert_eq!(reg.guidance_for_cause(&id).unwrap().recommended.len(), 3);
    }

    #[test]
    fn test_import_assigns_incrementing_sequences() {
        let mut reg = register();
        let g = reg.add_goal("G", "d").unwrap();
        let results = reg.import_potential_risks(
            &g.id.to_string(),
            vec![
                Suggestion::new("first"),
                Suggestion::new("second"),
                Suggestion::new(""),
                Suggestion::new("third"),
            ],
        );

        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(matches!(results[2], Err(RepoError::Validation(_))));
        assert!(results[3].is_ok());
        // The failed item does not burn a sequence number
        assert_eq!(results[3].as_ref().unwrap().sequence_number, 3);
    }

    #[test]
    fn test_session_lifecycle() {
        let mut reg = register();
        let s = reg
            .add_session(
                "Q3",
                NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
            )
            .unwrap();
        assert_eq!(s.status, SessionStatus::Active);

        let done = reg.complete_session(&s.id.to_string()).unwrap();
        assert_eq!(done.status, SessionStatus::Completed);

        reg.delete_session(&s.id.to_string()).unwrap();
        assert!(reg.sessions().is_empty());
    }
}
