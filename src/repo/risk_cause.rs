//! Risk cause repository
//!
//! Besides CRUD this module owns the analysis write path: likelihood and
//! impact land together and stamp `analysisUpdatedAt`, so a cause is either
//! fully analyzed or not analyzed at all.

use chrono::Utc;

use super::{
    get, put, query_scoped, require, validate_description, validate_sequence, Fetch, RepoError,
};
use crate::core::context::RegisterContext;
use crate::core::entity::Record;
use crate::entities::{ControlMeasure, RiskCause, RiskExposure, RiskSource};
use crate::scoring::{Impact, Likelihood};
use crate::store::{DocumentStore, FieldEq, WriteBatch};

/// Fields a risk-cause update may change (analysis goes through
/// [`set_analysis`] instead)
#[derive(Debug, Default, Clone)]
pub struct RiskCauseUpdate {
    pub description: Option<String>,
    pub source: Option<RiskSource>,
    pub key_risk_indicator: Option<String>,
    pub risk_tolerance: Option<String>,
}

pub fn insert(store: &dyn DocumentStore, cause: &RiskCause) -> Result<(), RepoError> {
    validate_description(&cause.description)?;
    validate_sequence(cause.sequence_number)?;
    put(store, cause)
}

pub fn find(
    store: &dyn DocumentStore,
    id: &str,
    ctx: &RegisterContext,
) -> Result<Option<RiskCause>, RepoError> {
    get(store, id, ctx)
}

/// All risk causes in the context
pub fn list(store: &dyn DocumentStore, ctx: &RegisterContext) -> Result<Vec<RiskCause>, RepoError> {
    let mut causes: Vec<RiskCause> = query_scoped(store, ctx, [])?;
    causes.sort_by_key(|c| c.sequence_number);
    Ok(causes)
}

/// Risk causes under one potential risk, sorted by sequence number
pub fn list_for_risk(
    store: &dyn DocumentStore,
    potential_risk_id: &str,
    ctx: &RegisterContext,
) -> Result<Vec<RiskCause>, RepoError> {
    let mut causes: Vec<RiskCause> = query_scoped(
        store,
        ctx,
        [FieldEq::new("potentialRiskId", potential_risk_id)],
    )?;
    causes.sort_by_key(|c| c.sequence_number);
    Ok(causes)
}

pub fn update(
    store: &dyn DocumentStore,
    id: &str,
    ctx: &RegisterContext,
    patch: RiskCauseUpdate,
) -> Result<RiskCause, RepoError> {
    let mut cause: RiskCause = require(store, id, ctx)?;
    if let Some(description) = patch.description {
        validate_description(&description)?;
        cause.description = description;
    }
    if let Some(source) = patch.source {
        cause.source = source;
    }
    if let Some(kri) = patch.key_risk_indicator {
        cause.key_risk_indicator = Some(kri);
    }
    if let Some(tolerance) = patch.risk_tolerance {
        cause.risk_tolerance = Some(tolerance);
    }
    put(store, &cause)?;
    Ok(cause)
}

/// Record an analysis result: both dimensions at once, timestamped
pub fn set_analysis(
    store: &dyn DocumentStore,
    id: &str,
    ctx: &RegisterContext,
    likelihood: Likelihood,
    impact: Impact,
) -> Result<RiskCause, RepoError> {
    let mut cause: RiskCause = require(store, id, ctx)?;
    cause.likelihood = Some(likelihood);
    cause.impact = Some(impact);
    cause.analysis_updated_at = Some(Utc::now());
    put(store, &cause)?;
    Ok(cause)
}

/// Delete a risk cause, its control measures and its exposure observations
pub fn delete(store: &dyn DocumentStore, id: &str, ctx: &RegisterContext) -> Result<(), RepoError> {
    match super::fetch::<RiskCause>(store, id, ctx)? {
        Fetch::Missing => return Ok(()),
        Fetch::ForeignContext => return Err(RepoError::ContextMismatch { id: id.to_string() }),
        Fetch::Found(_) => {}
    }

    let batch = cascade_batch(store, id, ctx)?;
    store.apply(batch)?;
    Ok(())
}

pub(crate) fn cascade_batch(
    store: &dyn DocumentStore,
    id: &str,
    ctx: &RegisterContext,
) -> Result<WriteBatch, RepoError> {
    let by_cause = [
        FieldEq::new("riskCauseId", id),
        FieldEq::new("userId", ctx.user_id.as_str()),
    ];

    let mut batch = WriteBatch::new();
    for doc in store.query(ControlMeasure::COLLECTION, &by_cause)? {
        let ctrl: ControlMeasure = super::decode(doc)?;
        batch.delete(ControlMeasure::COLLECTION, &ctrl.id.to_string());
    }
    for doc in store.query(RiskExposure::COLLECTION, &by_cause)? {
        let expo: RiskExposure = super::decode(doc)?;
        batch.delete(RiskExposure::COLLECTION, &expo.id.to_string());
    }
    batch.delete(RiskCause::COLLECTION, id);
    Ok(batch)
}
