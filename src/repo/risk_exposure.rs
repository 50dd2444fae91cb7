//! Risk exposure repository
//!
//! Exposures are keyed by `(monitoringSessionId, riskCauseId)`: at most one
//! record per pair. The merge semantics of an upsert live in
//! `register::monitoring`; this module only offers the keyed lookup and the
//! raw persistence primitives.

use super::{get, put, query_scoped, Fetch, RepoError};
use crate::core::context::RegisterContext;
use crate::core::entity::Record;
use crate::entities::RiskExposure;
use crate::store::{DocumentStore, FieldEq};

pub fn save(store: &dyn DocumentStore, exposure: &RiskExposure) -> Result<(), RepoError> {
    put(store, exposure)
}

pub fn find(
    store: &dyn DocumentStore,
    id: &str,
    ctx: &RegisterContext,
) -> Result<Option<RiskExposure>, RepoError> {
    get(store, id, ctx)
}

/// The at-most-one exposure for a (session, cause) pair
pub fn find_for_session_and_cause(
    store: &dyn DocumentStore,
    session_id: &str,
    risk_cause_id: &str,
    ctx: &RegisterContext,
) -> Result<Option<RiskExposure>, RepoError> {
    let hits: Vec<RiskExposure> = query_scoped(
        store,
        ctx,
        [
            FieldEq::new("monitoringSessionId", session_id),
            FieldEq::new("riskCauseId", risk_cause_id),
        ],
    )?;
    Ok(hits.into_iter().next())
}

/// All exposures recorded in one session, oldest observation first
pub fn list_for_session(
    store: &dyn DocumentStore,
    session_id: &str,
    ctx: &RegisterContext,
) -> Result<Vec<RiskExposure>, RepoError> {
    let mut exposures: Vec<RiskExposure> =
        query_scoped(store, ctx, [FieldEq::new("monitoringSessionId", session_id)])?;
    exposures.sort_by_key(|e| e.recorded_at);
    Ok(exposures)
}

/// All exposures in the context
pub fn list(
    store: &dyn DocumentStore,
    ctx: &RegisterContext,
) -> Result<Vec<RiskExposure>, RepoError> {
    let mut exposures: Vec<RiskExposure> = query_scoped(store, ctx, [])?;
    exposures.sort_by_key(|e| e.recorded_at);
    Ok(exposures)
}

pub fn delete(store: &dyn DocumentStore, id: &str, ctx: &RegisterContext) -> Result<(), RepoError> {
    match super::fetch::<RiskExposure>(store, id, ctx)? {
        Fetch::Missing => Ok(()),
        Fetch::ForeignContext => Err(RepoError::ContextMismatch { id: id.to_string() }),
        Fetch::Found(expo) => {
            store.delete(RiskExposure::COLLECTION, &expo.id.to_string())?;
            Ok(())
        }
    }
}
