//! Goal repository
//!
//! Goals are the cascade root: deleting one removes every descendant
//! potential risk, risk cause, control measure and any exposure observation
//! that referenced the deleted subtree, all in one atomic batch.

use super::{
    get, put, query_scoped, require, validate_description, validate_sequence, RepoError,
};
use crate::core::context::RegisterContext;
use crate::core::entity::Record;
use crate::entities::{ControlMeasure, Goal, PotentialRisk, RiskCause, RiskExposure};
use crate::store::{DocumentStore, FieldEq, WriteBatch};

/// Fields a goal update may change
#[derive(Debug, Default, Clone)]
pub struct GoalUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Input checks shared between `insert` and sequence reservation, so a
/// rejected goal never consumes a number
pub(crate) fn validate_new(name: &str, description: &str) -> Result<(), RepoError> {
    if name.trim().is_empty() {
        return Err(RepoError::Validation("name must not be empty".to_string()));
    }
    validate_description(description)
}

pub fn insert(store: &dyn DocumentStore, goal: &Goal) -> Result<(), RepoError> {
    validate_new(&goal.name, &goal.description)?;
    validate_sequence(goal.sequence_number)?;
    put(store, goal)
}

pub fn find(
    store: &dyn DocumentStore,
    id: &str,
    ctx: &RegisterContext,
) -> Result<Option<Goal>, RepoError> {
    get(store, id, ctx)
}

/// All goals in the context, sorted by sequence number
pub fn list(store: &dyn DocumentStore, ctx: &RegisterContext) -> Result<Vec<Goal>, RepoError> {
    let mut goals: Vec<Goal> = query_scoped(store, ctx, [])?;
    goals.sort_by_key(|g| g.sequence_number);
    Ok(goals)
}

pub fn update(
    store: &dyn DocumentStore,
    id: &str,
    ctx: &RegisterContext,
    patch: GoalUpdate,
) -> Result<Goal, RepoError> {
    let mut goal: Goal = require(store, id, ctx)?;
    if let Some(name) = patch.name {
        if name.trim().is_empty() {
            return Err(RepoError::Validation("name must not be empty".to_string()));
        }
        goal.name = name;
    }
    if let Some(description) = patch.description {
        validate_description(&description)?;
        goal.description = description;
    }
    put(store, &goal)?;
    Ok(goal)
}

/// Delete a goal and its whole subtree. Deleting an absent id is a no-op
/// success; deleting another context's goal is an authorization failure.
pub fn delete(store: &dyn DocumentStore, id: &str, ctx: &RegisterContext) -> Result<(), RepoError> {
    match super::fetch::<Goal>(store, id, ctx)? {
        super::Fetch::Missing => return Ok(()),
        super::Fetch::ForeignContext => {
            return Err(RepoError::ContextMismatch { id: id.to_string() })
        }
        super::Fetch::Found(_) => {}
    }

    let batch = cascade_batch(store, id, ctx)?;
    store.apply(batch)?;
    Ok(())
}

/// Batch deleting the goal plus every descendant document. Descendants are
/// found through the denormalized `goalId` field, so one filtered query per
/// collection covers the whole subtree. Exposure documents carry the session
/// period rather than the goal's, so they are matched on `goalId` and
/// `userId` only.
pub(crate) fn cascade_batch(
    store: &dyn DocumentStore,
    id: &str,
    ctx: &RegisterContext,
) -> Result<WriteBatch, RepoError> {
    let by_goal = [
        FieldEq::new("goalId", id),
        FieldEq::new("userId", ctx.user_id.as_str()),
    ];

    let mut batch = WriteBatch::new();
    for doc in store.query(PotentialRisk::COLLECTION, &by_goal)? {
        let pr: PotentialRisk = super::decode(doc)?;
        batch.delete(PotentialRisk::COLLECTION, &pr.id.to_string());
    }
    for doc in store.query(RiskCause::COLLECTION, &by_goal)? {
        let cause: RiskCause = super::decode(doc)?;
        batch.delete(RiskCause::COLLECTION, &cause.id.to_string());
    }
    for doc in store.query(ControlMeasure::COLLECTION, &by_goal)? {
        let ctrl: ControlMeasure = super::decode(doc)?;
        batch.delete(ControlMeasure::COLLECTION, &ctrl.id.to_string());
    }
    for doc in store.query(RiskExposure::COLLECTION, &by_goal)? {
        let expo: RiskExposure = super::decode(doc)?;
        batch.delete(RiskExposure::COLLECTION, &expo.id.to_string());
    }
    batch.delete(Goal::COLLECTION, id);
    Ok(batch)
}
