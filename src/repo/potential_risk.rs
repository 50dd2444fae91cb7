//! Potential risk repository

use chrono::Utc;

use super::{
    get, put, query_scoped, require, validate_description, validate_sequence, Fetch, RepoError,
};
use crate::core::context::RegisterContext;
use crate::core::entity::Record;
use crate::entities::{ControlMeasure, PotentialRisk, RiskCategory, RiskCause, RiskExposure};
use crate::store::{DocumentStore, FieldEq, WriteBatch};

/// Fields a potential-risk update may change
#[derive(Debug, Default, Clone)]
pub struct PotentialRiskUpdate {
    pub description: Option<String>,
    pub category: Option<RiskCategory>,
    pub owner: Option<String>,
}

pub fn insert(store: &dyn DocumentStore, risk: &PotentialRisk) -> Result<(), RepoError> {
    validate_description(&risk.description)?;
    validate_sequence(risk.sequence_number)?;
    put(store, risk)
}

pub fn find(
    store: &dyn DocumentStore,
    id: &str,
    ctx: &RegisterContext,
) -> Result<Option<PotentialRisk>, RepoError> {
    get(store, id, ctx)
}

/// All potential risks in the context
pub fn list(
    store: &dyn DocumentStore,
    ctx: &RegisterContext,
) -> Result<Vec<PotentialRisk>, RepoError> {
    let mut risks: Vec<PotentialRisk> = query_scoped(store, ctx, [])?;
    risks.sort_by_key(|r| r.sequence_number);
    Ok(risks)
}

/// Potential risks under one goal, sorted by sequence number
pub fn list_for_goal(
    store: &dyn DocumentStore,
    goal_id: &str,
    ctx: &RegisterContext,
) -> Result<Vec<PotentialRisk>, RepoError> {
    let mut risks: Vec<PotentialRisk> =
        query_scoped(store, ctx, [FieldEq::new("goalId", goal_id)])?;
    risks.sort_by_key(|r| r.sequence_number);
    Ok(risks)
}

pub fn update(
    store: &dyn DocumentStore,
    id: &str,
    ctx: &RegisterContext,
    patch: PotentialRiskUpdate,
) -> Result<PotentialRisk, RepoError> {
    let mut risk: PotentialRisk = require(store, id, ctx)?;
    if let Some(description) = patch.description {
        validate_description(&description)?;
        risk.description = description;
    }
    if let Some(category) = patch.category {
        risk.category = Some(category);
    }
    if let Some(owner) = patch.owner {
        risk.owner = Some(owner);
    }
    risk.updated_at = Utc::now();
    put(store, &risk)?;
    Ok(risk)
}

/// Delete a potential risk and its causes, controls and exposures
pub fn delete(store: &dyn DocumentStore, id: &str, ctx: &RegisterContext) -> Result<(), RepoError> {
    match super::fetch::<PotentialRisk>(store, id, ctx)? {
        Fetch::Missing => return Ok(()),
        Fetch::ForeignContext => return Err(RepoError::ContextMismatch { id: id.to_string() }),
        Fetch::Found(_) => {}
    }

    let batch = cascade_batch(store, id, ctx)?;
    store.apply(batch)?;
    Ok(())
}

/// Batch deleting the risk plus descendants, matched through the
/// denormalized `potentialRiskId` field
pub(crate) fn cascade_batch(
    store: &dyn DocumentStore,
    id: &str,
    ctx: &RegisterContext,
) -> Result<WriteBatch, RepoError> {
    let by_risk = [
        FieldEq::new("potentialRiskId", id),
        FieldEq::new("userId", ctx.user_id.as_str()),
    ];

    let mut batch = WriteBatch::new();
    for doc in store.query(RiskCause::COLLECTION, &by_risk)? {
        let cause: RiskCause = super::decode(doc)?;
        batch.delete(RiskCause::COLLECTION, &cause.id.to_string());
    }
    for doc in store.query(ControlMeasure::COLLECTION, &by_risk)? {
        let ctrl: ControlMeasure = super::decode(doc)?;
        batch.delete(ControlMeasure::COLLECTION, &ctrl.id.to_string());
    }
    for doc in store.query(RiskExposure::COLLECTION, &by_risk)? {
        let expo: RiskExposure = super::decode(doc)?;
        batch.delete(RiskExposure::COLLECTION, &expo.id.to_string());
    }
    batch.delete(PotentialRisk::COLLECTION, id);
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{EntityId, EntityPrefix};
    use crate::entities::RiskSource;
    use crate::store::MemoryStore;

    fn ctx() -> RegisterContext {
        RegisterContext::new("u1", "2025")
    }

    #[test]
    fn test_insert_rejects_blank_description() {
        let store = MemoryStore::new();
        let pr = PotentialRisk::new(EntityId::new(EntityPrefix::Goal), "u1", "2025", 1, "   ");
        assert!(matches!(insert(&store, &pr), Err(RepoError::Validation(_))));
    }

    #[test]
    fn test_list_for_goal_scoped_and_sorted() {
        let store = MemoryStore::new();
        let goal_id = EntityId::new(EntityPrefix::Goal);
        let other_goal = EntityId::new(EntityPrefix::Goal);

        insert(&store, &PotentialRisk::new(goal_id.clone(), "u1", "2025", 2, "b")).unwrap();
        insert(&store, &PotentialRisk::new(goal_id.clone(), "u1", "2025", 1, "a")).unwrap();
        insert(&store, &PotentialRisk::new(other_goal, "u1", "2025", 1, "c")).unwrap();

        let risks = list_for_goal(&store, &goal_id.to_string(), &ctx()).unwrap();
        assert_eq!(risks.len(), 2);
        assert_eq!(risks[0].sequence_number, 1);
        assert_eq!(risks[1].sequence_number, 2);
    }

    #[test]
    fn test_update_sets_category_and_bumps_timestamp() {
        let store = MemoryStore::new();
        let pr = PotentialRisk::new(EntityId::new(EntityPrefix::Goal), "u1", "2025", 1, "x");
        insert(&store, &pr).unwrap();

        let updated = update(
            &store,
            &pr.id.to_string(),
            &ctx(),
            PotentialRiskUpdate {
                category: Some(RiskCategory::Operational),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.category, Some(RiskCategory::Operational));
        assert!(updated.updated_at >= pr.updated_at);
        assert_eq!(updated.description, "x");
    }

    #[test]
    fn test_update_foreign_context_is_mismatch() {
        let store = MemoryStore::new();
        let pr = PotentialRisk::new(EntityId::new(EntityPrefix::Goal), "u2", "2025", 1, "x");
        insert(&store, &pr).unwrap();

        let err = update(
            &store,
            &pr.id.to_string(),
            &ctx(),
            PotentialRiskUpdate::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RepoError::ContextMismatch { .. }));
    }

    #[test]
    fn test_delete_cascades_causes() {
        let store = MemoryStore::new();
        let goal_id = EntityId::new(EntityPrefix::Goal);
        let pr = PotentialRisk::new(goal_id.clone(), "u1", "2025", 1, "x");
        insert(&store, &pr).unwrap();
        let cause = RiskCause::new(
            pr.id.clone(),
            goal_id,
            "u1",
            "2025",
            1,
            "c",
            RiskSource::External,
        );
        super::super::put(&store, &cause).unwrap();

        delete(&store, &pr.id.to_string(), &ctx()).unwrap();
        assert!(store
            .get(RiskCause::COLLECTION, &cause.id.to_string())
            .unwrap()
            .is_none());
    }
}
