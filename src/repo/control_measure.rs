//! Control measure repository

use chrono::{NaiveDate, Utc};

use super::{
    get, put, query_scoped, require, validate_description, validate_sequence, Fetch, RepoError,
};
use crate::core::context::RegisterContext;
use crate::core::entity::Record;
use crate::entities::{ControlMeasure, ControlType};
use crate::store::{DocumentStore, FieldEq};

/// Fields a control-measure update may change
#[derive(Debug, Default, Clone)]
pub struct ControlMeasureUpdate {
    pub description: Option<String>,
    pub key_control_indicator: Option<String>,
    pub target: Option<String>,
    pub responsible_person: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub budget: Option<f64>,
}

fn validate_budget(budget: Option<f64>) -> Result<(), RepoError> {
    if let Some(b) = budget {
        if !b.is_finite() || b <= 0.0 {
            return Err(RepoError::Validation(
                "budget must be a positive amount".to_string(),
            ));
        }
    }
    Ok(())
}

pub fn insert(store: &dyn DocumentStore, control: &ControlMeasure) -> Result<(), RepoError> {
    validate_description(&control.description)?;
    validate_sequence(control.sequence_number)?;
    validate_budget(control.budget)?;
    put(store, control)
}

pub fn find(
    store: &dyn DocumentStore,
    id: &str,
    ctx: &RegisterContext,
) -> Result<Option<ControlMeasure>, RepoError> {
    get(store, id, ctx)
}

/// All control measures in the context
pub fn list(
    store: &dyn DocumentStore,
    ctx: &RegisterContext,
) -> Result<Vec<ControlMeasure>, RepoError> {
    let mut controls: Vec<ControlMeasure> = query_scoped(store, ctx, [])?;
    controls.sort_by_key(|c| (c.control_type, c.sequence_number));
    Ok(controls)
}

/// Control measures under one risk cause, grouped by type then sequence
pub fn list_for_cause(
    store: &dyn DocumentStore,
    risk_cause_id: &str,
    ctx: &RegisterContext,
) -> Result<Vec<ControlMeasure>, RepoError> {
    let mut controls: Vec<ControlMeasure> =
        query_scoped(store, ctx, [FieldEq::new("riskCauseId", risk_cause_id)])?;
    controls.sort_by_key(|c| (c.control_type, c.sequence_number));
    Ok(controls)
}

/// Highest sequence number already used for a (cause, type) pair
pub fn max_sequence_for_type(
    store: &dyn DocumentStore,
    risk_cause_id: &str,
    control_type: ControlType,
    ctx: &RegisterContext,
) -> Result<u32, RepoError> {
    let controls = list_for_cause(store, risk_cause_id, ctx)?;
    Ok(controls
        .iter()
        .filter(|c| c.control_type == control_type)
        .map(|c| c.sequence_number)
        .max()
        .unwrap_or(0))
}

pub fn update(
    store: &dyn DocumentStore,
    id: &str,
    ctx: &RegisterContext,
    patch: ControlMeasureUpdate,
) -> Result<ControlMeasure, RepoError> {
    let mut control: ControlMeasure = require(store, id, ctx)?;
    if let Some(description) = patch.description {
        validate_description(&description)?;
        control.description = description;
    }
    if let Some(kci) = patch.key_control_indicator {
        control.key_control_indicator = Some(kci);
    }
    if let Some(target) = patch.target {
        control.target = Some(target);
    }
    if let Some(person) = patch.responsible_person {
        control.responsible_person = Some(person);
    }
    if let Some(deadline) = patch.deadline {
        control.deadline = Some(deadline);
    }
    if let Some(budget) = patch.budget {
        validate_budget(Some(budget))?;
        control.budget = Some(budget);
    }
    control.updated_at = Utc::now();
    put(store, &control)?;
    Ok(control)
}

/// Delete a control measure. Leaf entity: no cascade. Exposure records keep
/// their embedded monitoring entries for the deleted control as history.
pub fn delete(store: &dyn DocumentStore, id: &str, ctx: &RegisterContext) -> Result<(), RepoError> {
    match super::fetch::<ControlMeasure>(store, id, ctx)? {
        Fetch::Missing => Ok(()),
        Fetch::ForeignContext => Err(RepoError::ContextMismatch { id: id.to_string() }),
        Fetch::Found(control) => {
            store.delete(ControlMeasure::COLLECTION, &control.id.to_string())?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{EntityId, EntityPrefix};
    use crate::store::MemoryStore;

    fn ctx() -> RegisterContext {
        RegisterContext::new("u1", "2025")
    }

    fn control(cause_id: &EntityId, control_type: ControlType, seq: u32) -> ControlMeasure {
        ControlMeasure::new(
            cause_id.clone(),
            EntityId::new(EntityPrefix::Risk),
            EntityId::new(EntityPrefix::Goal),
            "u1",
            "2025",
            seq,
            control_type,
            "control",
        )
    }

    #[test]
    fn test_insert_rejects_nonpositive_budget() {
        let store = MemoryStore::new();
        let cause_id = EntityId::new(EntityPrefix::Cause);
        let mut c = control(&cause_id, ControlType::Preventive, 1);
        c.budget = Some(0.0);
        assert!(matches!(insert(&store, &c), Err(RepoError::Validation(_))));

        c.budget = Some(-5.0);
        assert!(matches!(insert(&store, &c), Err(RepoError::Validation(_))));
    }

    #[test]
    fn test_list_for_cause_groups_by_type() {
        let store = MemoryStore::new();
        let cause_id = EntityId::new(EntityPrefix::Cause);
        insert(&store, &control(&cause_id, ControlType::Corrective, 1)).unwrap();
        insert(&store, &control(&cause_id, ControlType::Preventive, 2)).unwrap();
        insert(&store, &control(&cause_id, ControlType::Preventive, 1)).unwrap();

        let listed = list_for_cause(&store, &cause_id.to_string(), &ctx()).unwrap();
        let keys: Vec<_> = listed
            .iter()
            .map(|c| (c.control_type, c.sequence_number))
            .collect();
        assert_eq!(
            keys,
            vec![
                (ControlType::Preventive, 1),
                (ControlType::Preventive, 2),
                (ControlType::Corrective, 1),
            ]
        );
    }

    #[test]
    fn test_max_sequence_scoped_per_type() {
        let store = MemoryStore::new();
        let cause_id = EntityId::new(EntityPrefix::Cause);
        insert(&store, &control(&cause_id, ControlType::Preventive, 3)).unwrap();
        insert(&store, &control(&cause_id, ControlType::Mitigating, 7)).unwrap();

        assert_eq!(
            max_sequence_for_type(&store, &cause_id.to_string(), ControlType::Preventive, &ctx())
                .unwrap(),
            3
        );
        assert_eq!(
            max_sequence_for_type(&store, &cause_id.to_string(), ControlType::Corrective, &ctx())
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        let cause_id = EntityId::new(EntityPrefix::Cause);
        let c = control(&cause_id, ControlType::Preventive, 1);
        insert(&store, &c).unwrap();

        delete(&store, &c.id.to_string(), &ctx()).unwrap();
        delete(&store, &c.id.to_string(), &ctx()).unwrap();
    }
}
