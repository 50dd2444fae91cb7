//! Persisted sequence high-water marks
//!
//! Sequence numbers feed the composite display codes, so a number must never
//! come back once its record is deleted. Live siblings alone cannot
//! guarantee that: deleting the highest sibling would roll the next number
//! back. Each numbering scope keeps a small counter document recording the
//! highest number ever handed out; a reservation takes
//! `max(counter, live siblings) + 1` and writes the counter back. Stores
//! written before counters existed fall back to the live maximum.

use serde::{Deserialize, Serialize};

use super::RepoError;
use crate::core::context::RegisterContext;
use crate::entities::ControlType;
use crate::store::{DocumentStore, StoreError};

const COLLECTION: &str = "sequences";

/// Scope key for top-level goal numbering
pub(crate) const GOALS: &str = "goals";

/// Scope key for potential risks under one goal
pub(crate) fn potential_risks(goal_id: &str) -> String {
    format!("potentialRisks-{goal_id}")
}

/// Scope key for risk causes under one potential risk
pub(crate) fn risk_causes(potential_risk_id: &str) -> String {
    format!("riskCauses-{potential_risk_id}")
}

/// Scope key for control measures of one type under one cause
pub(crate) fn control_measures(risk_cause_id: &str, control_type: ControlType) -> String {
    format!("controlMeasures-{risk_cause_id}-{control_type}")
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SequenceCounter {
    id: String,
    user_id: String,
    period: String,
    scope: String,
    high_water: u32,
}

fn counter_id(ctx: &RegisterContext, scope: &str) -> String {
    format!("{}-{}-{}", ctx.user_id, ctx.period, scope)
}

/// Hand out the next number for a scope and persist the new high-water mark.
/// `live_max` is the highest sequence among surviving siblings; it floors
/// the counter so pre-counter data keeps numbering correctly.
pub(crate) fn reserve(
    store: &dyn DocumentStore,
    ctx: &RegisterContext,
    scope: &str,
    live_max: u32,
) -> Result<u32, RepoError> {
    let id = counter_id(ctx, scope);
    let recorded = match store.get(COLLECTION, &id)? {
        Some(doc) => {
            let counter: SequenceCounter =
                serde_json::from_value(doc).map_err(|e| RepoError::Decode {
                    collection: COLLECTION.to_string(),
                    message: e.to_string(),
                })?;
            counter.high_water
        }
        None => 0,
    };

    let seq = recorded.max(live_max) + 1;
    let counter = SequenceCounter {
        id: id.clone(),
        user_id: ctx.user_id.clone(),
        period: ctx.period.clone(),
        scope: scope.to_string(),
        high_water: seq,
    };
    let doc = serde_json::to_value(&counter)
        .map_err(|e| RepoError::Store(StoreError::Serialize(e.to_string())))?;
    store.put(COLLECTION, &id, &doc)?;
    Ok(seq)
}
