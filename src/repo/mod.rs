//! Entity repositories
//!
//! One module per entity type, each offering create/read/update/delete
//! against the document store. Shared plumbing lives here: ownership
//! verification against the caller's `(userId, period)`, document
//! encode/decode, and the error taxonomy.
//!
//! Repositories never assign sequence numbers; callers reserve them from the
//! persisted per-scope counters (`repo::sequence`) so batch operations keep
//! incrementing across one pass and deleted numbers never return.

pub mod control_measure;
pub mod goal;
pub mod monitoring_session;
pub mod potential_risk;
pub mod risk_cause;
pub mod risk_exposure;
pub mod sequence;

use thiserror::Error;

use crate::core::context::RegisterContext;
use crate::core::entity::Record;
use crate::store::{Document, DocumentStore, FieldEq, StoreError};

/// Repository error taxonomy
#[derive(Debug, Error)]
pub enum RepoError {
    /// Malformed input rejected before any I/O
    #[error("invalid input: {0}")]
    Validation(String),

    /// No record with the given id
    #[error("record '{id}' not found")]
    NotFound { id: String },

    /// Record exists but belongs to another `(userId, period)`. Rendered
    /// identically to NotFound so cross-tenant existence never leaks, while
    /// staying distinguishable for callers and diagnostics.
    #[error("record '{id}' not found")]
    ContextMismatch { id: String },

    /// Underlying document-store failure, wrapped with its own message
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    /// Stored document does not decode into the expected entity shape
    #[error("corrupt record in '{collection}': {message}")]
    Decode {
        collection: String,
        message: String,
    },
}

/// Outcome of a context-checked single read. Missing and ForeignContext both
/// surface as `None` in public reads, but cascade and mutation paths need
/// the distinction.
#[derive(Debug)]
pub enum Fetch<T> {
    Found(T),
    Missing,
    ForeignContext,
}

impl<T> Fetch<T> {
    /// Collapse to the public read view: a foreign-context hit is not found
    pub fn into_option(self) -> Option<T> {
        match self {
            Fetch::Found(t) => Some(t),
            _ => None,
        }
    }
}

pub(crate) fn encode<T: Record>(entity: &T) -> Result<Document, RepoError> {
    serde_json::to_value(entity).map_err(|e| RepoError::Store(StoreError::Serialize(e.to_string())))
}

pub(crate) fn decode<T: Record>(doc: Document) -> Result<T, RepoError> {
    serde_json::from_value(doc).map_err(|e| RepoError::Decode {
        collection: T::COLLECTION.to_string(),
        message: e.to_string(),
    })
}

/// The two filters every scoped query carries
pub(crate) fn ctx_filters(ctx: &RegisterContext) -> Vec<FieldEq> {
    vec![
        FieldEq::new("userId", ctx.user_id.as_str()),
        FieldEq::new("period", ctx.period.as_str()),
    ]
}

/// Context-checked single read
pub fn fetch<T: Record>(
    store: &dyn DocumentStore,
    id: &str,
    ctx: &RegisterContext,
) -> Result<Fetch<T>, RepoError> {
    let Some(doc) = store.get(T::COLLECTION, id)? else {
        return Ok(Fetch::Missing);
    };
    let entity: T = decode(doc)?;
    if !ctx.owns(entity.user_id(), entity.period()) {
        return Ok(Fetch::ForeignContext);
    }
    Ok(Fetch::Found(entity))
}

/// Public single read: None on absence or context mismatch
pub fn get<T: Record>(
    store: &dyn DocumentStore,
    id: &str,
    ctx: &RegisterContext,
) -> Result<Option<T>, RepoError> {
    Ok(fetch::<T>(store, id, ctx)?.into_option())
}

/// Persist one entity document
pub(crate) fn put<T: Record>(store: &dyn DocumentStore, entity: &T) -> Result<(), RepoError> {
    let doc = encode(entity)?;
    store.put(T::COLLECTION, &entity.id().to_string(), &doc)?;
    Ok(())
}

/// Scoped query: context filters plus any extra equality filters
pub(crate) fn query_scoped<T: Record>(
    store: &dyn DocumentStore,
    ctx: &RegisterContext,
    extra: impl IntoIterator<Item = FieldEq>,
) -> Result<Vec<T>, RepoError> {
    let mut filters = ctx_filters(ctx);
    filters.extend(extra);
    store
        .query(T::COLLECTION, &filters)?
        .into_iter()
        .map(decode)
        .collect()
}

/// Load a record for mutation: absent id is NotFound, foreign context is
/// ContextMismatch (an authorization failure, rendered as not-found)
pub(crate) fn require<T: Record>(
    store: &dyn DocumentStore,
    id: &str,
    ctx: &RegisterContext,
) -> Result<T, RepoError> {
    match fetch::<T>(store, id, ctx)? {
        Fetch::Found(t) => Ok(t),
        Fetch::Missing => Err(RepoError::NotFound { id: id.to_string() }),
        Fetch::ForeignContext => Err(RepoError::ContextMismatch { id: id.to_string() }),
    }
}

/// Shared validation: descriptions must not be blank
pub(crate) fn validate_description(description: &str) -> Result<(), RepoError> {
    if description.trim().is_empty() {
        return Err(RepoError::Validation(
            "description must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Shared validation: sequence numbers are 1-based
pub(crate) fn validate_sequence(sequence_number: u32) -> Result<(), RepoError> {
    if sequence_number == 0 {
        return Err(RepoError::Validation(
            "sequence number must be positive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Goal;
    use crate::store::MemoryStore;

    #[test]
    fn test_fetch_distinguishes_missing_from_foreign() {
        let store = MemoryStore::new();
        let ctx = RegisterContext::new("u1", "2025");
        let other = RegisterContext::new("u2", "2025");

        let goal = Goal::new("u1", "2025", 1, "G", "D");
        put(&store, &goal).unwrap();
        let id = goal.id.to_string();

        assert!(matches!(
            fetch::<Goal>(&store, &id, &ctx).unwrap(),
            Fetch::Found(_)
        ));
        assert!(matches!(
            fetch::<Goal>(&store, &id, &other).unwrap(),
            Fetch::ForeignContext
        ));
        assert!(matches!(
            fetch::<Goal>(&store, "GOAL-01HQ3K4N5M6P7R8S9T0VWXYZAB", &ctx).unwrap(),
            Fetch::Missing
        ));

        // Public read collapses both to None
        assert!(get::<Goal>(&store, &id, &other).unwrap().is_none());
    }

    #[test]
    fn test_context_mismatch_renders_as_not_found() {
        let not_found = RepoError::NotFound {
            id: "GOAL-X".to_string(),
        };
        let mismatch = RepoError::ContextMismatch {
            id: "GOAL-X".to_string(),
        };
        assert_eq!(not_found.to_string(), mismatch.to_string());
    }
}
