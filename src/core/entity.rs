//! Record trait - common interface binding entities to store collections

use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};

/// Common trait for all register entities persisted in the document store.
///
/// Every record is scoped by `(userId, period)`; the accessors here let the
/// repository layer verify ownership generically before acting.
pub trait Record: Serialize + DeserializeOwned {
    /// Store collection this entity lives in (e.g. "goals")
    const COLLECTION: &'static str;

    /// The entity ID prefix (e.g. `GOAL`)
    const PREFIX: EntityPrefix;

    /// Get the record's unique ID
    fn id(&self) -> &EntityId;

    /// Owning user
    fn user_id(&self) -> &str;

    /// Owning period
    fn period(&self) -> &str;
}
