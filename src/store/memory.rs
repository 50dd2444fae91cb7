//! In-memory document store
//!
//! Reference implementation of [`DocumentStore`]: nested maps behind one
//! mutex. Batches are applied under a single lock acquisition, which gives
//! the atomicity the cascade contract needs.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use super::{matches, Document, DocumentStore, FieldEq, StoreError, WriteBatch, WriteOp};

/// Mutex-guarded collection map. Cheap to construct per test.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, BTreeMap<String, Document>>> {
        // A poisoned lock means a writer panicked mid-operation; the maps
        // themselves are still structurally valid.
        self.collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let guard = self.lock();
        Ok(guard
            .get(collection)
            .and_then(|coll| coll.get(id))
            .cloned())
    }

    fn put(&self, collection: &str, id: &str, doc: &Document) -> Result<(), StoreError> {
        let mut guard = self.lock();
        guard
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc.clone());
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut guard = self.lock();
        if let Some(coll) = guard.get_mut(collection) {
            coll.remove(id);
        }
        Ok(())
    }

    fn query(&self, collection: &str, filters: &[FieldEq]) -> Result<Vec<Document>, StoreError> {
        let guard = self.lock();
        Ok(guard
            .get(collection)
            .map(|coll| {
                coll.values()
                    .filter(|doc| matches(doc, filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn apply(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut guard = self.lock();
        for op in batch.into_ops() {
            match op {
                WriteOp::Put {
                    collection,
                    id,
                    doc,
                } => {
                    guard.entry(collection).or_default().insert(id, doc);
                }
                WriteOp::Delete { collection, id } => {
                    if let Some(coll) = guard.get_mut(&collection) {
                        coll.remove(&id);
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_get_delete() {
        let store = MemoryStore::new();
        store.put("goals", "g1", &json!({"name": "x"})).unwrap();
        assert!(store.get("goals", "g1").unwrap().is_some());

        store.delete("goals", "g1").unwrap();
        assert!(store.get("goals", "g1").unwrap().is_none());
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let store = MemoryStore::new();
        store.delete("goals", "nope").unwrap();
        store.delete("missing-collection", "nope").unwrap();
    }

    #[test]
    fn test_query_filters() {
        let store = MemoryStore::new();
        store
            .put("goals", "g1", &json!({"userId": "u1", "period": "2025"}))
            .unwrap();
        store
            .put("goals", "g2", &json!({"userId": "u2", "period": "2025"}))
            .unwrap();

        let hits = store
            .query("goals", &[FieldEq::new("userId", "u1")])
            .unwrap();
        assert_eq!(hits.len(), 1);

        let all = store.query("goals", &[]).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_batch_apply() {
        let store = MemoryStore::new();
        store.put("goals", "g1", &json!({"n": 1})).unwrap();

        let mut batch = WriteBatch::new();
        batch
            .delete("goals", "g1")
            .put("risks", "r1", json!({"n": 2}));
        store.apply(batch).unwrap();

        assert!(store.get("goals", "g1").unwrap().is_none());
        assert!(store.get("risks", "r1").unwrap().is_some());
    }
}
