//! YAML-file document store
//!
//! One YAML file per document under `<root>/<collection>/<id>.yaml`, the same
//! plain-text layout the rest of the toolkit uses for everything else: diffs
//! stay reviewable and the register can live under version control.
//!
//! Batches are applied under one lock; atomicity against concurrent *readers
//! in the same process* is what the cascade contract needs here. Crash
//! atomicity across files is out of scope for a plain-text store.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{matches, Document, DocumentStore, FieldEq, StoreError, WriteBatch, WriteOp};

/// Document store rooted at a directory, one subdirectory per collection
pub struct YamlStore {
    root: PathBuf,
    // Serializes writers and keeps batch application exclusive with queries
    lock: Mutex<()>,
}

impl YamlStore {
    /// Open (or lazily create) a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn doc_path(&self, collection: &str, id: &str) -> PathBuf {
        self.root.join(collection).join(format!("{}.yaml", id))
    }

    fn read_doc(&self, collection: &str, path: &Path) -> Result<Document, StoreError> {
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let content =
            fs::read_to_string(path).map_err(|e| StoreError::io(collection, e))?;
        serde_yml::from_str(&content).map_err(|e| StoreError::corrupt(collection, &id, e))
    }

    fn write_doc(&self, collection: &str, id: &str, doc: &Document) -> Result<(), StoreError> {
        let dir = self.root.join(collection);
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(collection, e))?;

        let content =
            serde_yml::to_string(doc).map_err(|e| StoreError::Serialize(e.to_string()))?;

        // Write-then-rename so a reader never sees a torn file
        let tmp = dir.join(format!(".{}.yaml.tmp", id));
        let path = self.doc_path(collection, id);
        fs::write(&tmp, content).map_err(|e| StoreError::io(collection, e))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::io(collection, e))?;
        Ok(())
    }

    fn remove_doc(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let path = self.doc_path(collection, id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(collection, e)),
        }
    }
}

impl DocumentStore for YamlStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let path = self.doc_path(collection, id);
        if !path.exists() {
            return Ok(None);
        }
        self.read_doc(collection, &path).map(Some)
    }

    fn put(&self, collection: &str, id: &str, doc: &Document) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        self.write_doc(collection, id, doc)
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        self.remove_doc(collection, id)
    }

    fn query(&self, collection: &str, filters: &[FieldEq]) -> Result<Vec<Document>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let dir = self.root.join(collection);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut docs = Vec::new();
        for entry in walkdir::WalkDir::new(&dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "yaml"))
        {
            let doc = self.read_doc(collection, entry.path())?;
            if matches(&doc, filters) {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    fn apply(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        for op in batch.into_ops() {
            match op {
                WriteOp::Put {
                    collection,
                    id,
                    doc,
                } => self.write_doc(&collection, &id, &doc)?,
                WriteOp::Delete { collection, id } => self.remove_doc(&collection, &id)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_put_creates_collection_dir() {
        let tmp = tempdir().unwrap();
        let store = YamlStore::new(tmp.path());

        store.put("goals", "g1", &json!({"name": "x"})).unwrap();
        assert!(tmp.path().join("goals/g1.yaml").exists());
        assert_eq!(
            store.get("goals", "g1").unwrap().unwrap()["name"],
            json!("x")
        );
    }

    #[test]
    fn test_query_empty_for_missing_collection() {
        let tmp = tempdir().unwrap();
        let store = YamlStore::new(tmp.path());
        assert!(store.query("goals", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_query_applies_filters() {
        let tmp = tempdir().unwrap();
        let store = YamlStore::new(tmp.path());
        store
            .put("goals", "g1", &json!({"userId": "u1", "period": "2025"}))
            .unwrap();
        store
            .put("goals", "g2", &json!({"userId": "u1", "period": "2024"}))
            .unwrap();

        let hits = store
            .query(
                "goals",
                &[FieldEq::new("userId", "u1"), FieldEq::new("period", "2025")],
            )
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["period"], json!("2025"));
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let tmp = tempdir().unwrap();
        let store = YamlStore::new(tmp.path());
        store.delete("goals", "never-existed").unwrap();
    }

    #[test]
    fn test_batch_apply() {
        let tmp = tempdir().unwrap();
        let store = YamlStore::new(tmp.path());
        store.put("goals", "g1", &json!({"n": 1})).unwrap();

        let mut batch = WriteBatch::new();
        batch
            .delete("goals", "g1")
            .put("riskCauses", "c1", json!({"n": 2}));
        store.apply(batch).unwrap();

        assert!(store.get("goals", "g1").unwrap().is_none());
        assert!(store.get("riskCauses", "c1").unwrap().is_some());
    }

    #[test]
    fn test_corrupt_document_surfaces_error() {
        let tmp = tempdir().unwrap();
        let store = YamlStore::new(tmp.path());
        fs::create_dir_all(tmp.path().join("goals")).unwrap();
        fs::write(tmp.path().join("goals/bad.yaml"), "{not: [valid").unwrap();

        let err = store.query("goals", &[]).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }
}
