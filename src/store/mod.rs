//! Document store collaborator
//!
//! The register treats persistence as an opaque collection-oriented store:
//! CRUD by id, query by equality filter, and atomic multi-document batches
//! (cascading deletes rely on batches so a reader never observes a
//! half-deleted tree). Two implementations ship: an in-memory store used by
//! tests and a YAML-file store used by the CLI.

pub mod memory;
pub mod yaml;

use serde_json::Value;
use thiserror::Error;

pub use memory::MemoryStore;
pub use yaml::YamlStore;

/// Wire representation of a stored document
pub type Document = Value;

/// Field equality filter for queries
#[derive(Debug, Clone)]
pub struct FieldEq {
    pub field: String,
    pub value: Value,
}

impl FieldEq {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// A single write inside a batch
#[derive(Debug, Clone)]
pub enum WriteOp {
    Put {
        collection: String,
        id: String,
        doc: Document,
    },
    Delete {
        collection: String,
        id: String,
    },
}

/// An atomic multi-document write. Cascading deletes are expressed as one
/// batch so concurrent readers see either the full pre-delete tree or the
/// full post-delete state.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, collection: &str, id: &str, doc: Document) -> &mut Self {
        self.ops.push(WriteOp::Put {
            collection: collection.to_string(),
            id: id.to_string(),
            doc,
        });
        self
    }

    pub fn delete(&mut self, collection: &str, id: &str) -> &mut Self {
        self.ops.push(WriteOp::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Errors raised by a document store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failure in '{collection}': {message}")]
    Io {
        collection: String,
        message: String,
    },

    #[error("malformed document '{id}' in '{collection}': {message}")]
    Corrupt {
        collection: String,
        id: String,
        message: String,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(String),
}

impl StoreError {
    pub fn io(collection: &str, err: impl std::fmt::Display) -> Self {
        StoreError::Io {
            collection: collection.to_string(),
            message: err.to_string(),
        }
    }

    pub fn corrupt(collection: &str, id: &str, err: impl std::fmt::Display) -> Self {
        StoreError::Corrupt {
            collection: collection.to_string(),
            id: id.to_string(),
            message: err.to_string(),
        }
    }
}

/// Collection-oriented document store with equality-filter queries and
/// atomic batches. Deletes are idempotent: removing an absent id succeeds.
pub trait DocumentStore: Send + Sync {
    /// Read one document by id, None if absent
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Create or replace one document
    fn put(&self, collection: &str, id: &str, doc: &Document) -> Result<(), StoreError>;

    /// Remove one document; absent id is a no-op success
    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// All documents in a collection matching every filter
    fn query(&self, collection: &str, filters: &[FieldEq]) -> Result<Vec<Document>, StoreError>;

    /// Apply a batch atomically
    fn apply(&self, batch: WriteBatch) -> Result<(), StoreError>;
}

/// Does a document match every equality filter?
pub(crate) fn matches(doc: &Document, filters: &[FieldEq]) -> bool {
    filters
        .iter()
        .all(|f| doc.get(&f.field) == Some(&f.value))
}
