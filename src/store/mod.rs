//! Document storage: one collection per resource, each document keyed by an [`ObjectId`].
//!
//! Documents handed to and returned from a store carry their key in `_id`.

mod memory;
mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::{ensure_collections, ensure_database_exists, PgDocumentStore};

use crate::error::AppError;
use crate::filter::DocumentFilter;
use crate::object_id::ObjectId;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Field holding a document's identifier.
pub const ID_FIELD: &str = "_id";

/// An open JSON object.
pub type Document = Map<String, Value>;

/// Result of a full-document replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaceOutcome {
    pub matched: u64,
    pub modified: u64,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents matching `filter`, in insertion order, capped at `filter.limit`.
    async fn find(&self, collection: &str, filter: &DocumentFilter) -> Result<Vec<Document>, AppError>;

    async fn find_one(&self, collection: &str, id: &ObjectId) -> Result<Option<Document>, AppError>;

    /// Stores `doc` under `id`. `doc` must not contain `_id`. Returns once the write is acknowledged.
    async fn insert_one(&self, collection: &str, id: ObjectId, doc: Document) -> Result<(), AppError>;

    /// Replaces the body of document `id`; `doc` must not contain `_id`.
    async fn replace_one(&self, collection: &str, id: &ObjectId, doc: Document) -> Result<ReplaceOutcome, AppError>;

    /// Returns the number of documents deleted (0 or 1).
    async fn delete_one(&self, collection: &str, id: &ObjectId) -> Result<u64, AppError>;

    /// Cheap connectivity check behind `/ready`.
    async fn ping(&self) -> Result<(), AppError>;

    /// Release connections. Called once at shutdown.
    async fn close(&self) {}
}

/// Sets `_id` on the document, replacing any `_id` already there. Keys stay in map (sorted) order.
pub fn with_id(id: &ObjectId, body: Document) -> Document {
    let mut doc = Document::with_capacity(body.len() + 1);
    doc.insert(ID_FIELD.to_string(), Value::String(id.to_hex()));
    doc.extend(body.into_iter().filter(|(k, _)| k != ID_FIELD));
    doc
}
