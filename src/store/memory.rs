//! In-process document store. Used when no database is configured, and by tests.

use super::{with_id, Document, DocumentStore, ReplaceOutcome};
use crate::error::AppError;
use crate::filter::DocumentFilter;
use crate::object_id::ObjectId;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Collections kept in insertion order.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<(ObjectId, Document)>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find(&self, collection: &str, filter: &DocumentFilter) -> Result<Vec<Document>, AppError> {
        let guard = self.collections.read().await;
        let Some(docs) = guard.get(collection) else {
            return Ok(Vec::new());
        };
        let limit = filter
            .limit
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(usize::MAX);
        Ok(docs
            .iter()
            .filter(|(_, body)| filter.matches(body))
            .take(limit)
            .map(|(id, body)| with_id(id, body.clone()))
            .collect())
    }

    async fn find_one(&self, collection: &str, id: &ObjectId) -> Result<Option<Document>, AppError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .and_then(|docs| docs.iter().find(|(k, _)| k == id))
            .map(|(k, body)| with_id(k, body.clone())))
    }

    async fn insert_one(&self, collection: &str, id: ObjectId, doc: Document) -> Result<(), AppError> {
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection.to_string()).or_default();
        if docs.iter().any(|(k, _)| *k == id) {
            return Err(AppError::Conflict(format!("duplicate id: {}", id)));
        }
        docs.push((id, doc));
        Ok(())
    }

    async fn replace_one(&self, collection: &str, id: &ObjectId, doc: Document) -> Result<ReplaceOutcome, AppError> {
        let mut guard = self.collections.write().await;
        let Some(slot) = guard
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|(k, _)| k == id))
        else {
            return Ok(ReplaceOutcome::default());
        };
        let modified = u64::from(slot.1 != doc);
        slot.1 = doc;
        Ok(ReplaceOutcome { matched: 1, modified })
    }

    async fn delete_one(&self, collection: &str, id: &ObjectId) -> Result<u64, AppError> {
        let mut guard = self.collections.write().await;
        let Some(docs) = guard.get_mut(collection) else {
            return Ok(0);
        };
        match docs.iter().position(|(k, _)| k == id) {
            Some(i) => {
                docs.remove(i);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
