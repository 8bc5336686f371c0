//! Generic CRUD over one resource's collection.

use crate::error::AppError;
use crate::filter::DocumentFilter;
use crate::object_id::ObjectId;
use crate::resource::Resource;
use crate::store::{with_id, Document, DocumentStore, ID_FIELD};
use serde_json::Value;
use std::str::FromStr;

pub struct CrudService;

impl CrudService {
    /// Documents matching `filter`. An empty result is not an error.
    pub async fn list(
        store: &dyn DocumentStore,
        resource: &Resource,
        filter: &DocumentFilter,
    ) -> Result<Vec<Document>, AppError> {
        store.find(resource.collection, filter).await
    }

    pub async fn read(store: &dyn DocumentStore, resource: &Resource, id_str: &str) -> Result<Document, AppError> {
        let id = ObjectId::from_str(id_str)?;
        store
            .find_one(resource.collection, &id)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_hex()))
    }

    /// Stores `body` as-is. A caller-supplied `_id` is kept when it is a valid id; otherwise one is assigned.
    /// Returns the stored document once the write is acknowledged.
    pub async fn create(store: &dyn DocumentStore, resource: &Resource, body: Value) -> Result<Document, AppError> {
        let mut doc = body_to_document(body)?;
        let id = match doc.remove(ID_FIELD) {
            Some(Value::String(s)) => ObjectId::from_str(&s)?,
            Some(other) => return Err(AppError::InvalidIdentifier(other.to_string())),
            None => ObjectId::new(),
        };
        store.insert_one(resource.collection, id, doc.clone()).await?;
        tracing::info!(collection = resource.collection, id = %id, "document created");
        Ok(with_id(&id, doc))
    }

    /// Full replacement. Succeeds whenever the id matched, even if the content was unchanged.
    pub async fn replace(
        store: &dyn DocumentStore,
        resource: &Resource,
        id_str: &str,
        body: Value,
    ) -> Result<Document, AppError> {
        let id = ObjectId::from_str(id_str)?;
        let mut doc = body_to_document(body)?;
        if let Some(given) = doc.remove(ID_FIELD) {
            let same = given
                .as_str()
                .and_then(|s| ObjectId::from_str(s).ok())
                .is_some_and(|g| g == id);
            if !same {
                return Err(AppError::BadRequest(format!("_id is immutable (expected {})", id)));
            }
        }
        let outcome = store.replace_one(resource.collection, &id, doc.clone()).await?;
        if outcome.matched == 0 {
            return Err(AppError::NotFound(id.to_hex()));
        }
        tracing::info!(collection = resource.collection, id = %id, modified = outcome.modified, "document replaced");
        Ok(with_id(&id, doc))
    }

    pub async fn delete(store: &dyn DocumentStore, resource: &Resource, id_str: &str) -> Result<(), AppError> {
        let id = ObjectId::from_str(id_str)?;
        let deleted = store.delete_one(resource.collection, &id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound(id.to_hex()));
        }
        tracing::info!(collection = resource.collection, id = %id, "document deleted");
        Ok(())
    }
}

fn body_to_document(value: Value) -> Result<Document, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}
