#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use catalog_api::{
    app, AppError, AppState, Document, DocumentFilter, DocumentStore, MemoryDocumentStore, ObjectId, ReplaceOutcome,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const BODY_LIMIT: usize = 4 * 1024;

pub fn setup_test_app() -> Router {
    app(AppState::new(Arc::new(MemoryDocumentStore::new())), BODY_LIMIT)
}

pub fn setup_failing_app() -> Router {
    app(AppState::new(Arc::new(FailingStore)), BODY_LIMIT)
}

/// Sends one request; returns status and parsed JSON body (`Value::Null` when empty).
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&v).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    send_request(app, request).await
}

pub async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

/// Creates a document and returns its assigned id.
pub async fn create(app: &Router, collection: &str, body: Value) -> String {
    let (status, created) = send(app, "POST", &format!("/{}", collection), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    created["_id"].as_str().unwrap().to_string()
}

/// Store whose every operation fails like an unreachable database.
pub struct FailingStore;

#[async_trait]
impl DocumentStore for FailingStore {
    async fn find(&self, _: &str, _: &DocumentFilter) -> Result<Vec<Document>, AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn find_one(&self, _: &str, _: &ObjectId) -> Result<Option<Document>, AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn insert_one(&self, _: &str, _: ObjectId, _: Document) -> Result<(), AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn replace_one(&self, _: &str, _: &ObjectId, _: Document) -> Result<ReplaceOutcome, AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn delete_one(&self, _: &str, _: &ObjectId) -> Result<u64, AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }
}
