//! Resource handlers: list, read, create, replace, delete.

use crate::error::AppError;
use crate::extractors::JsonBody;
use crate::filter::{DocumentFilter, ListParams};
use crate::response::{created, ok};
use crate::service::CrudService;
use crate::state::ResourceState;
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
};

type IdPath = Result<Path<String>, PathRejection>;

/// Path segments that fail to decode (e.g. invalid UTF-8) get the API's error body.
fn path_id(path: IdPath) -> Result<String, AppError> {
    path.map(|Path(id)| id)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

pub async fn list(
    State(ctx): State<ResourceState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(pairs) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let filter = DocumentFilter::from(&ListParams::from_pairs(pairs));
    tracing::debug!(collection = ctx.resource.collection, ?filter, "list");
    let docs = CrudService::list(ctx.store.as_ref(), &ctx.resource, &filter).await?;
    Ok(ok(docs))
}

pub async fn read(State(ctx): State<ResourceState>, path: IdPath) -> Result<impl IntoResponse, AppError> {
    let id = path_id(path)?;
    let doc = CrudService::read(ctx.store.as_ref(), &ctx.resource, &id).await?;
    Ok(ok(doc))
}

pub async fn create(
    State(ctx): State<ResourceState>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let doc = CrudService::create(ctx.store.as_ref(), &ctx.resource, body).await?;
    Ok(created(doc))
}

pub async fn replace(
    State(ctx): State<ResourceState>,
    path: IdPath,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(path)?;
    let doc = CrudService::replace(ctx.store.as_ref(), &ctx.resource, &id, body).await?;
    Ok(ok(doc))
}

pub async fn delete(State(ctx): State<ResourceState>, path: IdPath) -> Result<impl IntoResponse, AppError> {
    let id = path_id(path)?;
    CrudService::delete(ctx.store.as_ref(), &ctx.resource, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
