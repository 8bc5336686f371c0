//! Per-resource CRUD routes.

use crate::handlers::{create, delete, list, read, replace};
use crate::resource::Resource;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

/// `GET|POST /<collection>` (GET only when listable) and `GET|PUT|DELETE /<collection>/:id`.
pub fn resource_routes(state: &AppState, resource: Resource) -> Router {
    let collection_route = if resource.listable {
        get(list).post(create)
    } else {
        post(create)
    };
    Router::new()
        .route(&format!("/{}", resource.collection), collection_route)
        .route(
            &format!("/{}/:id", resource.collection),
            get(read).put(replace).delete(delete),
        )
        .with_state(state.for_resource(resource))
}
