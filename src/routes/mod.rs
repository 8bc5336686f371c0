//! Router assembly.

mod common;
mod resource;

pub use common::common_routes;
pub use resource::resource_routes;

use crate::error::AppError;
use crate::resource::ALL;
use crate::response::message_body;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, StatusCode},
    middleware::map_response,
    response::{IntoResponse, Response},
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, message_body("Not Found"))
}

/// The body limit layer rejects by `content-length` with a plain-text 413; give it the API's `{ "message": ... }` body.
async fn json_payload_too_large(resp: Response) -> Response {
    let is_json = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    if resp.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        return AppError::PayloadTooLarge("length limit exceeded".into()).into_response();
    }
    resp
}

/// Full application: common routes plus every resource, with a request body cap.
pub fn app(state: AppState, body_limit_bytes: usize) -> Router {
    let mut router = common_routes(state.clone());
    for resource in ALL {
        router = router.merge(resource_routes(&state, *resource));
    }
    router
        .fallback(not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .layer(map_response(json_payload_too_large))
}
