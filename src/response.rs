//! Response body helpers. Resources are returned bare; messages as `{ "message": ... }`.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct MessageBody {
    pub message: String,
}

pub fn ok<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}

pub fn message_body(message: impl Into<String>) -> Json<MessageBody> {
    Json(MessageBody {
        message: message.into(),
    })
}
