//! Catalog API: products and users CRUD over a JSON document store.

pub mod config;
pub mod error;
pub mod extractors;
pub mod filter;
pub mod handlers;
pub mod object_id;
pub mod resource;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::Settings;
pub use error::{AppError, ConfigError};
pub use filter::{DocumentFilter, ListParams};
pub use object_id::ObjectId;
pub use resource::{Resource, PRODUCTS, USERS};
pub use routes::{app, common_routes, resource_routes};
pub use service::CrudService;
pub use state::{AppState, ResourceState};
pub use store::{
    ensure_collections, ensure_database_exists, Document, DocumentStore, MemoryDocumentStore, PgDocumentStore,
    ReplaceOutcome,
};
