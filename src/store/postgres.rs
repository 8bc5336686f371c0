//! PostgreSQL document store: one JSONB table per collection.

use super::{with_id, Document, DocumentStore, ReplaceOutcome};
use crate::error::{AppError, ConfigError};
use crate::filter::DocumentFilter;
use crate::object_id::ObjectId;
use crate::sql::{self, qualified_table, quoted, QueryBuf};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPool};
use sqlx::query::Query;
use sqlx::{ConnectOptions, Postgres};
use std::str::FromStr;

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    schema: String,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        PgDocumentStore {
            pool,
            schema: schema.into(),
        }
    }

    fn table(&self, collection: &str) -> String {
        qualified_table(&self.schema, collection)
    }

    fn bind(q: &QueryBuf) -> Query<'_, Postgres, PgArguments> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        query
    }
}

/// Turns a stored `(id, body)` row back into a document.
fn row_to_document(id: &str, body: Value) -> Result<Document, AppError> {
    let id = ObjectId::from_str(id)?;
    match body {
        Value::Object(map) => Ok(with_id(&id, map)),
        other => Err(AppError::Db(sqlx::Error::Decode(
            format!("document {} is not an object: {}", id, other).into(),
        ))),
    }
}

fn insert_error(err: sqlx::Error, id: &ObjectId) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(format!("duplicate id: {}", id)),
        _ => AppError::Db(err),
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find(&self, collection: &str, filter: &DocumentFilter) -> Result<Vec<Document>, AppError> {
        use sqlx::Row;
        let q = sql::select_list(&self.table(collection), filter);
        let rows = Self::bind(&q).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|r| row_to_document(r.try_get("id")?, r.try_get("body")?))
            .collect()
    }

    async fn find_one(&self, collection: &str, id: &ObjectId) -> Result<Option<Document>, AppError> {
        use sqlx::Row;
        let q = sql::select_by_id(&self.table(collection), id);
        let row = Self::bind(&q).fetch_optional(&self.pool).await?;
        row.map(|r| row_to_document(r.try_get("id")?, r.try_get("body")?))
            .transpose()
    }

    async fn insert_one(&self, collection: &str, id: ObjectId, doc: Document) -> Result<(), AppError> {
        let q = sql::insert(&self.table(collection), &id, doc);
        Self::bind(&q)
            .execute(&self.pool)
            .await
            .map_err(|e| insert_error(e, &id))?;
        Ok(())
    }

    async fn replace_one(&self, collection: &str, id: &ObjectId, doc: Document) -> Result<ReplaceOutcome, AppError> {
        use sqlx::Row;
        let q = sql::replace(&self.table(collection), id, doc);
        let row = Self::bind(&q).fetch_optional(&self.pool).await?;
        Ok(match row {
            Some(r) => {
                let modified: bool = r.try_get("modified")?;
                ReplaceOutcome {
                    matched: 1,
                    modified: u64::from(modified),
                }
            }
            None => ReplaceOutcome::default(),
        })
    }

    async fn delete_one(&self, collection: &str, id: &ObjectId) -> Result<u64, AppError> {
        let q = sql::delete(&self.table(collection), id);
        let done = Self::bind(&q).execute(&self.pool).await?;
        Ok(done.rows_affected())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("database pool closed");
    }
}

/// Create `schema` if needed, then one table per collection.
pub async fn ensure_collections(pool: &PgPool, schema: &str, collections: &[&str]) -> Result<(), AppError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(schema)))
        .execute(pool)
        .await?;
    for collection in collections {
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                seq BIGSERIAL NOT NULL,
                id TEXT PRIMARY KEY,
                body JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            qualified_table(schema, collection)
        );
        sqlx::query(&ddl).execute(pool).await?;
        tracing::debug!(schema, collection, "collection ready");
    }
    Ok(())
}

/// Connect to the server's `postgres` database and create the target database if it does not exist.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url).map_err(|_| ConfigError::Invalid {
        key: "DATABASE_URL",
        value: redact(database_url),
    })?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quoted(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "created database");
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let scheme_end = url.find("://").map(|i| i + 3).unwrap_or(0);
    let path_start = url
        .get(scheme_end..)
        .and_then(|rest| rest.find('/'))
        .map(|i| scheme_end + i + 1)
        .ok_or_else(|| ConfigError::Invalid {
            key: "DATABASE_URL",
            value: redact(url),
        })?;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let query = path_and_query.find('?').map(|i| &path_and_query[i..]).unwrap_or("");
    Ok((format!("{}postgres{}", base, query), db_name.to_string()))
}

/// Drop credentials before a URL reaches logs or error messages.
fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(s), Some(at)) if at > s => format!("{}***{}", &url[..s + 3], &url[at..]),
        _ => url.to_string(),
    }
}
