//! Builds parameterized document queries. Identifiers come from configuration only; values are always parameters.

use super::PgBindValue;
use crate::filter::{DocumentFilter, NAME_FIELD, PRICE_FIELD};
use crate::object_id::ObjectId;
use crate::store::Document;
use serde_json::Value;

/// Quote identifier for PostgreSQL.
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Schema-qualified collection table.
pub fn qualified_table(schema: &str, collection: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(collection))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: PgBindValue) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// JSON string literal for a document key, usable after `->` / `->>`.
fn field_key(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// SELECT matching documents in insertion order.
pub fn select_list(table: &str, filter: &DocumentFilter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut conditions: Vec<String> = Vec::new();

    if let Some(bound) = filter.max_price {
        let n = q.push_param(PgBindValue::F64(bound));
        let key = field_key(PRICE_FIELD);
        conditions.push(format!(
            "(CASE WHEN jsonb_typeof(body->{key}) = 'number' THEN (body->>{key})::float8 <= ${n}::float8 ELSE FALSE END)"
        ));
    }
    if let Some(needle) = &filter.name_contains {
        let n = q.push_param(PgBindValue::Text(needle.clone()));
        let key = field_key(NAME_FIELD);
        conditions.push(format!(
            "(CASE WHEN jsonb_typeof(body->{key}) = 'string' THEN strpos(lower(body->>{key}), lower(${n}::text)) > 0 ELSE FALSE END)"
        ));
    }

    q.sql = format!("SELECT id, body FROM {}", table);
    if !conditions.is_empty() {
        q.sql.push_str(" WHERE ");
        q.sql.push_str(&conditions.join(" AND "));
    }
    q.sql.push_str(" ORDER BY seq");
    if let Some(limit) = filter.limit {
        let n = q.push_param(PgBindValue::I64(i64::try_from(limit).unwrap_or(i64::MAX)));
        q.sql.push_str(&format!(" LIMIT ${}::int8", n));
    }
    q
}

pub fn select_by_id(table: &str, id: &ObjectId) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::Text(id.to_hex()));
    q.sql = format!("SELECT id, body FROM {} WHERE id = ${}", table, n);
    q
}

pub fn insert(table: &str, id: &ObjectId, body: Document) -> QueryBuf {
    let mut q = QueryBuf::new();
    let id_n = q.push_param(PgBindValue::Text(id.to_hex()));
    let body_n = q.push_param(PgBindValue::Json(Value::Object(body)));
    q.sql = format!("INSERT INTO {} (id, body) VALUES (${}, ${})", table, id_n, body_n);
    q
}

/// Full replacement. Returns one row `(modified bool)` when the id matched, none otherwise.
pub fn replace(table: &str, id: &ObjectId, body: Document) -> QueryBuf {
    let mut q = QueryBuf::new();
    let id_n = q.push_param(PgBindValue::Text(id.to_hex()));
    let body_n = q.push_param(PgBindValue::Json(Value::Object(body)));
    q.sql = format!(
        "WITH prev AS (SELECT id, body FROM {table} WHERE id = ${id_n} FOR UPDATE) \
         UPDATE {table} AS t SET body = ${body_n} FROM prev WHERE t.id = prev.id \
         RETURNING (prev.body IS DISTINCT FROM ${body_n}::jsonb) AS modified"
    );
    q
}

pub fn delete(table: &str, id: &ObjectId) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::Text(id.to_hex()));
    q.sql = format!("DELETE FROM {} WHERE id = ${}", table, n);
    q
}
