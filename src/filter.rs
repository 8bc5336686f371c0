//! List query parameters and the document filter they build.
//!
//! Unparsable numeric parameters are treated as absent rather than rejected.

use serde_json::Value;

use crate::store::Document;

/// Field compared against `max-price`.
pub const PRICE_FIELD: &str = "price";
/// Field searched by `includes`.
pub const NAME_FIELD: &str = "name";

/// Raw query string of a list request. A key may repeat; every value is kept.
#[derive(Debug, Default, Clone)]
pub struct ListParams {
    pub max_price: Vec<String>,
    pub includes: Vec<String>,
    pub limit: Vec<String>,
}

impl ListParams {
    /// Collects the recognized keys from decoded query pairs; other keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = ListParams::default();
        for (key, value) in pairs {
            match key.as_str() {
                "max-price" => params.max_price.push(value),
                "includes" => params.includes.push(value),
                "limit" => params.limit.push(value),
                _ => {}
            }
        }
        params
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DocumentFilter {
    /// Keep documents whose numeric `price` is <= this bound.
    pub max_price: Option<f64>,
    /// Keep documents whose string `name` contains this text, ignoring case.
    pub name_contains: Option<String>,
    /// Cap on the number of documents returned. Never zero.
    pub limit: Option<u64>,
}

/// For a repeated key the first usable value wins.
impl From<&ListParams> for DocumentFilter {
    fn from(params: &ListParams) -> Self {
        DocumentFilter {
            max_price: params.max_price.iter().find_map(|v| parse_price(v)),
            name_contains: params.includes.iter().find(|s| !s.is_empty()).cloned(),
            limit: params.limit.iter().find_map(|v| parse_limit(v)),
        }
    }
}

fn parse_price(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_limit(raw: &str) -> Option<u64> {
    raw.trim().parse::<i64>().ok().and_then(|n| u64::try_from(n).ok()).filter(|n| *n > 0)
}

impl DocumentFilter {
    /// Whether a document passes the predicate. `limit` is not part of it.
    pub fn matches(&self, doc: &Document) -> bool {
        if let Some(bound) = self.max_price {
            match doc.get(PRICE_FIELD).and_then(Value::as_f64) {
                Some(price) if price <= bound => {}
                _ => return false,
            }
        }
        if let Some(needle) = &self.name_contains {
            match doc.get(NAME_FIELD).and_then(Value::as_str) {
                Some(name) if contains_ignore_case(name, needle) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Literal, case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
