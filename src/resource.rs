//! The resource families served by the API.

/// One REST resource backed by a single collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resource {
    /// Collection (and table) name; also the path segment.
    pub collection: &'static str,
    /// Whether `GET /<collection>` is exposed.
    pub listable: bool,
}

pub const PRODUCTS: Resource = Resource {
    collection: "products",
    listable: true,
};

pub const USERS: Resource = Resource {
    collection: "users",
    listable: false,
};

pub const ALL: &[Resource] = &[PRODUCTS, USERS];

/// Collection names, for schema setup.
pub fn collections() -> Vec<&'static str> {
    ALL.iter().map(|r| r.collection).collect()
}
