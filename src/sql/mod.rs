//! SQL for the PostgreSQL document store. Table names come from settings; document values are always bound.

mod builder;
mod params;
pub use builder::*;
pub use params::PgBindValue;
