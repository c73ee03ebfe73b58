//! Database layer - connection pool, schema and the PostgreSQL store
//!
//! - Connection pool with an explicit size limit
//! - Every unit of work is one `sqlx::Transaction`
//! - List queries are built from filter/sort data with `QueryBuilder`
//! - Email uniqueness is enforced by a constraint as well as the pre-insert check

pub mod migrations;
pub mod pool;
pub mod store;

pub use pool::{create_pool, create_pool_with_options};
pub use store::PgStore;
