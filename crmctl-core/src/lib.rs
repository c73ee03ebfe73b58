//! crmctl-core: domain model and storage abstraction for the CRM backend
//!
//! - [`models`]: customers, products, orders and their validation rules
//! - [`query`]: filter predicates, sort keys and pagination as plain data
//! - [`store`]: the `Store` / `UnitOfWork` repository traits plus an in-memory store
//! - [`service`]: mutation handlers run inside explicit units of work

pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod service;
pub mod store;

pub use config::CrmConfig;
pub use error::{CrmError, QueryError, Result, StoreError};
pub use models::{
    Customer, CustomerInput, Order, OrderInput, Page, Pagination, Product, ProductInput,
    ValidationError,
};
pub use query::{
    CustomerField, CustomerFilter, CustomerQuery, Direction, ListQuery, OrderField, OrderFilter,
    OrderQuery, ProductField, ProductFilter, ProductQuery, SortField, SortKey,
};
pub use service::{BulkCreateReport, BulkItemError, CrmService};
pub use store::{MemoryStore, Store, UnitOfWork};
