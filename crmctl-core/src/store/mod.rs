//! Repository abstraction
//!
//! A [`Store`] hands out [`UnitOfWork`]s. Every read and write goes through
//! a unit of work, which is either committed or rolled back as a whole;
//! dropping one without committing discards its writes.

pub mod memory;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{Customer, NewCustomer, NewOrder, NewProduct, Order, Page, Product};
use crate::query::{CustomerQuery, OrderQuery, ProductQuery};

pub use memory::MemoryStore;

/// Source of units of work
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a new transaction boundary.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError>;
}

/// One transaction over the CRM tables
#[async_trait]
pub trait UnitOfWork: Send {
    async fn email_exists(&mut self, email: &str) -> Result<bool, StoreError>;

    async fn insert_customer(&mut self, customer: NewCustomer) -> Result<Customer, StoreError>;

    async fn get_customer(&mut self, id: i64) -> Result<Option<Customer>, StoreError>;

    async fn list_customers(&mut self, query: &CustomerQuery) -> Result<Page<Customer>, StoreError>;

    async fn insert_product(&mut self, product: NewProduct) -> Result<Product, StoreError>;

    /// Products whose id is in `ids`, ascending by id. Unknown ids are skipped.
    async fn products_by_ids(&mut self, ids: &[i64]) -> Result<Vec<Product>, StoreError>;

    async fn list_products(&mut self, query: &ProductQuery) -> Result<Page<Product>, StoreError>;

    /// Add `amount` to the stock of every product below `threshold`,
    /// returning the updated rows ascending by id.
    async fn restock_below(&mut self, threshold: i32, amount: i32) -> Result<Vec<Product>, StoreError>;

    async fn insert_order(&mut self, order: NewOrder) -> Result<Order, StoreError>;

    async fn list_orders(&mut self, query: &OrderQuery) -> Result<Page<Order>, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
