//! In-memory store
//!
//! Units of work are serialized through one async mutex. Each works on a
//! private copy of the tables that replaces the shared copy on commit.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{Store, UnitOfWork};
use crate::error::StoreError;
use crate::models::{Customer, NewCustomer, NewOrder, NewProduct, Order, Page, Product};
use crate::query::{sort_entities, CustomerQuery, OrderQuery, ProductQuery};

#[derive(Debug, Clone, Default)]
struct Tables {
    customers: BTreeMap<i64, Customer>,
    products: BTreeMap<i64, Product>,
    orders: BTreeMap<i64, Order>,
    customer_seq: i64,
    product_seq: i64,
    order_seq: i64,
}

/// Store backed by process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryUnitOfWork { guard, working }))
    }
}

struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn email_exists(&mut self, email: &str) -> Result<bool, StoreError> {
        Ok(self.working.customers.values().any(|c| c.email == email))
    }

    async fn insert_customer(&mut self, customer: NewCustomer) -> Result<Customer, StoreError> {
        if self.email_exists(&customer.email).await? {
            return Err(StoreError::UniqueViolation { field: "email" });
        }
        self.working.customer_seq += 1;
        let customer = customer.into_customer(self.working.customer_seq);
        self.working.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn get_customer(&mut self, id: i64) -> Result<Option<Customer>, StoreError> {
        Ok(self.working.customers.get(&id).cloned())
    }

    async fn list_customers(&mut self, query: &CustomerQuery) -> Result<Page<Customer>, StoreError> {
        let mut rows: Vec<Customer> = self
            .working
            .customers
            .values()
            .filter(|c| query.filter.matches(c))
            .cloned()
            .collect();
        sort_entities(&mut rows, &query.sort);
        Ok(Page::slice(rows, query.page))
    }

    async fn insert_product(&mut self, product: NewProduct) -> Result<Product, StoreError> {
        self.working.product_seq += 1;
        let product = product.into_product(self.working.product_seq);
        self.working.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn products_by_ids(&mut self, ids: &[i64]) -> Result<Vec<Product>, StoreError> {
        let wanted: BTreeSet<i64> = ids.iter().copied().collect();
        Ok(wanted
            .iter()
            .filter_map(|id| self.working.products.get(id).cloned())
            .collect())
    }

    async fn list_products(&mut self, query: &ProductQuery) -> Result<Page<Product>, StoreError> {
        let mut rows: Vec<Product> = self
            .working
            .products
            .values()
            .filter(|p| query.filter.matches(p))
            .cloned()
            .collect();
        sort_entities(&mut rows, &query.sort);
        Ok(Page::slice(rows, query.page))
    }

    async fn restock_below(&mut self, threshold: i32, amount: i32) -> Result<Vec<Product>, StoreError> {
        let mut updated = Vec::new();
        for product in self.working.products.values_mut() {
            if product.stock < threshold {
                product.stock += amount;
                updated.push(product.clone());
            }
        }
        Ok(updated)
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<Order, StoreError> {
        if !self.working.customers.contains_key(&order.customer_id) {
            return Err(StoreError::NotFound {
                resource: "customer",
                id: order.customer_id.to_string(),
            });
        }
        if let Some(missing) = order
            .product_ids
            .iter()
            .find(|id| !self.working.products.contains_key(id))
        {
            return Err(StoreError::NotFound {
                resource: "product",
                id: missing.to_string(),
            });
        }
        self.working.order_seq += 1;
        let order = order.into_order(self.working.order_seq);
        self.working.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn list_orders(&mut self, query: &OrderQuery) -> Result<Page<Order>, StoreError> {
        let tables = &self.working;
        let mut rows: Vec<Order> = tables
            .orders
            .values()
            .filter(|order| {
                let customer = tables.customers.get(&order.customer_id);
                let products: Vec<&Product> = order
                    .product_ids
                    .iter()
                    .filter_map(|id| tables.products.get(id))
                    .collect();
                query.filter.matches(order, customer, &products)
            })
            .cloned()
            .collect();
        sort_entities(&mut rows, &query.sort);
        Ok(Page::slice(rows, query.page))
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn new_customer(email: &str) -> NewCustomer {
        NewCustomer {
            name: "Test".into(),
            email: email.into(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn commit_publishes_writes() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        uow.insert_customer(new_customer("a@example.com")).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        assert!(uow.email_exists("a@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn rollback_and_drop_discard_writes() {
        let store = MemoryStore::new();

        let mut uow = store.begin().await.unwrap();
        uow.insert_customer(new_customer("a@example.com")).await.unwrap();
        uow.rollback().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        uow.insert_customer(new_customer("b@example.com")).await.unwrap();
        drop(uow);

        let mut uow = store.begin().await.unwrap();
        assert!(!uow.email_exists("a@example.com").await.unwrap());
        assert!(!uow.email_exists("b@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_is_unique_violation() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        uow.insert_customer(new_customer("a@example.com")).await.unwrap();
        let err = uow
            .insert_customer(new_customer("a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { field: "email" }));
    }

    #[tokio::test]
    async fn restock_only_touches_low_stock() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        for (name, stock) in [("Low", 3), ("Edge", 10)] {
            uow.insert_product(NewProduct {
                name: name.into(),
                price: Decimal::ONE,
                stock,
            })
            .await
            .unwrap();
        }
        let updated = uow.restock_below(10, 10).await.unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].name, "Low");
        assert_eq!(updated[0].stock, 13);
    }

    #[tokio::test]
    async fn products_by_ids_skips_unknown() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let p = uow
            .insert_product(NewProduct {
                name: "Pen".into(),
                price: Decimal::ONE,
                stock: 1,
            })
            .await
            .unwrap();
        let found = uow.products_by_ids(&[p.id, 99, p.id]).await.unwrap();
        assert_eq!(found, vec![p]);
    }
}
