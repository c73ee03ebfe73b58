//! Mutation handlers and the service that owns their transaction boundaries.
//!
//! Handlers in [`handlers`] take the unit of work they run in; [`CrmService`]
//! opens one per operation, commits on success and rolls back on error.

use std::sync::Arc;

use serde::Serialize;

use crate::error::{CrmError, Result};
use crate::models::{Customer, CustomerInput, Order, OrderInput, Page, Product, ProductInput};
use crate::query::{CustomerQuery, OrderQuery, ProductQuery};
use crate::store::{Store, UnitOfWork};

pub mod handlers {
    //! Operations over an already open unit of work.

    use std::collections::BTreeSet;

    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::error::Result;
    use crate::models::validation::validate_total;
    use crate::models::{
        parse_id, Customer, CustomerInput, NewOrder, Order, OrderInput, Product, ProductInput,
        ValidationError, LOW_STOCK_THRESHOLD, RESTOCK_AMOUNT,
    };
    use crate::store::UnitOfWork;

    pub async fn create_customer(uow: &mut dyn UnitOfWork, input: &CustomerInput) -> Result<Customer> {
        let customer = input.validate()?;
        if uow.email_exists(&customer.email).await? {
            return Err(ValidationError::DuplicateEmail.into());
        }
        Ok(uow.insert_customer(customer).await?)
    }

    pub async fn create_product(uow: &mut dyn UnitOfWork, input: &ProductInput) -> Result<Product> {
        let product = input.validate()?;
        Ok(uow.insert_product(product).await?)
    }

    /// Resolve customer and products, total the prices and insert.
    ///
    /// Duplicate product ids collapse to one reference. Missing ids are
    /// reported in request order.
    pub async fn create_order(uow: &mut dyn UnitOfWork, input: &OrderInput) -> Result<Order> {
        if input.product_ids.is_empty() {
            return Err(ValidationError::NoProducts.into());
        }

        let customer_id = parse_id(&input.customer_id).ok_or(ValidationError::UnknownCustomer)?;
        if uow.get_customer(customer_id).await?.is_none() {
            return Err(ValidationError::UnknownCustomer.into());
        }

        let wanted: BTreeSet<i64> = input.product_ids.iter().filter_map(|raw| parse_id(raw)).collect();
        let wanted: Vec<i64> = wanted.into_iter().collect();
        let products = uow.products_by_ids(&wanted).await?;
        let found: BTreeSet<i64> = products.iter().map(|p| p.id).collect();

        let mut missing: Vec<String> = Vec::new();
        for raw in &input.product_ids {
            let known = parse_id(raw).is_some_and(|id| found.contains(&id));
            let raw = raw.trim().to_string();
            if !known && !missing.contains(&raw) {
                missing.push(raw);
            }
        }
        if !missing.is_empty() {
            return Err(ValidationError::UnknownProducts { ids: missing }.into());
        }

        let total_amount = validate_total(products.iter().map(|p| p.price).sum::<Decimal>())?;

        let order = NewOrder {
            customer_id,
            product_ids: products.iter().map(|p| p.id).collect(),
            order_date: input.order_date.unwrap_or_else(Utc::now),
            total_amount,
        };
        Ok(uow.insert_order(order).await?)
    }

    pub async fn update_low_stock_products(uow: &mut dyn UnitOfWork) -> Result<Vec<Product>> {
        Ok(uow.restock_below(LOW_STOCK_THRESHOLD, RESTOCK_AMOUNT).await?)
    }
}

/// Per-item failure of a bulk create
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkItemError {
    pub email: String,
    pub errors: Vec<String>,
}

/// Outcome of a bulk create: what was committed and what was rejected
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkCreateReport {
    pub created: Vec<Customer>,
    pub errors: Vec<BulkItemError>,
}

/// CRM operations with explicit transaction boundaries
#[derive(Clone)]
pub struct CrmService {
    store: Arc<dyn Store>,
}

impl CrmService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create_customer(&self, input: CustomerInput) -> Result<Customer> {
        let mut uow = self.store.begin().await?;
        let result = handlers::create_customer(uow.as_mut(), &input).await;
        finish(uow, result).await
    }

    /// Create each customer in its own unit of work.
    ///
    /// Validation failures are collected per item and never undo earlier
    /// successes. A store failure stops the batch and is returned; items
    /// committed before it stay committed.
    pub async fn bulk_create_customers(&self, inputs: Vec<CustomerInput>) -> Result<BulkCreateReport> {
        let mut report = BulkCreateReport::default();
        for input in inputs {
            match self.create_customer(input.clone()).await {
                Ok(customer) => report.created.push(customer),
                Err(CrmError::Validation(err)) => {
                    tracing::debug!(email = %input.email, error = %err, "bulk item rejected");
                    report.errors.push(BulkItemError {
                        email: input.email,
                        errors: vec![err.to_string()],
                    });
                }
                Err(other) => return Err(other),
            }
        }
        tracing::info!(
            created = report.created.len(),
            rejected = report.errors.len(),
            "bulk customer create finished"
        );
        Ok(report)
    }

    pub async fn create_product(&self, input: ProductInput) -> Result<Product> {
        let mut uow = self.store.begin().await?;
        let result = handlers::create_product(uow.as_mut(), &input).await;
        finish(uow, result).await
    }

    pub async fn create_order(&self, input: OrderInput) -> Result<Order> {
        let mut uow = self.store.begin().await?;
        let result = handlers::create_order(uow.as_mut(), &input).await;
        let order = finish(uow, result).await?;
        tracing::info!(order_id = order.id, total = %order.total_amount, "order created");
        Ok(order)
    }

    pub async fn update_low_stock_products(&self) -> Result<Vec<Product>> {
        let mut uow = self.store.begin().await?;
        let result = handlers::update_low_stock_products(uow.as_mut()).await;
        let updated = finish(uow, result).await?;
        tracing::info!(updated = updated.len(), "low-stock products replenished");
        Ok(updated)
    }

    pub async fn list_customers(&self, query: &CustomerQuery) -> Result<Page<Customer>> {
        let mut uow = self.store.begin().await?;
        let result = uow.list_customers(query).await.map_err(CrmError::from);
        finish(uow, result).await
    }

    pub async fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>> {
        let mut uow = self.store.begin().await?;
        let result = uow.list_products(query).await.map_err(CrmError::from);
        finish(uow, result).await
    }

    pub async fn list_orders(&self, query: &OrderQuery) -> Result<Page<Order>> {
        let mut uow = self.store.begin().await?;
        let result = uow.list_orders(query).await.map_err(CrmError::from);
        finish(uow, result).await
    }

    pub async fn get_customer(&self, id: i64) -> Result<Option<Customer>> {
        let mut uow = self.store.begin().await?;
        let result = uow.get_customer(id).await.map_err(CrmError::from);
        finish(uow, result).await
    }

    pub async fn products_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>> {
        let mut uow = self.store.begin().await?;
        let result = uow.products_by_ids(ids).await.map_err(CrmError::from);
        finish(uow, result).await
    }
}

/// Commit on success, roll back on failure.
async fn finish<T>(uow: Box<dyn UnitOfWork>, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}
