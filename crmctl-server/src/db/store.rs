//! PostgreSQL implementation of the CRM store
//!
//! A unit of work wraps one transaction. Dropping it without commit rolls
//! the transaction back (sqlx does this on drop).

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, Transaction};

use crmctl_core::models::{Customer, NewCustomer, NewOrder, NewProduct, Order, Page, Product};
use crmctl_core::query::{
    CustomerFilter, CustomerQuery, Direction, OrderFilter, OrderQuery, ProductFilter, ProductQuery,
    SortField, SortKey,
};
use crmctl_core::{Store, StoreError, UnitOfWork};

/// Store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let tx = self.pool.begin().await.map_err(db_error)?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

/// Map sqlx errors, recognising the email unique constraint.
fn db_error(err: sqlx::Error) -> StoreError {
    if let Some(db) = err.as_database_error() {
        if db.is_unique_violation() && db.constraint() == Some("customers_email_key") {
            return StoreError::UniqueViolation { field: "email" };
        }
    }
    StoreError::backend(err)
}

fn customer_from_row(row: &PgRow) -> Result<Customer, sqlx::Error> {
    Ok(Customer {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
    })
}

fn product_from_row(row: &PgRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        price: row.try_get("price")?,
        stock: row.try_get("stock")?,
    })
}

fn order_from_row(row: &PgRow) -> Result<Order, sqlx::Error> {
    Ok(Order {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        product_ids: row.try_get("product_ids")?,
        order_date: row.try_get("order_date")?,
        total_amount: row.try_get("total_amount")?,
    })
}

/// Append ORDER BY for the sort keys plus the id tiebreak.
///
/// Columns come from the `SortField` whitelist, never from user text.
fn push_order_by<F: SortField>(qb: &mut QueryBuilder<'_, Postgres>, keys: &[SortKey<F>], id_column: &str) {
    qb.push(" ORDER BY ");
    for key in keys {
        qb.push(key.field.column());
        qb.push(match key.direction {
            Direction::Asc => " ASC NULLS FIRST, ",
            Direction::Desc => " DESC NULLS LAST, ",
        });
    }
    qb.push(id_column);
    qb.push(" ASC");
}

fn push_window(qb: &mut QueryBuilder<'_, Postgres>, page: crmctl_core::Pagination) {
    qb.push(" LIMIT ");
    qb.push_bind(i64::from(page.limit));
    qb.push(" OFFSET ");
    qb.push_bind(sql_offset(page.offset));
}

/// `OFFSET` is a signed BIGINT; anything past it selects nothing anyway.
fn sql_offset(offset: u64) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}

fn push_icontains(qb: &mut QueryBuilder<'_, Postgres>, column: &str, needle: &str) {
    qb.push(" AND POSITION(LOWER(");
    qb.push_bind(needle.to_string());
    qb.push(") IN LOWER(");
    qb.push(column);
    qb.push(")) > 0");
}

fn push_customer_where(qb: &mut QueryBuilder<'_, Postgres>, filter: &CustomerFilter) {
    qb.push(" WHERE TRUE");
    if let Some(name) = &filter.name_contains {
        push_icontains(qb, "c.name", name);
    }
    if let Some(email) = &filter.email_contains {
        push_icontains(qb, "c.email", email);
    }
    if let Some(prefix) = &filter.phone_prefix {
        qb.push(" AND starts_with(c.phone, ");
        qb.push_bind(prefix.clone());
        qb.push(")");
    }
}

fn push_product_where(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    qb.push(" WHERE TRUE");
    if let Some(name) = &filter.name_contains {
        push_icontains(qb, "p.name", name);
    }
    if let Some(min) = filter.price_gte {
        qb.push(" AND p.price >= ").push_bind(min);
    }
    if let Some(max) = filter.price_lte {
        qb.push(" AND p.price <= ").push_bind(max);
    }
    if let Some(min) = filter.stock_gte {
        qb.push(" AND p.stock >= ").push_bind(min);
    }
    if let Some(max) = filter.stock_lte {
        qb.push(" AND p.stock <= ").push_bind(max);
    }
    if let Some(low) = filter.low_stock {
        qb.push(if low { " AND p.stock < " } else { " AND p.stock >= " });
        qb.push_bind(crmctl_core::models::LOW_STOCK_THRESHOLD);
    }
}

fn push_order_where(qb: &mut QueryBuilder<'_, Postgres>, filter: &OrderFilter) {
    qb.push(" WHERE TRUE");
    if let Some(name) = &filter.customer_name {
        push_icontains(qb, "c.name", name);
    }
    if let Some(name) = &filter.product_name {
        qb.push(
            " AND EXISTS (SELECT 1 FROM order_products op JOIN products p ON p.id = op.product_id \
             WHERE op.order_id = o.id AND POSITION(LOWER(",
        );
        qb.push_bind(name.clone());
        qb.push(") IN LOWER(p.name)) > 0)");
    }
    if let Some(product_id) = filter.product_id {
        qb.push(" AND EXISTS (SELECT 1 FROM order_products op WHERE op.order_id = o.id AND op.product_id = ");
        qb.push_bind(product_id);
        qb.push(")");
    }
    if let Some(min) = filter.total_amount_gte {
        qb.push(" AND o.total_amount >= ").push_bind(min);
    }
    if let Some(max) = filter.total_amount_lte {
        qb.push(" AND o.total_amount <= ").push_bind(max);
    }
    if let Some(from) = filter.order_date_gte {
        qb.push(" AND o.order_date >= ").push_bind(from);
    }
    if let Some(to) = filter.order_date_lte {
        qb.push(" AND o.order_date <= ").push_bind(to);
    }
}

const ORDER_COLUMNS: &str = "o.id, o.customer_id, o.order_date, o.total_amount, \
     ARRAY(SELECT op.product_id FROM order_products op WHERE op.order_id = o.id ORDER BY op.product_id) AS product_ids";

impl PgUnitOfWork {
    async fn count(&mut self, mut qb: QueryBuilder<'_, Postgres>) -> Result<i64, StoreError> {
        qb.build_query_scalar::<i64>()
            .fetch_one(&mut *self.tx)
            .await
            .map_err(db_error)
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn email_exists(&mut self, email: &str) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM customers WHERE email = $1)")
            .bind(email)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(db_error)
    }

    async fn insert_customer(&mut self, customer: NewCustomer) -> Result<Customer, StoreError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO customers (name, email, phone) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error)?;
        Ok(customer.into_customer(id))
    }

    async fn get_customer(&mut self, id: i64) -> Result<Option<Customer>, StoreError> {
        let row = sqlx::query("SELECT id, name, email, phone FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_error)?;
        row.as_ref()
            .map(customer_from_row)
            .transpose()
            .map_err(db_error)
    }

    async fn list_customers(&mut self, query: &CustomerQuery) -> Result<Page<Customer>, StoreError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM customers c");
        push_customer_where(&mut count, &query.filter);
        let total = self.count(count).await?;

        let mut qb = QueryBuilder::new("SELECT c.id, c.name, c.email, c.phone FROM customers c");
        push_customer_where(&mut qb, &query.filter);
        push_order_by(&mut qb, &query.sort, "c.id");
        push_window(&mut qb, query.page);

        let rows = qb.build().fetch_all(&mut *self.tx).await.map_err(db_error)?;
        let items = rows
            .iter()
            .map(customer_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;
        Ok(Page {
            items,
            total,
            offset: query.page.offset,
        })
    }

    async fn insert_product(&mut self, product: NewProduct) -> Result<Product, StoreError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO products (name, price, stock) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(product.stock)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error)?;
        Ok(product.into_product(id))
    }

    async fn products_by_ids(&mut self, ids: &[i64]) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, name, price, stock FROM products WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids.to_vec())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error)?;
        rows.iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)
    }

    async fn list_products(&mut self, query: &ProductQuery) -> Result<Page<Product>, StoreError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM products p");
        push_product_where(&mut count, &query.filter);
        let total = self.count(count).await?;

        let mut qb = QueryBuilder::new("SELECT p.id, p.name, p.price, p.stock FROM products p");
        push_product_where(&mut qb, &query.filter);
        push_order_by(&mut qb, &query.sort, "p.id");
        push_window(&mut qb, query.page);

        let rows = qb.build().fetch_all(&mut *self.tx).await.map_err(db_error)?;
        let items = rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;
        Ok(Page {
            items,
            total,
            offset: query.page.offset,
        })
    }

    async fn restock_below(&mut self, threshold: i32, amount: i32) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            "UPDATE products SET stock = stock + $2 WHERE stock < $1 RETURNING id, name, price, stock",
        )
        .bind(threshold)
        .bind(amount)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error)?;
        let mut updated = rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;
        updated.sort_by_key(|p| p.id);
        Ok(updated)
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<Order, StoreError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO orders (customer_id, order_date, total_amount) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(order.customer_id)
        .bind(order.order_date)
        .bind(order.total_amount)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error)?;

        sqlx::query(
            "INSERT INTO order_products (order_id, product_id) SELECT $1, UNNEST($2::BIGINT[])",
        )
        .bind(id)
        .bind(&order.product_ids)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;

        Ok(order.into_order(id))
    }

    async fn list_orders(&mut self, query: &OrderQuery) -> Result<Page<Order>, StoreError> {
        let mut count =
            QueryBuilder::new("SELECT COUNT(*) FROM orders o JOIN customers c ON c.id = o.customer_id");
        push_order_where(&mut count, &query.filter);
        let total = self.count(count).await?;

        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(ORDER_COLUMNS);
        qb.push(" FROM orders o JOIN customers c ON c.id = o.customer_id");
        push_order_where(&mut qb, &query.filter);
        push_order_by(&mut qb, &query.sort, "o.id");
        push_window(&mut qb, query.page);

        let rows = qb.build().fetch_all(&mut *self.tx).await.map_err(db_error)?;
        let items = rows
            .iter()
            .map(order_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;
        Ok(Page {
            items,
            total,
            offset: query.page.offset,
        })
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(db_error)
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(db_error)
    }
}
