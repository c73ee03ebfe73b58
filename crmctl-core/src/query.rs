//! Query building: filter predicates, sort keys and pagination as data.
//!
//! Stores receive a [`ListQuery`] and either evaluate it in memory
//! ([`CustomerFilter::matches`], [`sort_entities`]) or translate it to SQL
//! ([`SortField::column`]).

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::QueryError;
use crate::models::{Customer, Identified, Order, Pagination, Product, LOW_STOCK_THRESHOLD};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// A field an entity list can be ordered by
pub trait SortField: Copy + Sized + 'static {
    type Entity: Identified;

    /// Entity name used in error messages
    const ENTITY: &'static str;

    /// Resolve a field name (snake_case or camelCase)
    fn from_name(name: &str) -> Option<Self>;

    /// SQL sort expression (qualified where the list query joins).
    ///
    /// Text columns use the byte-order `"C"` collation so PostgreSQL sorts
    /// the same way as [`SortField::compare`].
    fn column(self) -> &'static str;

    /// Compare two entities on this field, ascending
    fn compare(self, a: &Self::Entity, b: &Self::Entity) -> Ordering;
}

/// One ordering term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey<F> {
    pub field: F,
    pub direction: Direction,
}

impl<F: SortField> SortKey<F> {
    /// Parse `name` (ascending) or `-name` (descending). A leading `+` is
    /// accepted as an explicit ascending marker.
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let raw = raw.trim();
        let (direction, name) = match raw.strip_prefix('-') {
            Some(rest) => (Direction::Desc, rest),
            None => (Direction::Asc, raw.strip_prefix('+').unwrap_or(raw)),
        };
        if name.is_empty() {
            return Err(QueryError::EmptySortField { entity: F::ENTITY });
        }
        let field = F::from_name(name).ok_or_else(|| QueryError::UnknownSortField {
            entity: F::ENTITY,
            field: name.to_string(),
        })?;
        Ok(Self { field, direction })
    }
}

/// Parse a list of sort terms, failing on the first unknown field.
pub fn parse_sort<F: SortField>(raw: &[String]) -> Result<Vec<SortKey<F>>, QueryError> {
    raw.iter().map(|term| SortKey::parse(term)).collect()
}

/// Sort in memory by the given keys, ties broken by ascending id.
pub fn sort_entities<F: SortField>(items: &mut [F::Entity], keys: &[SortKey<F>]) {
    items.sort_by(|a, b| {
        keys.iter()
            .map(|key| match key.direction {
                Direction::Asc => key.field.compare(a, b),
                Direction::Desc => key.field.compare(a, b).reverse(),
            })
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| a.id().cmp(&b.id()))
    });
}

/// Case-insensitive substring test shared by every store.
pub fn icontains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn opt_matches<T>(bound: &Option<T>, test: impl FnOnce(&T) -> bool) -> bool {
    bound.as_ref().map_or(true, test)
}

/// A list request: predicate, ordering and window
#[derive(Debug, Clone)]
pub struct ListQuery<P, F> {
    pub filter: P,
    pub sort: Vec<SortKey<F>>,
    pub page: Pagination,
}

impl<P: Default, F> Default for ListQuery<P, F> {
    fn default() -> Self {
        Self {
            filter: P::default(),
            sort: Vec::new(),
            page: Pagination::default(),
        }
    }
}

impl<P, F: SortField> ListQuery<P, F> {
    pub fn new(filter: P) -> Self {
        Self {
            filter,
            sort: Vec::new(),
            page: Pagination::default(),
        }
    }

    /// Replace ordering with parsed `orderBy` terms.
    pub fn order_by(mut self, raw: &[String]) -> Result<Self, QueryError> {
        self.sort = parse_sort(raw)?;
        Ok(self)
    }

    pub fn page(mut self, page: Pagination) -> Self {
        self.page = page;
        self
    }
}

pub type CustomerQuery = ListQuery<CustomerFilter, CustomerField>;
pub type ProductQuery = ListQuery<ProductFilter, ProductField>;
pub type OrderQuery = ListQuery<OrderFilter, OrderField>;

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

/// Customer list predicate
#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    pub name_contains: Option<String>,
    pub email_contains: Option<String>,
    pub phone_prefix: Option<String>,
}

impl CustomerFilter {
    pub fn matches(&self, customer: &Customer) -> bool {
        opt_matches(&self.name_contains, |n| icontains(&customer.name, n))
            && opt_matches(&self.email_contains, |e| icontains(&customer.email, e))
            && opt_matches(&self.phone_prefix, |p| {
                customer
                    .phone
                    .as_deref()
                    .is_some_and(|phone| phone.starts_with(p.as_str()))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerField {
    Id,
    Name,
    Email,
    Phone,
}

impl SortField for CustomerField {
    type Entity = Customer;
    const ENTITY: &'static str = "customer";

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "phone" => Some(Self::Phone),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Id => "c.id",
            Self::Name => r#"c.name COLLATE "C""#,
            Self::Email => r#"c.email COLLATE "C""#,
            Self::Phone => r#"c.phone COLLATE "C""#,
        }
    }

    fn compare(self, a: &Customer, b: &Customer) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Name => a.name.cmp(&b.name),
            Self::Email => a.email.cmp(&b.email),
            Self::Phone => a.phone.cmp(&b.phone),
        }
    }
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// Product list predicate
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub name_contains: Option<String>,
    pub price_gte: Option<Decimal>,
    pub price_lte: Option<Decimal>,
    pub stock_gte: Option<i32>,
    pub stock_lte: Option<i32>,
    /// `Some(true)`: only stock below the threshold; `Some(false)`: only at or above
    pub low_stock: Option<bool>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        opt_matches(&self.name_contains, |n| icontains(&product.name, n))
            && opt_matches(&self.price_gte, |min| product.price >= *min)
            && opt_matches(&self.price_lte, |max| product.price <= *max)
            && opt_matches(&self.stock_gte, |min| product.stock >= *min)
            && opt_matches(&self.stock_lte, |max| product.stock <= *max)
            && opt_matches(&self.low_stock, |low| {
                (product.stock < LOW_STOCK_THRESHOLD) == *low
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Id,
    Name,
    Price,
    Stock,
}

impl SortField for ProductField {
    type Entity = Product;
    const ENTITY: &'static str = "product";

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "price" => Some(Self::Price),
            "stock" => Some(Self::Stock),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Id => "p.id",
            Self::Name => r#"p.name COLLATE "C""#,
            Self::Price => "p.price",
            Self::Stock => "p.stock",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Name => a.name.cmp(&b.name),
            Self::Price => a.price.cmp(&b.price),
            Self::Stock => a.stock.cmp(&b.stock),
        }
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Order list predicate
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Substring of the ordering customer's name
    pub customer_name: Option<String>,
    /// Substring of any ordered product's name
    pub product_name: Option<String>,
    pub product_id: Option<i64>,
    pub total_amount_gte: Option<Decimal>,
    pub total_amount_lte: Option<Decimal>,
    pub order_date_gte: Option<DateTime<Utc>>,
    pub order_date_lte: Option<DateTime<Utc>>,
}

impl OrderFilter {
    /// Evaluate against an order and its already resolved relations.
    pub fn matches(&self, order: &Order, customer: Option<&Customer>, products: &[&Product]) -> bool {
        opt_matches(&self.customer_name, |n| {
            customer.is_some_and(|c| icontains(&c.name, n))
        }) && opt_matches(&self.product_name, |n| {
            products.iter().any(|p| icontains(&p.name, n))
        }) && opt_matches(&self.product_id, |id| order.product_ids.contains(id))
            && opt_matches(&self.total_amount_gte, |min| order.total_amount >= *min)
            && opt_matches(&self.total_amount_lte, |max| order.total_amount <= *max)
            && opt_matches(&self.order_date_gte, |from| order.order_date >= *from)
            && opt_matches(&self.order_date_lte, |to| order.order_date <= *to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Id,
    OrderDate,
    TotalAmount,
    Customer,
}

impl SortField for OrderField {
    type Entity = Order;
    const ENTITY: &'static str = "order";

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "order_date" | "orderDate" => Some(Self::OrderDate),
            "total_amount" | "totalAmount" => Some(Self::TotalAmount),
            "customer" | "customer_id" | "customerId" => Some(Self::Customer),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Id => "o.id",
            Self::OrderDate => "o.order_date",
            Self::TotalAmount => "o.total_amount",
            Self::Customer => "o.customer_id",
        }
    }

    fn compare(self, a: &Order, b: &Order) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::OrderDate => a.order_date.cmp(&b.order_date),
            Self::TotalAmount => a.total_amount.cmp(&b.total_amount),
            Self::Customer => a.customer_id.cmp(&b.customer_id),
        }
    }
}
