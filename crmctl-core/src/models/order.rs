//! Order entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Identified;

/// Order record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    /// Distinct product ids, ascending
    pub product_ids: Vec<i64>,
    pub order_date: DateTime<Utc>,
    pub total_amount: Decimal,
}

impl Identified for Order {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Order creation payload. Ids are raw strings as received; resolving them
/// against the store happens inside the unit of work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderInput {
    pub customer_id: String,
    pub product_ids: Vec<String>,
    pub order_date: Option<DateTime<Utc>>,
}

impl OrderInput {
    pub fn new(customer_id: i64, product_ids: &[i64]) -> Self {
        Self {
            customer_id: customer_id.to_string(),
            product_ids: product_ids.iter().map(i64::to_string).collect(),
            order_date: None,
        }
    }

    pub fn with_order_date(mut self, order_date: DateTime<Utc>) -> Self {
        self.order_date = Some(order_date);
        self
    }
}

/// Resolved order, ready to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: i64,
    pub product_ids: Vec<i64>,
    pub order_date: DateTime<Utc>,
    pub total_amount: Decimal,
}

impl NewOrder {
    pub fn into_order(self, id: i64) -> Order {
        Order {
            id,
            customer_id: self.customer_id,
            product_ids: self.product_ids,
            order_date: self.order_date,
            total_amount: self.total_amount,
        }
    }
}
