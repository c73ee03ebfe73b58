//! Domain models: entities, inputs, validation and pagination

pub mod customer;
pub mod order;
pub mod pagination;
pub mod product;
pub mod validation;

pub use customer::{Customer, CustomerInput, NewCustomer};
pub use order::{NewOrder, Order, OrderInput};
pub use pagination::{Page, Pagination, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use product::{NewProduct, Product, ProductInput, LOW_STOCK_THRESHOLD, RESTOCK_AMOUNT};
pub use validation::ValidationError;

/// Entities with a store-assigned integer id
pub trait Identified {
    fn id(&self) -> i64;
}

/// Parse an external id string (GraphQL `ID`) into a store id.
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ids() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id(" 7 "), Some(7));
        assert_eq!(parse_id("0"), None);
        assert_eq!(parse_id("-3"), None);
        assert_eq!(parse_id("abc"), None);
    }
}
