//! Product entity

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::validation::{validate_name, validate_price, validate_stock, ValidationError};
use super::Identified;

/// Stock below this count is "low"
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// Units added to each low-stock product by a replenishment run
pub const RESTOCK_AMOUNT: i32 = 10;

/// Product record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.stock < LOW_STOCK_THRESHOLD
    }
}

impl Identified for Product {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Product creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub price: Decimal,
    /// Defaults to 0
    pub stock: Option<i32>,
}

impl ProductInput {
    pub fn new(name: impl Into<String>, price: Decimal, stock: Option<i32>) -> Self {
        Self {
            name: name.into(),
            price,
            stock,
        }
    }

    pub fn validate(&self) -> Result<NewProduct, ValidationError> {
        let name = validate_name("name", &self.name)?;
        let price = validate_price(self.price)?;
        let stock = validate_stock(self.stock.unwrap_or(0))?;
        Ok(NewProduct { name, price, stock })
    }
}

/// Validated product, ready to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
}

impl NewProduct {
    pub fn into_product(self, id: i64) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            stock: self.stock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_defaults_to_zero() {
        let input = ProductInput::new("Mouse", Decimal::new(1999, 2), None);
        assert_eq!(input.validate().unwrap().stock, 0);
    }

    #[test]
    fn price_checked_before_stock() {
        let input = ProductInput::new("Mouse", Decimal::ZERO, Some(-1));
        assert_eq!(input.validate(), Err(ValidationError::NonPositivePrice));
    }

    #[test]
    fn low_stock_boundary() {
        let mut p = NewProduct {
            name: "Cable".into(),
            price: Decimal::ONE,
            stock: 9,
        }
        .into_product(1);
        assert!(p.is_low_stock());
        p.stock = LOW_STOCK_THRESHOLD;
        assert!(!p.is_low_stock());
    }
}
