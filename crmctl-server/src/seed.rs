//! Demo data
//!
//! Seeding goes through the regular service operations so every record
//! passes the same validation as API input. A store that already holds
//! the first demo customer is left untouched.

use rust_decimal::Decimal;

use crmctl_core::{
    CrmService, CustomerFilter, CustomerInput, ListQuery, OrderInput, ProductInput,
};

use crate::error::ServerResult;

const ALICE_EMAIL: &str = "alice@example.com";

/// What a seed run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub customers: usize,
    pub products: usize,
    pub orders: usize,
    /// True when demo data was already present
    pub skipped: bool,
}

pub async fn seed(service: &CrmService) -> ServerResult<SeedReport> {
    let existing = service
        .list_customers(&ListQuery::new(CustomerFilter {
            email_contains: Some(ALICE_EMAIL.to_string()),
            ..Default::default()
        }))
        .await?;
    if existing.items.iter().any(|c| c.email == ALICE_EMAIL) {
        tracing::info!("demo data already present, skipping seed");
        return Ok(SeedReport {
            skipped: true,
            ..Default::default()
        });
    }

    let alice = service
        .create_customer(CustomerInput::new("Alice", ALICE_EMAIL, Some("+1234567890")))
        .await?;

    let bulk = service
        .bulk_create_customers(vec![
            CustomerInput::new("Bob", "bob@example.com", Some("123-456-7890")),
            CustomerInput::new("Carol", "carol@example.com", None),
        ])
        .await?;
    for rejected in &bulk.errors {
        tracing::warn!(email = %rejected.email, errors = ?rejected.errors, "seed customer rejected");
    }

    let laptop = service
        .create_product(ProductInput::new("Laptop", Decimal::new(99999, 2), Some(10)))
        .await?;

    let order = service
        .create_order(OrderInput::new(alice.id, &[laptop.id]))
        .await?;

    tracing::info!(order_id = order.id, "seeded demo data");
    Ok(SeedReport {
        customers: 1 + bulk.created.len(),
        products: 1,
        orders: 1,
        skipped: false,
    })
}
