//! GraphQL object, input and payload types
//!
//! Node types wrap the core entities; ids are exposed as decimal `ID` strings.

use async_graphql::{Context, InputObject, Object, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crmctl_core::service::{BulkCreateReport, BulkItemError};
use crmctl_core::{Customer, CustomerInput, CrmService, Order, OrderInput, Product, ProductInput};

use super::error::graphql_error;

fn id(value: i64) -> ID {
    ID(value.to_string())
}

pub struct CustomerNode(pub Customer);

#[Object(name = "CustomerType")]
impl CustomerNode {
    async fn id(&self) -> ID {
        id(self.0.id)
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn email(&self) -> &str {
        &self.0.email
    }

    async fn phone(&self) -> Option<&str> {
        self.0.phone.as_deref()
    }
}

pub struct ProductNode(pub Product);

#[Object(name = "ProductType")]
impl ProductNode {
    async fn id(&self) -> ID {
        id(self.0.id)
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn price(&self) -> Decimal {
        self.0.price
    }

    async fn stock(&self) -> i32 {
        self.0.stock
    }
}

pub struct OrderNode(pub Order);

#[Object(name = "OrderType")]
impl OrderNode {
    async fn id(&self) -> ID {
        id(self.0.id)
    }

    async fn order_date(&self) -> DateTime<Utc> {
        self.0.order_date
    }

    async fn total_amount(&self) -> Decimal {
        self.0.total_amount
    }

    /// The ordering customer
    async fn customer(&self, ctx: &Context<'_>) -> Result<Option<CustomerNode>> {
        let service = ctx.data::<CrmService>()?;
        let customer = service
            .get_customer(self.0.customer_id)
            .await
            .map_err(graphql_error)?;
        Ok(customer.map(CustomerNode))
    }

    /// Ordered products, ascending by id
    async fn products(&self, ctx: &Context<'_>) -> Result<Vec<ProductNode>> {
        let service = ctx.data::<CrmService>()?;
        let products = service
            .products_by_ids(&self.0.product_ids)
            .await
            .map_err(graphql_error)?;
        Ok(products.into_iter().map(ProductNode).collect())
    }
}

/// Additional connection field carrying the filtered row count
#[derive(SimpleObject)]
pub struct TotalCount {
    pub total_count: i64,
}

#[derive(InputObject)]
#[graphql(name = "CustomerInput")]
pub struct CustomerInputObject {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<CustomerInputObject> for CustomerInput {
    fn from(input: CustomerInputObject) -> Self {
        CustomerInput {
            name: input.name,
            email: input.email,
            phone: input.phone,
        }
    }
}

#[derive(InputObject)]
#[graphql(name = "ProductInput")]
pub struct ProductInputObject {
    pub name: String,
    pub price: Decimal,
    pub stock: Option<i32>,
}

impl From<ProductInputObject> for ProductInput {
    fn from(input: ProductInputObject) -> Self {
        ProductInput {
            name: input.name,
            price: input.price,
            stock: input.stock,
        }
    }
}

#[derive(InputObject)]
#[graphql(name = "OrderInput")]
pub struct OrderInputObject {
    pub customer_id: ID,
    pub product_ids: Vec<ID>,
    pub order_date: Option<DateTime<Utc>>,
}

impl From<OrderInputObject> for OrderInput {
    fn from(input: OrderInputObject) -> Self {
        OrderInput {
            customer_id: input.customer_id.0,
            product_ids: input.product_ids.into_iter().map(|id| id.0).collect(),
            order_date: input.order_date,
        }
    }
}

#[derive(SimpleObject)]
pub struct CreateCustomerPayload {
    pub customer: CustomerNode,
    pub message: String,
}

#[derive(SimpleObject)]
#[graphql(name = "CustomerErrorType")]
pub struct CustomerError {
    pub email: String,
    pub errors: Vec<String>,
}

impl From<BulkItemError> for CustomerError {
    fn from(item: BulkItemError) -> Self {
        Self {
            email: item.email,
            errors: item.errors,
        }
    }
}

#[derive(SimpleObject)]
pub struct BulkCreateCustomersPayload {
    pub customers: Vec<CustomerNode>,
    pub errors: Vec<CustomerError>,
}

impl From<BulkCreateReport> for BulkCreateCustomersPayload {
    fn from(report: BulkCreateReport) -> Self {
        Self {
            customers: report.created.into_iter().map(CustomerNode).collect(),
            errors: report.errors.into_iter().map(CustomerError::from).collect(),
        }
    }
}

#[derive(SimpleObject)]
pub struct CreateProductPayload {
    pub product: ProductNode,
    pub message: String,
}

#[derive(SimpleObject)]
pub struct CreateOrderPayload {
    pub order: OrderNode,
    pub message: String,
}

#[derive(SimpleObject)]
pub struct UpdateLowStockProductsPayload {
    pub success: bool,
    pub message: String,
    pub updated_products: Vec<ProductNode>,
}
