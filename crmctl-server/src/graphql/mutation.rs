//! Mutation root
//!
//! Each field delegates to one `CrmService` operation, which owns the
//! unit of work for the call.

use async_graphql::{Context, Object, Result};

use crmctl_core::{CrmService, CustomerInput};

use super::error::graphql_error;
use super::types::{
    BulkCreateCustomersPayload, CreateCustomerPayload, CreateOrderPayload, CreateProductPayload,
    CustomerInputObject, CustomerNode, OrderInputObject, OrderNode, ProductInputObject,
    ProductNode, UpdateLowStockProductsPayload,
};

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_customer(
        &self,
        ctx: &Context<'_>,
        input: CustomerInputObject,
    ) -> Result<CreateCustomerPayload> {
        let service = ctx.data::<CrmService>()?;
        let customer = service
            .create_customer(input.into())
            .await
            .map_err(graphql_error)?;
        Ok(CreateCustomerPayload {
            customer: CustomerNode(customer),
            message: "Customer created successfully.".to_string(),
        })
    }

    /// Create many customers; invalid items are reported, valid ones kept
    async fn bulk_create_customers(
        &self,
        ctx: &Context<'_>,
        input: Vec<CustomerInputObject>,
    ) -> Result<BulkCreateCustomersPayload> {
        let service = ctx.data::<CrmService>()?;
        let inputs: Vec<CustomerInput> = input.into_iter().map(Into::into).collect();
        let report = service
            .bulk_create_customers(inputs)
            .await
            .map_err(graphql_error)?;
        Ok(report.into())
    }

    async fn create_product(
        &self,
        ctx: &Context<'_>,
        input: ProductInputObject,
    ) -> Result<CreateProductPayload> {
        let service = ctx.data::<CrmService>()?;
        let product = service
            .create_product(input.into())
            .await
            .map_err(graphql_error)?;
        Ok(CreateProductPayload {
            product: ProductNode(product),
            message: "Product created successfully.".to_string(),
        })
    }

    async fn create_order(&self, ctx: &Context<'_>, input: OrderInputObject) -> Result<CreateOrderPayload> {
        let service = ctx.data::<CrmService>()?;
        let order = service
            .create_order(input.into())
            .await
            .map_err(graphql_error)?;
        Ok(CreateOrderPayload {
            order: OrderNode(order),
            message: "Order created successfully.".to_string(),
        })
    }

    /// Add 10 units to every product with fewer than 10 in stock
    async fn update_low_stock_products(&self, ctx: &Context<'_>) -> Result<UpdateLowStockProductsPayload> {
        let service = ctx.data::<CrmService>()?;
        let updated = service
            .update_low_stock_products()
            .await
            .map_err(graphql_error)?;
        Ok(UpdateLowStockProductsPayload {
            success: true,
            message: format!("{} products updated.", updated.len()),
            updated_products: updated.into_iter().map(ProductNode).collect(),
        })
    }
}
