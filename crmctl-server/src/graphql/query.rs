//! Query root: `hello` plus the three list connections

use async_graphql::{Context, Object, Result, ID};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crmctl_core::models::parse_id;
use crmctl_core::{
    CrmService, CustomerFilter, CustomerQuery, ListQuery, OrderFilter, OrderQuery, ProductFilter,
    ProductQuery,
};

use super::connection::{self, CountedConnection, PageArgs};
use super::error::{bad_query, graphql_error};
use super::types::{CustomerNode, OrderNode, ProductNode};

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Liveness probe
    async fn hello(&self) -> &'static str {
        "Hello, GraphQL!"
    }

    /// Customers, filtered by name (case-insensitive), email or phone prefix
    #[allow(clippy::too_many_arguments)]
    async fn all_customers(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
        #[graphql(desc = "Filter by customer name (case-insensitive).")] customer_name: Option<String>,
        name: Option<String>,
        email: Option<String>,
        phone_pattern: Option<String>,
        #[graphql(desc = "Order by fields (e.g., ['name', '-email']).")] order_by: Option<Vec<String>>,
    ) -> Result<CountedConnection<CustomerNode>> {
        let service = ctx.data::<CrmService>()?.clone();
        let query: CustomerQuery = ListQuery::new(CustomerFilter {
            name_contains: customer_name.or(name),
            email_contains: email,
            phone_prefix: phone_pattern,
        })
        .order_by(&order_by.unwrap_or_default())
        .map_err(|e| graphql_error(e.into()))?;

        let args = PageArgs { after, before, first, last };
        connection::resolve(
            args,
            move |page| {
                let service = service.clone();
                let query = query.clone().page(page);
                async move { service.list_customers(&query).await }
            },
            CustomerNode,
        )
        .await
    }

    /// Products, filtered by name, price range, stock range or low stock
    #[allow(clippy::too_many_arguments)]
    async fn all_products(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
        #[graphql(desc = "Filter by product name (case-insensitive).")] product_name: Option<String>,
        name: Option<String>,
        price_gte: Option<Decimal>,
        price_lte: Option<Decimal>,
        stock_gte: Option<i32>,
        stock_lte: Option<i32>,
        low_stock: Option<bool>,
        #[graphql(desc = "Order by fields (e.g., ['name', '-price']).")] order_by: Option<Vec<String>>,
    ) -> Result<CountedConnection<ProductNode>> {
        let service = ctx.data::<CrmService>()?.clone();
        let query: ProductQuery = ListQuery::new(ProductFilter {
            name_contains: product_name.or(name),
            price_gte,
            price_lte,
            stock_gte,
            stock_lte,
            low_stock,
        })
        .order_by(&order_by.unwrap_or_default())
        .map_err(|e| graphql_error(e.into()))?;

        let args = PageArgs { after, before, first, last };
        connection::resolve(
            args,
            move |page| {
                let service = service.clone();
                let query = query.clone().page(page);
                async move { service.list_products(&query).await }
            },
            ProductNode,
        )
        .await
    }

    /// Orders, filtered by customer, product, amount or date
    #[allow(clippy::too_many_arguments)]
    async fn all_orders(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
        customer_name: Option<String>,
        product_name: Option<String>,
        product_id: Option<ID>,
        total_amount_gte: Option<Decimal>,
        total_amount_lte: Option<Decimal>,
        order_date_gte: Option<DateTime<Utc>>,
        order_date_lte: Option<DateTime<Utc>>,
        #[graphql(desc = "Order by fields (e.g., ['order_date', '-total_amount']).")] order_by: Option<
            Vec<String>,
        >,
    ) -> Result<CountedConnection<OrderNode>> {
        let service = ctx.data::<CrmService>()?.clone();
        let product_id = product_id
            .map(|raw| parse_id(&raw).ok_or_else(|| bad_query(format!("Invalid productId '{}'", raw.0))))
            .transpose()?;
        let query: OrderQuery = ListQuery::new(OrderFilter {
            customer_name,
            product_name,
            product_id,
            total_amount_gte,
            total_amount_lte,
            order_date_gte,
            order_date_lte,
        })
        .order_by(&order_by.unwrap_or_default())
        .map_err(|e| graphql_error(e.into()))?;

        let args = PageArgs { after, before, first, last };
        connection::resolve(
            args,
            move |page| {
                let service = service.clone();
                let query = query.clone().page(page);
                async move { service.list_orders(&query).await }
            },
            OrderNode,
        )
        .await
    }
}
