//! GraphQL API
//!
//! The schema is registered once at startup by [`build_schema`]; the
//! [`CrmService`] is attached as shared data and every resolver goes
//! through it.

pub mod connection;
pub mod error;
pub mod mutation;
pub mod query;
pub mod types;

use async_graphql::{EmptySubscription, Request, Schema, Variables};
use serde_json::Value;

use crmctl_core::CrmService;

pub use mutation::MutationRoot;
pub use query::QueryRoot;

pub type CrmSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Register query and mutation roots and attach the service.
pub fn build_schema(service: CrmService) -> CrmSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(service)
        .finish()
}

/// Execute a query against the schema in-process and return the
/// response as JSON (`{"data": ..., "errors": [...]}`).
pub async fn execute_json(schema: &CrmSchema, query: &str, variables: Option<Value>) -> Value {
    let mut request = Request::new(query);
    if let Some(variables) = variables {
        request = request.variables(Variables::from_json(variables));
    }
    let response = schema.execute(request).await;
    serde_json::to_value(&response).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to serialize GraphQL response");
        serde_json::json!({ "data": null, "errors": [{ "message": "internal error" }] })
    })
}
