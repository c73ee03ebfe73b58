//! In-process GraphQL transport
//!
//! Lets the jobs run against a schema in the same process instead of a
//! server reached over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crmctl_jobs::{extract_data, GraphqlTransport, TransportError};
use crmctl_server::{execute_json, CrmSchema};

#[derive(Clone)]
pub struct LocalTransport {
    schema: CrmSchema,
    timeout: Duration,
}

impl LocalTransport {
    pub fn new(schema: CrmSchema, timeout: Duration) -> Self {
        Self { schema, timeout }
    }
}

#[async_trait]
impl GraphqlTransport for LocalTransport {
    async fn execute(&self, query: &str, variables: Option<Value>) -> Result<Value, TransportError> {
        let body = tokio::time::timeout(self.timeout, execute_json(&self.schema, query, variables))
            .await
            .map_err(|_| TransportError::Timeout(self.timeout))?;
        extract_data(body)
    }
}
