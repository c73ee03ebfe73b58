//! GraphQL transports
//!
//! Jobs only see [`GraphqlTransport`]; whether a request goes over HTTP or
//! straight into an in-process schema is decided by whoever builds the job.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::error::TransportError;

/// Execute a GraphQL document and return its `data`
#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    async fn execute(&self, query: &str, variables: Option<Value>) -> Result<Value, TransportError>;
}

/// Split a GraphQL response body into `data` or an error.
///
/// A non-empty `errors` array wins over any partial data; its messages are
/// joined with `; `.
pub fn extract_data(mut body: Value) -> Result<Value, TransportError> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        if !errors.is_empty() {
            let messages: Vec<String> = errors
                .iter()
                .map(|e| match e.get("message").and_then(Value::as_str) {
                    Some(message) => message.to_string(),
                    None => e.to_string(),
                })
                .collect();
            return Err(TransportError::GraphQl(messages.join("; ")));
        }
    }
    match body.get_mut("data").map(Value::take) {
        Some(Value::Null) | None => Err(TransportError::InvalidResponse(
            "response has neither data nor errors".to_string(),
        )),
        Some(data) => Ok(data),
    }
}

/// JSON POST to a GraphQL endpoint with a fixed per-call timeout
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, url, timeout))
    }

    /// Share one connection pool across transports with different timeouts
    pub fn with_client(client: Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl GraphqlTransport for HttpTransport {
    async fn execute(&self, query: &str, variables: Option<Value>) -> Result<Value, TransportError> {
        let payload = json!({
            "query": query,
            "variables": variables.unwrap_or(Value::Null),
        });

        tracing::debug!(url = %self.url, "posting GraphQL request");
        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await.map_err(|e| self.classify(e))?;
        extract_data(body)
    }
}

impl HttpTransport {
    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Http(err)
        }
    }
}
