use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::JobError;
use crate::log::{timestamp, JobLog, PRECISE_FORMAT};
use crate::transport::GraphqlTransport;

use super::{field, Job};

const RESTOCK_MUTATION: &str = r#"
mutation {
    updateLowStockProducts {
        success
        message
        updatedProducts {
            id
            name
            stock
        }
    }
}
"#;

/// Triggers low-stock replenishment and records what was restocked
pub struct LowStockJob {
    transport: Arc<dyn GraphqlTransport>,
    log: JobLog,
}

impl LowStockJob {
    pub fn new(transport: Arc<dyn GraphqlTransport>, log: JobLog) -> Self {
        Self { transport, log }
    }

    async fn restock(&self) -> Result<Vec<String>, JobError> {
        let data = self.transport.execute(RESTOCK_MUTATION, None).await?;
        let result = field(&data, &["updateLowStockProducts"])?;

        let message = field(result, &["message"])?
            .as_str()
            .unwrap_or_default()
            .to_string();
        let mut lines = vec![message];

        let products = field(result, &["updatedProducts"])?
            .as_array()
            .cloned()
            .unwrap_or_default();
        for product in &products {
            let name = product.get("name").and_then(Value::as_str).unwrap_or("?");
            let stock = product.get("stock").cloned().unwrap_or(Value::Null);
            lines.push(format!("- {}: {}", name, stock));
        }
        Ok(lines)
    }
}

#[async_trait]
impl Job for LowStockJob {
    fn name(&self) -> &'static str {
        "low-stock"
    }

    async fn run(&self) -> Result<(), JobError> {
        let result = self.restock().await;

        let mut lines = vec![String::new(), format!("=== {} ===", timestamp(PRECISE_FORMAT))];
        match &result {
            Ok(body) => lines.extend(body.iter().cloned()),
            Err(e) => lines.push(format!("Error: {}", e)),
        }
        self.log.append_lines(lines).await?;

        result.map(|body| {
            tracing::info!(updated = body.len().saturating_sub(1), "low-stock update logged");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::fake::FakeTransport;
    use serde_json::json;

    #[tokio::test]
    async fn logs_updated_products() {
        let dir = tempfile::tempdir().unwrap();
        let log = JobLog::new(dir.path().join("low_stock.txt"));
        let transport = Arc::new(FakeTransport::new(vec![Ok(json!({
            "updateLowStockProducts": {
                "success": true,
                "message": "2 products updated.",
                "updatedProducts": [
                    { "id": "1", "name": "Cable", "stock": 13 },
                    { "id": "4", "name": "Mouse", "stock": 10 }
                ]
            }
        }))]));

        LowStockJob::new(transport, log.clone()).run().await.unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "");
        assert!(lines[1].starts_with("=== ") && lines[1].ends_with(" ==="));
        assert_eq!(&lines[2..], ["2 products updated.", "- Cable: 13", "- Mouse: 10"]);
    }

    #[tokio::test]
    async fn failure_is_logged_and_returned() {
        let dir = tempfile::tempdir().unwrap();
        let log = JobLog::new(dir.path().join("low_stock.txt"));
        let transport = Arc::new(FakeTransport::new(vec![Err("internal error".into())]));

        let err = LowStockJob::new(transport, log.clone()).run().await.unwrap_err();
        assert_eq!(err.to_string(), "internal error");

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert!(content.ends_with("Error: internal error\n"));
    }
}
