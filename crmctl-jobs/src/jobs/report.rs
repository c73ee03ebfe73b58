use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::error::JobError;
use crate::log::{timestamp, JobLog, STAMP_FORMAT};
use crate::transport::GraphqlTransport;

use super::{field, Job, PAGE_SIZE};

const REPORT_QUERY: &str = r#"
query Report($first: Int!, $after: String) {
    allCustomers { totalCount }
    allOrders(first: $first, after: $after) {
        totalCount
        pageInfo { hasNextPage endCursor }
        edges { node { totalAmount } }
    }
}
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Summary {
    customers: i64,
    orders: i64,
    revenue: Decimal,
}

/// Weekly totals: customers, orders and revenue summed over every order
pub struct ReportJob {
    transport: Arc<dyn GraphqlTransport>,
    log: JobLog,
}

impl ReportJob {
    pub fn new(transport: Arc<dyn GraphqlTransport>, log: JobLog) -> Self {
        Self { transport, log }
    }

    async fn summarize(&self) -> Result<Summary, JobError> {
        let mut summary = Summary {
            customers: 0,
            orders: 0,
            revenue: Decimal::ZERO,
        };
        let mut after: Option<String> = None;
        let mut first_page = true;

        loop {
            let variables = json!({ "first": PAGE_SIZE, "after": after });
            let data = self.transport.execute(REPORT_QUERY, Some(variables)).await?;
            let orders = field(&data, &["allOrders"])?;

            if first_page {
                summary.customers = count(&data, &["allCustomers", "totalCount"])?;
                summary.orders = count(&data, &["allOrders", "totalCount"])?;
                first_page = false;
            }

            for edge in field(orders, &["edges"])?.as_array().into_iter().flatten() {
                summary.revenue += amount(field(edge, &["node", "totalAmount"])?)?;
            }

            let page_info = field(orders, &["pageInfo"])?;
            let has_next = page_info.get("hasNextPage").and_then(Value::as_bool).unwrap_or(false);
            match page_info.get("endCursor").and_then(Value::as_str) {
                Some(cursor) if has_next => after = Some(cursor.to_string()),
                _ => break,
            }
        }

        summary.revenue.rescale(2);
        Ok(summary)
    }
}

fn count(data: &Value, path: &[&str]) -> Result<i64, JobError> {
    field(data, path)?
        .as_i64()
        .ok_or_else(|| JobError::Response(format!("'{}' is not an integer", path.join("."))))
}

/// Amounts arrive as decimal strings; plain JSON numbers are accepted too.
fn amount(value: &Value) -> Result<Decimal, JobError> {
    let parsed = match value {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    };
    parsed.ok_or_else(|| JobError::Response(format!("invalid totalAmount {}", value)))
}

#[async_trait]
impl Job for ReportJob {
    fn name(&self) -> &'static str {
        "report"
    }

    async fn run(&self) -> Result<(), JobError> {
        let result = self.summarize().await;

        let mut lines = vec![String::new(), format!("=== {} ===", timestamp(STAMP_FORMAT))];
        match &result {
            Ok(s) => lines.push(format!(
                "Report: {} customers, {} orders, {} revenue",
                s.customers, s.orders, s.revenue
            )),
            Err(e) => lines.push(format!("Error: {}", e)),
        }
        self.log.append_lines(lines).await?;

        let summary = result?;
        tracing::info!(
            customers = summary.customers,
            orders = summary.orders,
            revenue = %summary.revenue,
            "CRM report logged"
        );
        Ok(())
    }
}
