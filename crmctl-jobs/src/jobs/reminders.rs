use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::error::JobError;
use crate::log::{timestamp, JobLog, STAMP_FORMAT};
use crate::transport::GraphqlTransport;

use super::{field, Job, PAGE_SIZE};

/// Orders placed within this many days get a reminder
pub const REMINDER_WINDOW_DAYS: i64 = 7;

const RECENT_ORDERS_QUERY: &str = r#"
query RecentOrders($since: DateTime!, $first: Int!, $after: String) {
    allOrders(orderDateGte: $since, first: $first, after: $after) {
        pageInfo { hasNextPage endCursor }
        edges { node { id customer { email } } }
    }
}
"#;

/// Logs one reminder line per order from the trailing reminder window.
///
/// Fails without touching the log when the query fails.
pub struct OrderRemindersJob {
    transport: Arc<dyn GraphqlTransport>,
    log: JobLog,
}

struct Reminder {
    order_id: String,
    email: String,
}

impl OrderRemindersJob {
    pub fn new(transport: Arc<dyn GraphqlTransport>, log: JobLog) -> Self {
        Self { transport, log }
    }

    async fn recent_orders(&self) -> Result<Vec<Reminder>, JobError> {
        let since = (Utc::now() - Duration::days(REMINDER_WINDOW_DAYS))
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut reminders = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let variables = json!({ "since": since, "first": PAGE_SIZE, "after": after });
            let data = self.transport.execute(RECENT_ORDERS_QUERY, Some(variables)).await?;
            let orders = field(&data, &["allOrders"])?;

            for edge in field(orders, &["edges"])?.as_array().into_iter().flatten() {
                let node = field(edge, &["node"])?;
                reminders.push(Reminder {
                    order_id: node.get("id").and_then(Value::as_str).unwrap_or_default().to_string(),
                    email: node
                        .pointer("/customer/email")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                });
            }

            let page_info = field(orders, &["pageInfo"])?;
            let has_next = page_info.get("hasNextPage").and_then(Value::as_bool).unwrap_or(false);
            match page_info.get("endCursor").and_then(Value::as_str) {
                Some(cursor) if has_next => after = Some(cursor.to_string()),
                _ => break,
            }
        }
        Ok(reminders)
    }
}

#[async_trait]
impl Job for OrderRemindersJob {
    fn name(&self) -> &'static str {
        "reminders"
    }

    fn exit_on_failure(&self) -> bool {
        true
    }

    async fn run(&self) -> Result<(), JobError> {
        let reminders = self.recent_orders().await?;

        let lines: Vec<String> = reminders
            .iter()
            .map(|r| {
                format!(
                    "{} - Reminder for Order {} to {}",
                    timestamp(STAMP_FORMAT),
                    r.order_id,
                    r.email
                )
            })
            .collect();
        if !lines.is_empty() {
            self.log.append_lines(lines).await?;
        }

        tracing::info!(reminders = reminders.len(), "order reminders logged");
        println!("Order reminders processed!");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::fake::FakeTransport;

    fn page(ids: &[(&str, &str)], next: Option<&str>) -> Value {
        json!({
            "allOrders": {
                "pageInfo": { "hasNextPage": next.is_some(), "endCursor": next },
                "edges": ids.iter().map(|(id, email)| json!({
                    "node": { "id": id, "customer": { "email": email } }
                })).collect::<Vec<_>>()
            }
        })
    }

    #[tokio::test]
    async fn pages_through_all_recent_orders() {
        let dir = tempfile::tempdir().unwrap();
        let log = JobLog::new(dir.path().join("reminders.txt"));
        let transport = Arc::new(FakeTransport::new(vec![
            Ok(page(&[("1", "alice@example.com"), ("2", "bob@example.com")], Some("1"))),
            Ok(page(&[("3", "carol@example.com")], None)),
        ]));

        OrderRemindersJob::new(transport.clone(), log.clone())
            .run()
            .await
            .unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        let line = regex::Regex::new(
            r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} - Reminder for Order 3 to carol@example\.com$",
        )
        .unwrap();
        assert!(line.is_match(lines[2]), "{}", lines[2]);

        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        let first_vars = calls[0].1.as_ref().unwrap();
        assert_eq!(first_vars["after"], Value::Null);
        assert_eq!(first_vars["first"], PAGE_SIZE);
        let since = chrono::DateTime::parse_from_rfc3339(first_vars["since"].as_str().unwrap()).unwrap();
        let age = Utc::now() - since.with_timezone(&Utc);
        assert!(age >= Duration::days(7) && age < Duration::days(7) + Duration::minutes(1));
        assert_eq!(calls[1].1.as_ref().unwrap()["after"], "1");
    }

    #[tokio::test]
    async fn query_failure_fails_without_logging() {
        let dir = tempfile::tempdir().unwrap();
        let log = JobLog::new(dir.path().join("reminders.txt"));
        let transport = Arc::new(FakeTransport::new(vec![Err("boom".into())]));

        let job = OrderRemindersJob::new(transport, log.clone());
        let err = job.run().await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(job.exit_on_failure());
        assert!(!log.path().exists());
    }
}
