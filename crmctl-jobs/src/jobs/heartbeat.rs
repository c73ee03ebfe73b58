use std::sync::Arc;

use async_trait::async_trait;

use crate::error::JobError;
use crate::log::{timestamp, JobLog, HEARTBEAT_FORMAT};
use crate::transport::GraphqlTransport;

use super::Job;

const HELLO_QUERY: &str = "query { hello }";

/// Records that the CRM is alive and whether its GraphQL endpoint answers.
///
/// A failed probe is logged, never returned.
pub struct HeartbeatJob {
    transport: Arc<dyn GraphqlTransport>,
    log: JobLog,
}

impl HeartbeatJob {
    pub fn new(transport: Arc<dyn GraphqlTransport>, log: JobLog) -> Self {
        Self { transport, log }
    }
}

#[async_trait]
impl Job for HeartbeatJob {
    fn name(&self) -> &'static str {
        "heartbeat"
    }

    async fn run(&self) -> Result<(), JobError> {
        let ts = timestamp(HEARTBEAT_FORMAT);
        self.log.append_lines([format!("{} CRM is alive", ts)]).await?;

        let line = match self.transport.execute(HELLO_QUERY, None).await {
            Ok(data) => format!("{} GraphQL hello: {}", ts, data),
            Err(e) => {
                tracing::warn!(error = %e, "heartbeat GraphQL probe failed");
                format!("{} GraphQL check failed: {}", ts, e)
            }
        };
        self.log.append_lines([line]).await?;
        Ok(())
    }
}
