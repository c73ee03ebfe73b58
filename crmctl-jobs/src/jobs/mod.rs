//! The scheduled jobs
//!
//! Every job catches its own failures at the boundary: the reason goes to
//! the job's log file (where the job has one to write) and back to the
//! caller as a [`JobError`] for tracing. Only the reminder job asks the
//! process to exit non-zero when run once from the command line.

mod heartbeat;
mod low_stock;
mod reminders;
mod report;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crmctl_core::config::{JobSettings, JobsSettings};

use crate::error::{JobError, SchedulerError};
use crate::log::JobLog;
use crate::transport::GraphqlTransport;

pub use heartbeat::HeartbeatJob;
pub use low_stock::LowStockJob;
pub use reminders::{OrderRemindersJob, REMINDER_WINDOW_DAYS};
pub use report::ReportJob;

/// Orders fetched per request when a job pages through a connection
pub(crate) const PAGE_SIZE: i32 = 100;

#[async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether a failed one-off run should end the process with an error
    fn exit_on_failure(&self) -> bool {
        false
    }

    async fn run(&self) -> Result<(), JobError>;
}

/// The known jobs, by command-line name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Heartbeat,
    LowStock,
    Reminders,
    Report,
}

impl JobKind {
    pub const ALL: [JobKind; 4] = [
        JobKind::Heartbeat,
        JobKind::LowStock,
        JobKind::Reminders,
        JobKind::Report,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobKind::Heartbeat => "heartbeat",
            JobKind::LowStock => "low-stock",
            JobKind::Reminders => "reminders",
            JobKind::Report => "report",
        }
    }

    pub fn settings(self, jobs: &JobsSettings) -> &JobSettings {
        match self {
            JobKind::Heartbeat => &jobs.heartbeat,
            JobKind::LowStock => &jobs.low_stock,
            JobKind::Reminders => &jobs.order_reminders,
            JobKind::Report => &jobs.report,
        }
    }

    pub fn timeout(self, jobs: &JobsSettings) -> Duration {
        Duration::from_secs(self.settings(jobs).timeout_secs.max(1))
    }

    /// Instantiate the job over `transport`, logging to its configured file
    pub fn build(self, jobs: &JobsSettings, transport: Arc<dyn GraphqlTransport>) -> Arc<dyn Job> {
        let log = JobLog::new(self.settings(jobs).log_path.clone());
        match self {
            JobKind::Heartbeat => Arc::new(HeartbeatJob::new(transport, log)),
            JobKind::LowStock => Arc::new(LowStockJob::new(transport, log)),
            JobKind::Reminders => Arc::new(OrderRemindersJob::new(transport, log)),
            JobKind::Report => Arc::new(ReportJob::new(transport, log)),
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobKind {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "heartbeat" => Ok(JobKind::Heartbeat),
            "low-stock" | "lowstock" => Ok(JobKind::LowStock),
            "reminders" | "order-reminders" => Ok(JobKind::Reminders),
            "report" => Ok(JobKind::Report),
            _ => Err(SchedulerError::UnknownJob(s.to_string())),
        }
    }
}

/// Walk `path` into a response, failing if any key is missing
pub(crate) fn field<'a>(data: &'a serde_json::Value, path: &[&str]) -> Result<&'a serde_json::Value, JobError> {
    let mut current = data;
    for key in path {
        current = current
            .get(key)
            .ok_or_else(|| JobError::Response(format!("missing field '{}'", path.join("."))))?;
    }
    Ok(current)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_job_names() {
        assert_eq!("heartbeat".parse::<JobKind>().unwrap(), JobKind::Heartbeat);
        assert_eq!("low_stock".parse::<JobKind>().unwrap(), JobKind::LowStock);
        assert_eq!("Order-Reminders".parse::<JobKind>().unwrap(), JobKind::Reminders);
        assert!("payroll".parse::<JobKind>().is_err());
        for kind in JobKind::ALL {
            assert_eq!(kind.as_str().parse::<JobKind>().unwrap(), kind);
        }
    }

    #[test]
    fn default_timeouts() {
        let jobs = JobsSettings::default();
        assert_eq!(JobKind::Heartbeat.timeout(&jobs), Duration::from_secs(5));
        assert_eq!(JobKind::Report.timeout(&jobs), Duration::from_secs(10));
    }

    #[test]
    fn only_reminders_exit_on_failure() {
        let jobs = JobsSettings::default();
        let transport: Arc<dyn GraphqlTransport> = Arc::new(fake::FakeTransport::default());
        for kind in JobKind::ALL {
            let job = kind.build(&jobs, transport.clone());
            assert_eq!(job.name(), kind.as_str());
            assert_eq!(job.exit_on_failure(), kind == JobKind::Reminders);
        }
    }
}
