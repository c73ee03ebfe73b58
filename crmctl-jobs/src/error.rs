//! Error types for crmctl-jobs

use std::time::Duration;

use thiserror::Error;

/// Calling the GraphQL API failed
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Response carried a non-empty `errors` array
    #[error("{0}")]
    GraphQl(String),

    #[error("invalid GraphQL response: {0}")]
    InvalidResponse(String),
}

/// A job run failed
#[derive(Error, Debug)]
pub enum JobError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("log file error: {0}")]
    Io(#[from] std::io::Error),

    /// Data came back but not in the expected shape
    #[error("unexpected response: {0}")]
    Response(String),
}

/// Scheduler setup failed
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("invalid cron expression '{expr}': {source}")]
    InvalidCron {
        expr: String,
        #[source]
        source: cron::error::Error,
    },

    #[error("job '{0}' has neither every_secs nor cron configured")]
    NoCadence(String),

    #[error("interval for job '{0}' must be positive")]
    ZeroInterval(String),

    #[error("unknown job '{0}' (expected heartbeat, low-stock, reminders or report)")]
    UnknownJob(String),
}
