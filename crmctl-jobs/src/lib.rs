//! crmctl-jobs: periodic CRM jobs and their scheduler
//!
//! Jobs talk to the CRM only through a [`GraphqlTransport`], so the same
//! job runs against a remote server over HTTP or against a schema in the
//! same process. The [`Scheduler`] knows nothing about transports.

pub mod error;
pub mod jobs;
pub mod log;
pub mod scheduler;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use crmctl_core::config::JobsSettings;

pub use error::{JobError, SchedulerError, TransportError};
pub use jobs::{HeartbeatJob, Job, JobKind, LowStockJob, OrderRemindersJob, ReportJob};
pub use log::JobLog;
pub use scheduler::{Cadence, Scheduler};
pub use transport::{extract_data, GraphqlTransport, HttpTransport};

/// Register every enabled job with its configured cadence.
///
/// `transport_for` receives the job and its per-call timeout.
pub fn build_scheduler<F>(settings: &JobsSettings, transport_for: F) -> Result<Scheduler, SchedulerError>
where
    F: Fn(JobKind, Duration) -> Arc<dyn GraphqlTransport>,
{
    let mut scheduler = Scheduler::new();
    for kind in JobKind::ALL {
        let job_settings = kind.settings(settings);
        if !job_settings.enabled {
            tracing::info!(job = %kind, "job disabled");
            continue;
        }
        let cadence = Cadence::from_settings(kind.as_str(), job_settings)?;
        let transport = transport_for(kind, kind.timeout(settings));
        scheduler.register(kind.build(settings, transport), cadence);
    }
    Ok(scheduler)
}

/// HTTP transports against `settings.graphql_url`, sharing one client.
pub fn http_transports(
    settings: &JobsSettings,
) -> Result<impl Fn(JobKind, Duration) -> Arc<dyn GraphqlTransport>, TransportError> {
    let client = reqwest::Client::builder().build()?;
    let url = settings.graphql_url.clone();
    Ok(move |_kind: JobKind, timeout: Duration| -> Arc<dyn GraphqlTransport> {
        Arc::new(HttpTransport::with_client(client.clone(), url.clone(), timeout))
    })
}
