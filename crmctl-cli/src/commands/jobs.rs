//! Scheduled jobs: run them all on their cadences, or one job once

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use crmctl_core::{CrmConfig, CrmService};
use crmctl_jobs::{build_scheduler, http_transports, GraphqlTransport, HttpTransport, JobKind};
use crmctl_server::{build_schema, open_store, shutdown_signal, CrmSchema};

use crate::local::LocalTransport;

#[derive(Parser, Debug)]
pub struct JobsArgs {
    /// Execute GraphQL in this process against the configured store
    /// instead of calling [jobs].graphql_url
    #[arg(long)]
    pub in_process: bool,

    /// GraphQL endpoint (overrides [jobs].graphql_url)
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Parser, Debug)]
pub struct RunJobArgs {
    /// Job to run: heartbeat, low-stock, reminders or report
    pub job: JobKind,

    /// Execute GraphQL in this process against the configured store
    #[arg(long)]
    pub in_process: bool,

    /// GraphQL endpoint (overrides [jobs].graphql_url)
    #[arg(long)]
    pub url: Option<String>,
}

async fn local_schema(config: &CrmConfig) -> Result<CrmSchema> {
    let store = open_store(&config.server)
        .await
        .context("Failed to open store")?;
    Ok(build_schema(CrmService::new(store)))
}

/// Run every enabled job on its cadence until Ctrl+C/SIGTERM
pub async fn run_jobs(args: JobsArgs, mut config: CrmConfig) -> Result<()> {
    if let Some(url) = args.url {
        config.jobs.graphql_url = url;
    }

    let scheduler = if args.in_process {
        let schema = local_schema(&config).await?;
        build_scheduler(&config.jobs, move |_, timeout| {
            Arc::new(LocalTransport::new(schema.clone(), timeout)) as Arc<dyn GraphqlTransport>
        })
    } else {
        tracing::info!(url = %config.jobs.graphql_url, "jobs will call GraphQL over HTTP");
        build_scheduler(&config.jobs, http_transports(&config.jobs)?)
    }
    .context("Invalid job configuration")?;

    if scheduler.is_empty() {
        tracing::warn!("all jobs are disabled, nothing to schedule");
        return Ok(());
    }

    scheduler.run(shutdown_signal()).await;
    Ok(())
}

/// Run one job immediately.
///
/// A failing reminder run reports the reason on stderr and exits non-zero;
/// other jobs have already recorded their failure in their log file.
pub async fn run_job(args: RunJobArgs, mut config: CrmConfig) -> Result<()> {
    if let Some(url) = args.url {
        config.jobs.graphql_url = url;
    }
    let timeout: Duration = args.job.timeout(&config.jobs);

    let transport: Arc<dyn GraphqlTransport> = if args.in_process {
        Arc::new(LocalTransport::new(local_schema(&config).await?, timeout))
    } else {
        Arc::new(HttpTransport::new(config.jobs.graphql_url.clone(), timeout)?)
    };

    let job = args.job.build(&config.jobs, transport);
    tracing::info!(job = job.name(), "running job once");

    if let Err(e) = job.run().await {
        if job.exit_on_failure() {
            eprintln!("Error querying GraphQL: {}", e);
            std::process::exit(1);
        }
        tracing::warn!(job = job.name(), error = %e, "job run failed");
    }
    Ok(())
}
