//! Job scheduler
//!
//! Each registered job gets its own loop: wait for the next fire time,
//! run, repeat. A job therefore never overlaps itself, while different
//! jobs run independently. Failures are logged and the loop continues.

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cron::Schedule;
use tokio::sync::watch;
use tokio::task::JoinSet;

use crmctl_core::config::JobSettings;

use crate::error::SchedulerError;
use crate::jobs::Job;

/// How often a job fires
#[derive(Debug, Clone)]
pub enum Cadence {
    /// Fixed interval, first fire one interval after start
    Every(Duration),
    /// Six-field cron expression (seconds first), evaluated in UTC
    Cron(Box<Schedule>),
}

impl Cadence {
    pub fn every(interval: Duration) -> Self {
        Cadence::Every(interval)
    }

    pub fn cron(expr: &str) -> Result<Self, SchedulerError> {
        let schedule = Schedule::from_str(expr).map_err(|source| SchedulerError::InvalidCron {
            expr: expr.to_string(),
            source,
        })?;
        Ok(Cadence::Cron(Box::new(schedule)))
    }

    /// `every_secs` wins over `cron` when both are set.
    pub fn from_settings(name: &str, settings: &JobSettings) -> Result<Self, SchedulerError> {
        match (settings.every_secs, settings.cron.as_deref()) {
            (Some(0), _) => Err(SchedulerError::ZeroInterval(name.to_string())),
            (Some(secs), _) => Ok(Cadence::every(Duration::from_secs(secs))),
            (None, Some(expr)) => Cadence::cron(expr),
            (None, None) => Err(SchedulerError::NoCadence(name.to_string())),
        }
    }

    /// Time to wait from `now` until the next fire, `None` if the schedule
    /// has no future fire times.
    pub fn delay_after(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self {
            Cadence::Every(interval) => Some(*interval),
            Cadence::Cron(schedule) => {
                let next = schedule.after(&now).next()?;
                Some((next - now).to_std().unwrap_or(Duration::ZERO))
            }
        }
    }
}

/// Drives registered jobs until shutdown
#[derive(Default)]
pub struct Scheduler {
    entries: Vec<(Arc<dyn Job>, Cadence)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, job: Arc<dyn Job>, cadence: Cadence) -> &mut Self {
        tracing::info!(job = job.name(), cadence = %cadence_label(&cadence), "job registered");
        self.entries.push((job, cadence));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every job loop until `shutdown` resolves. A run in progress is
    /// allowed to finish.
    pub async fn run(self, shutdown: impl Future<Output = ()>) {
        let (stop_tx, stop_rx) = watch::channel(false);
        let mut tasks = JoinSet::new();

        for (job, cadence) in self.entries {
            tasks.spawn(job_loop(job, cadence, stop_rx.clone()));
        }
        tracing::info!(jobs = tasks.len(), "scheduler started");

        shutdown.await;
        tracing::info!("scheduler stopping");
        let _ = stop_tx.send(true);

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "job loop panicked");
            }
        }
        tracing::info!("scheduler stopped");
    }
}

fn cadence_label(cadence: &Cadence) -> String {
    match cadence {
        Cadence::Every(d) => format!("every {}s", d.as_secs()),
        Cadence::Cron(schedule) => format!("cron {}", schedule),
    }
}

async fn job_loop(job: Arc<dyn Job>, cadence: Cadence, mut stop: watch::Receiver<bool>) {
    loop {
        let Some(delay) = cadence.delay_after(Utc::now()) else {
            tracing::warn!(job = job.name(), "schedule has no upcoming fire time");
            return;
        };

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = stop.changed() => return,
        }

        tracing::debug!(job = job.name(), "job firing");
        if let Err(e) = job.run().await {
            tracing::warn!(job = job.name(), error = %e, "job run failed");
        }

        if *stop.borrow() {
            return;
        }
    }
}
