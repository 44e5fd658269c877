//! services/api/src/scheduler.rs
//!
//! Cron-based trigger for the word of the day. Runs a job at a fixed wall-clock
//! time in a fixed time zone. Each run is wrapped in a timeout and the
//! scheduler is started and stopped explicitly.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono_tz::Tz;
use saily_core::{WordOfTheDay, WordOfTheDayOutcome};
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Scheduler-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Scheduler already running")]
    AlreadyRunning,

    #[error("Scheduler not running")]
    NotRunning,

    #[error("Failed to create scheduler: {0}")]
    CreationFailed(String),

    #[error("Failed to start scheduler: {0}")]
    StartFailed(String),

    #[error("Failed to stop scheduler: {0}")]
    StopFailed(String),

    #[error("Failed to register job: {0}")]
    JobRegistrationFailed(String),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// A unit of work fired by the scheduler.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self);
}

#[async_trait]
impl ScheduledJob for WordOfTheDay {
    fn name(&self) -> &'static str {
        "word_of_the_day"
    }

    async fn run(&self) {
        match WordOfTheDay::run(self).await {
            WordOfTheDayOutcome::Persisted(record) => {
                debug!(word = %record.word, "Word of the day run finished")
            }
            outcome => debug!(?outcome, "Word of the day run finished without a new word"),
        }
    }
}

/// Configuration for the word scheduler.
#[derive(Debug, Clone)]
pub struct WordSchedulerConfig {
    /// Six-field cron expression (seconds first).
    pub cron_expression: String,
    pub time_zone: Tz,
    /// Timeout applied to a single job execution.
    pub job_timeout: Duration,
}

impl WordSchedulerConfig {
    pub fn new(cron_expression: impl Into<String>, time_zone: Tz) -> Self {
        Self {
            cron_expression: cron_expression.into(),
            time_zone,
            job_timeout: Duration::from_secs(120),
        }
    }
}

/// Scheduler with explicit lifecycle management.
///
/// Every run races the cancellation token, so [`WordScheduler::stop`] also
/// cuts off a run that is still in flight. The underlying cron runtime cannot
/// be restarted once shut down.
pub struct WordScheduler {
    scheduler: Arc<RwLock<JobScheduler>>,
    config: WordSchedulerConfig,
    cancellation: CancellationToken,
    running: bool,
}

impl WordScheduler {
    /// Creates the scheduler and registers `job` on the configured schedule.
    pub async fn new(
        config: WordSchedulerConfig,
        job: Arc<dyn ScheduledJob>,
    ) -> SchedulerResult<Self> {
        let raw_scheduler = JobScheduler::new()
            .await
            .map_err(|e| SchedulerError::CreationFailed(e.to_string()))?;

        let cancellation = CancellationToken::new();
        let job_cancellation = cancellation.clone();
        let job_timeout = config.job_timeout;
        let definition = Job::new_async_tz(
            config.cron_expression.as_str(),
            config.time_zone,
            move |_id, _lock| {
                let job = job.clone();
                let cancel = job_cancellation.clone();
                Box::pin(async move {
                    info!(job = job.name(), "Scheduled job fired");
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            warn!(job = job.name(), "Scheduled job cancelled");
                        }
                        result = tokio::time::timeout(job_timeout, job.run()) => {
                            if result.is_err() {
                                warn!(
                                    job = job.name(),
                                    timeout_secs = job_timeout.as_secs(),
                                    "Scheduled job timed out"
                                );
                            }
                        }
                    }
                })
            },
        )
        .map_err(|e| SchedulerError::JobRegistrationFailed(e.to_string()))?;

        let job_id = definition.guid();
        raw_scheduler
            .add(definition)
            .await
            .map_err(|e| SchedulerError::JobRegistrationFailed(e.to_string()))?;

        debug!(cron = %config.cron_expression, tz = %config.time_zone, %job_id, "Registered scheduled job");
        Ok(Self {
            scheduler: Arc::new(RwLock::new(raw_scheduler)),
            config,
            cancellation,
            running: false,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.running {
            return Err(SchedulerError::AlreadyRunning);
        }
        if self.cancellation.is_cancelled() {
            return Err(SchedulerError::StartFailed(
                "scheduler was already shut down".to_string(),
            ));
        }

        self.scheduler
            .read()
            .await
            .start()
            .await
            .map_err(|e| SchedulerError::StartFailed(e.to_string()))?;

        self.running = true;
        info!(
            cron = %self.config.cron_expression,
            tz = %self.config.time_zone,
            "Word scheduler started"
        );
        Ok(())
    }

    /// Stops firing new runs and cancels any run still in flight.
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.running {
            return Err(SchedulerError::NotRunning);
        }
        self.running = false;
        self.cancellation.cancel();

        self.scheduler
            .write()
            .await
            .shutdown()
            .await
            .map_err(|e| SchedulerError::StopFailed(e.to_string()))?;

        info!("Word scheduler stopped");
        Ok(())
    }
}

impl Drop for WordScheduler {
    fn drop(&mut self) {
        if self.running {
            warn!("WordScheduler dropped while running; cancelling");
            self.cancellation.cancel();
        }
    }
}
