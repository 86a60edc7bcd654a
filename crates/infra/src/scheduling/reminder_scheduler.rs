//! Cron-driven reminder sweep
//!
//! Runs the core reminder service on a fixed schedule so upcoming events
//! produce reminder notifications without any inbound request.

use std::sync::Arc;

use chrono::Utc;
use calendai_core::ReminderService;
use calendai_domain::{CalendaiError, ReminderConfig, Result};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

/// Owns the running cron scheduler for the reminder sweep.
pub struct ReminderScheduler {
    scheduler: JobScheduler,
}

impl ReminderScheduler {
    /// Build and start the scheduler. A sweep failure is logged and the
    /// schedule keeps running; the next tick retries naturally.
    pub async fn start(config: &ReminderConfig, service: Arc<ReminderService>) -> Result<Self> {
        let scheduler = JobScheduler::new().await.map_err(scheduler_error)?;

        let job = Job::new_async(config.cron_expression.as_str(), move |_uuid, _lock| {
            let service = service.clone();
            Box::pin(async move {
                match service.run_once(Utc::now()).await {
                    Ok(written) if written > 0 => {
                        info!(written, "reminder sweep wrote notifications");
                    }
                    Ok(_) => {}
                    Err(err) => error!(error = %err, "reminder sweep failed"),
                }
            })
        })
        .map_err(scheduler_error)?;

        scheduler.add(job).await.map_err(scheduler_error)?;
        scheduler.start().await.map_err(scheduler_error)?;
        info!(cron = %config.cron_expression, "reminder scheduler started");

        Ok(Self { scheduler })
    }

    /// Stop the scheduler; in-flight sweeps run to completion.
    pub async fn shutdown(mut self) -> Result<()> {
        self.scheduler.shutdown().await.map_err(scheduler_error)?;
        Ok(())
    }
}

fn scheduler_error(err: tokio_cron_scheduler::JobSchedulerError) -> CalendaiError {
    CalendaiError::Internal(format!("scheduler error: {err}"))
}
