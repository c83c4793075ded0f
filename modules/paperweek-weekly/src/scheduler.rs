//! Weekly publication schedule.

use std::sync::Arc;

use anyhow::Result;
use chrono_tz::Tz;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

use paperweek_sources::SourceStore;

use crate::pipeline::WeeklyPaperJob;

/// Start the recurring job: every Monday at `post_hour` in `timezone`.
/// The returned scheduler must be kept alive for the jobs to fire.
pub async fn start<S: SourceStore + 'static>(
    job: Arc<WeeklyPaperJob<S>>,
    post_hour: u8,
    timezone: Tz,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let expression = format!("0 0 {post_hour} * * Mon");
    info!(cron = %expression, timezone = %timezone, "Scheduling the weekly paper publication");

    let weekly = Job::new_async_tz(expression.as_str(), timezone, move |_uuid, _lock| {
        let job = job.clone();
        Box::pin(async move {
            let outcome = job.run().await;
            info!(?outcome, "Weekly paper run finished");
        })
    })?;

    scheduler.add(weekly).await?;
    scheduler.start().await?;

    Ok(scheduler)
}
