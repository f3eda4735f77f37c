use crate::metrics;
use std::sync::Arc;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{error, info};

pub mod tasks;

/// Job scheduler for background tasks
pub struct JobScheduler {
    context: Arc<crate::context::AppContext>,
}

impl JobScheduler {
    pub fn new(context: Arc<crate::context::AppContext>) -> Self {
        Self { context }
    }

    /// Start all background jobs
    pub fn start(self: Arc<Self>) {
        info!("Starting background job scheduler");

        tokio::spawn(Self::marker_update_job(Arc::clone(&self)));

        info!("Background jobs started");
    }

    /// Snapshot connected players into the marker file
    async fn marker_update_job(scheduler: Arc<Self>) {
        let period = Duration::from_secs(scheduler.context.config.markers.update_interval_secs);
        let mut interval = interval(period);
        // Slow profile lookups must not cause a burst of catch-up runs
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Updating markers every {}s", period.as_secs());

        loop {
            interval.tick().await;
            let started = Instant::now();

            match tasks::update_markers(&scheduler.context).await {
                Ok(count) => {
                    metrics::record_marker_update(true, count, started.elapsed().as_secs_f64());
                    tracing::debug!("Marker update: {} player(s)", count);
                }
                Err(e) => {
                    metrics::record_marker_update(false, 0, started.elapsed().as_secs_f64());
                    error!("Failed to update markers: {}", e);
                }
            }
        }
    }
}
