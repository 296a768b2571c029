use super::api::SolarApi;
use super::retry::{RetryPolicy, retry_with_backoff};
use super::scheduler::{Scheduler, TaskHandle, with_timeout};
use crate::config::Config;
use crate::store::Store;
use std::rc::Rc;

/// Timing and retry behaviour of the job poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerSettings {
    pub interval_ms: u32,
    pub request_timeout_ms: u32,
    pub history_limit: u32,
    /// Applied to each status query. The default makes one attempt, so the
    /// first failed query stops monitoring.
    pub retry: RetryPolicy,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            interval_ms: Config::POLL_INTERVAL_MS,
            request_timeout_ms: Config::REQUEST_TIMEOUT_MS,
            history_limit: Config::JOB_QUERY_LIMIT,
            retry: RetryPolicy::fail_fast(),
        }
    }
}

/// Result of a single poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Jobs are still running; poll again after the interval.
    Active,
    /// The server reported no active jobs; completion was recorded.
    Completed,
    /// The status query failed; monitoring stops.
    Failed,
    /// The handle was cancelled while the query was in flight; result dropped.
    Cancelled,
    /// A newer poll was applied first; this response was dropped.
    Stale,
}

impl TickOutcome {
    pub const fn keeps_polling(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Polls server job status for an upload until no work remains.
pub struct JobPoller<A, S> {
    api: Rc<A>,
    store: Store,
    scheduler: S,
    settings: PollerSettings,
}

impl<A, S: Clone> Clone for JobPoller<A, S> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            store: self.store.clone(),
            scheduler: self.scheduler.clone(),
            settings: self.settings,
        }
    }
}

impl<A, S> JobPoller<A, S>
where
    A: SolarApi + 'static,
    S: Scheduler,
{
    pub fn new(api: Rc<A>, store: Store, scheduler: S) -> Self {
        Self {
            api,
            store,
            scheduler,
            settings: PollerSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: PollerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> PollerSettings {
        self.settings
    }

    /// Starts a background loop: one tick right away, then one per interval.
    ///
    /// Only one loop should run per upload. Starting a second loop does not
    /// stop the first; callers must not overlap uploads.
    pub fn start_monitoring(&self, job_id: impl Into<String>) -> TaskHandle {
        let job_id = job_id.into();
        let handle = TaskHandle::new();
        log::info!("Monitoring job {job_id}");

        let poller = self.clone();
        let loop_handle = handle.clone();
        self.scheduler
            .spawn(Box::pin(async move { poller.run(job_id, loop_handle).await }));

        handle
    }

    /// Idempotent, also after the loop has stopped itself.
    pub fn stop_monitoring(&self, handle: &TaskHandle) {
        handle.cancel();
    }

    async fn run(self, job_id: String, handle: TaskHandle) {
        let mut ticks = 0u32;
        while !handle.is_cancelled() {
            ticks += 1;
            if !self.tick(&handle).await.keeps_polling() {
                handle.cancel();
                break;
            }
            self.scheduler.sleep(self.settings.interval_ms).await;
        }
        log::debug!("Stopped monitoring job {job_id} after {ticks} polls");
    }

    /// Queries job status once and records the result.
    ///
    /// Each tick takes a fresh sequence number from the store before the query
    /// so a response that arrives after a newer one is discarded.
    pub async fn tick(&self, handle: &TaskHandle) -> TickOutcome {
        let seq = self.store.next_tick_seq();
        let api = &self.api;
        let scheduler = &self.scheduler;
        let PollerSettings {
            request_timeout_ms,
            history_limit,
            retry,
            ..
        } = self.settings;

        let result = retry_with_backoff(scheduler, retry, move || {
            with_timeout(
                scheduler,
                request_timeout_ms,
                api.fetch_jobs(false, history_limit),
            )
        })
        .await;

        if handle.is_cancelled() {
            return TickOutcome::Cancelled;
        }

        match result {
            Ok(response) => {
                let active = response.active_jobs;
                if !self.store.apply_job_tick(seq, &active) {
                    log::debug!("Dropped stale job poll #{seq}");
                    return TickOutcome::Stale;
                }

                if active.is_idle() {
                    if self.store.mark_job_completed() {
                        log::info!("Background jobs finished");
                    }
                    TickOutcome::Completed
                } else {
                    TickOutcome::Active
                }
            }
            Err(e) => {
                log::error!("Job monitoring error: {e}");
                TickOutcome::Failed
            }
        }
    }
}
