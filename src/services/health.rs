use super::api::SolarApi;
use super::scheduler::{Scheduler, TaskHandle, with_timeout};
use crate::config::Config;
use crate::models::{error::AppError, health::HealthResponse, health::HealthStatus};
use crate::store::Store;
use chrono::Utc;
use std::rc::Rc;

/// Periodically probes `GET /health` and records the result in the store.
pub struct HealthMonitor<A, S> {
    api: Rc<A>,
    store: Store,
    scheduler: S,
    interval_ms: u32,
    timeout_ms: u32,
}

impl<A, S: Clone> Clone for HealthMonitor<A, S> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            store: self.store.clone(),
            scheduler: self.scheduler.clone(),
            interval_ms: self.interval_ms,
            timeout_ms: self.timeout_ms,
        }
    }
}

impl<A, S> HealthMonitor<A, S>
where
    A: SolarApi + 'static,
    S: Scheduler,
{
    pub fn new(api: Rc<A>, store: Store, scheduler: S) -> Self {
        Self {
            api,
            store,
            scheduler,
            interval_ms: Config::HEALTH_CHECK_INTERVAL_MS,
            timeout_ms: Config::REQUEST_TIMEOUT_MS,
        }
    }

    pub fn with_interval(mut self, interval_ms: u32) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Probes right away, then once per interval until the handle is cancelled.
    pub fn start(&self) -> TaskHandle {
        let handle = TaskHandle::new();
        let monitor = self.clone();
        let loop_handle = handle.clone();

        self.scheduler.spawn(Box::pin(async move {
            while !loop_handle.is_cancelled() {
                let result = monitor.fetch().await;
                if loop_handle.is_cancelled() {
                    break;
                }
                monitor.record(result);
                monitor.scheduler.sleep(monitor.interval_ms).await;
            }
        }));

        handle
    }

    /// Runs a single probe. Failures are recorded as [`HealthStatus::Error`], never returned.
    pub async fn probe(&self) -> HealthStatus {
        let result = self.fetch().await;
        self.record(result)
    }

    async fn fetch(&self) -> Result<HealthResponse, AppError> {
        with_timeout(&self.scheduler, self.timeout_ms, self.api.check_health()).await
    }

    fn record(&self, result: Result<HealthResponse, AppError>) -> HealthStatus {
        let result = result.map_err(|e| {
            log::warn!("Health check error: {e}");
            e.to_string()
        });
        self.store.apply_health(result, Utc::now());
        self.store.with(|s| s.health.status)
    }
}
