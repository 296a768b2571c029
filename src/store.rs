//! Application state container.
//!
//! [`AppState`] holds every piece of status the dashboard shows and exposes
//! its transitions as plain methods. [`Store`] wraps one `AppState` in a
//! shared handle, applies transitions, and notifies subscribers after each
//! change. The upload coordinator, the pollers and the UI all receive a clone
//! of the same `Store`.

use crate::models::{
    health::{HealthResponse, ServerHealth},
    job::{ActiveJobs, JobStatus},
    prediction::{DailyProduction, InverterId, InverterMetrics, Prediction, ProductionMetrics},
    upload::{UploadResponse, UploadStatus},
};
use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use yew::Callback;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub upload: UploadStatus,
    pub job: JobStatus,
    pub health: ServerHealth,
    pub inverter_predictions: BTreeMap<InverterId, Vec<Prediction>>,
    pub daily_production: Option<DailyProduction>,
    pub production_metrics: ProductionMetrics,
    /// `None` for inverters whose metrics could not be fetched
    pub inverter_metrics: BTreeMap<InverterId, Option<InverterMetrics>>,
    pub is_loading_predictions: bool,
    pub is_loading_metrics: bool,
    pub last_error: Option<String>,
    /// Sequence number of the newest applied job poll
    last_job_tick: u64,
}

impl AppState {
    pub fn reset_upload(&mut self) {
        self.upload.reset();
    }

    pub fn begin_upload(&mut self) {
        self.upload.begin();
    }

    pub fn update_upload_progress(&mut self, progress: u8) {
        self.upload.set_progress(progress);
    }

    /// Terminal upload transition. The error string is shown to the user as is.
    pub fn apply_upload_result(&mut self, result: Result<&UploadResponse, String>) {
        match result {
            Ok(_) => self.upload.succeed(),
            Err(message) => self.upload.fail(message),
        }
    }

    /// Applies a job poll unless a newer one has already been applied.
    pub fn apply_job_tick(&mut self, seq: u64, active: &ActiveJobs) -> bool {
        if seq <= self.last_job_tick {
            return false;
        }
        self.last_job_tick = seq;
        self.job.apply(active);
        true
    }

    /// One-shot until [`AppState::reset_job`].
    pub fn mark_job_completed(&mut self) -> bool {
        self.job.complete()
    }

    pub fn reset_job(&mut self) {
        self.job.reset();
    }

    pub fn apply_health(&mut self, result: Result<HealthResponse, String>, now: DateTime<Utc>) {
        self.health = match result {
            Ok(response) => ServerHealth::from_response(response, now),
            Err(_) => ServerHealth::unreachable(now),
        };
    }

    pub fn begin_predictions(&mut self) {
        self.is_loading_predictions = true;
        self.last_error = None;
    }

    pub fn set_inverter_predictions(&mut self, inverter: InverterId, predictions: Vec<Prediction>) {
        self.inverter_predictions.insert(inverter, predictions);
    }

    /// Stores the aggregated forecast and refreshes the headline figures.
    pub fn set_daily_production(&mut self, daily: DailyProduction) {
        self.production_metrics = ProductionMetrics::from_daily_total(daily.daily_total());
        self.daily_production = Some(daily);
        self.is_loading_predictions = false;
    }

    /// Keeps `last_error`; metrics load after predictions.
    pub fn begin_metrics(&mut self) {
        self.is_loading_metrics = true;
    }

    pub fn set_inverter_metrics(&mut self, metrics: BTreeMap<InverterId, Option<InverterMetrics>>) {
        self.inverter_metrics = metrics;
        self.is_loading_metrics = false;
    }

    pub fn set_error(&mut self, message: String) {
        self.last_error = Some(message);
        self.is_loading_predictions = false;
        self.is_loading_metrics = false;
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }
}

struct Inner {
    state: RefCell<AppState>,
    listeners: RefCell<Vec<(usize, Callback<AppState>)>>,
    next_listener: Cell<usize>,
    tick_seq: Cell<u64>,
}

/// Shared handle to the application state.
#[derive(Clone)]
pub struct Store {
    inner: Rc<Inner>,
}

/// Returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(usize);

impl Store {
    pub fn new() -> Self {
        Self::with_state(AppState::default())
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(state),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
                tick_seq: Cell::new(0),
            }),
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> AppState {
        self.inner.state.borrow().clone()
    }

    /// Reads the current state without cloning it.
    pub fn with<R>(&self, read: impl FnOnce(&AppState) -> R) -> R {
        read(&self.inner.state.borrow())
    }

    pub fn subscribe(&self, listener: Callback<AppState>) -> SubscriptionId {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, listener));
        SubscriptionId(id)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .listeners
            .borrow_mut()
            .retain(|(listener, _)| *listener != id.0);
    }

    /// Applies `transition` and notifies subscribers when the state changed.
    ///
    /// Listeners run after the borrow is released, so they may read the store
    /// or apply further transitions.
    pub fn update<R>(&self, transition: impl FnOnce(&mut AppState) -> R) -> R {
        let (result, changed) = {
            let mut state = self.inner.state.borrow_mut();
            let before = state.clone();
            let result = transition(&mut state);
            let changed = (*state != before).then(|| state.clone());
            (result, changed)
        };

        if let Some(state) = changed {
            let listeners: Vec<Callback<AppState>> = self
                .inner
                .listeners
                .borrow()
                .iter()
                .map(|(_, listener)| listener.clone())
                .collect();
            for listener in listeners {
                listener.emit(state.clone());
            }
        }

        result
    }

    /// Monotonic sequence number for the next job poll.
    pub fn next_tick_seq(&self) -> u64 {
        let seq = self.inner.tick_seq.get() + 1;
        self.inner.tick_seq.set(seq);
        seq
    }

    pub fn upload_status(&self) -> UploadStatus {
        self.with(|s| s.upload.clone())
    }

    pub fn job_status(&self) -> JobStatus {
        self.with(|s| s.job.clone())
    }

    pub fn server_health(&self) -> ServerHealth {
        self.with(|s| s.health.clone())
    }

    pub fn is_uploading(&self) -> bool {
        self.with(|s| s.upload.is_uploading)
    }

    pub fn reset_upload(&self) {
        self.update(AppState::reset_upload);
    }

    pub fn begin_upload(&self) {
        self.update(AppState::begin_upload);
    }

    pub fn update_upload_progress(&self, progress: u8) {
        self.update(|s| s.update_upload_progress(progress));
    }

    pub fn apply_upload_result(&self, result: Result<&UploadResponse, String>) {
        self.update(|s| s.apply_upload_result(result));
    }

    pub fn apply_job_tick(&self, seq: u64, active: &ActiveJobs) -> bool {
        self.update(|s| s.apply_job_tick(seq, active))
    }

    pub fn mark_job_completed(&self) -> bool {
        self.update(AppState::mark_job_completed)
    }

    pub fn reset_job(&self) {
        self.update(AppState::reset_job);
    }

    pub fn apply_health(&self, result: Result<HealthResponse, String>, now: DateTime<Utc>) {
        self.update(|s| s.apply_health(result, now));
    }

    pub fn set_error(&self, message: String) {
        self.update(|s| s.set_error(message));
    }

    pub fn clear_error(&self) {
        self.update(AppState::clear_error);
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Store {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.inner.state.borrow())
            .field("tick_seq", &self.inner.tick_seq.get())
            .finish()
    }
}
