use crate::models::error::AppError;
use futures::future::{Either, LocalBoxFuture, select};
use gloo_timers::future::TimeoutFuture;
use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

/// Timers and task spawning for the single-threaded event loop.
///
/// The browser implementation sits on `setTimeout` and the microtask queue;
/// tests substitute an executor they can drive step by step.
pub trait Scheduler: Clone + 'static {
    /// Resolves after `ms` milliseconds.
    fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()>;

    /// Runs `task` to completion in the background.
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

/// Scheduler backed by `gloo-timers` and `wasm_bindgen_futures::spawn_local`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()> {
        Box::pin(TimeoutFuture::new(ms))
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

/// Races `operation` against a timer. The operation is polled first, so an
/// already-complete operation always wins.
pub async fn with_timeout<S, F, T>(scheduler: &S, timeout_ms: u32, operation: F) -> Result<T, AppError>
where
    S: Scheduler,
    F: Future<Output = Result<T, AppError>>,
{
    let operation = std::pin::pin!(operation);
    match select(operation, scheduler.sleep(timeout_ms)).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => Err(AppError::Timeout(timeout_ms)),
    }
}

/// Cancellation handle for a background loop.
///
/// Cancellation is cooperative: the loop checks the flag before every store
/// mutation and before sleeping. Cloned handles share the flag.
#[derive(Debug, Clone, Default)]
pub struct TaskHandle {
    cancelled: Rc<Cell<bool>>,
}

impl TaskHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent; safe after the loop has stopped on its own.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

impl PartialEq for TaskHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cancelled, &other.cancelled)
    }
}
