#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use futures::channel::oneshot;
    use futures::executor::{LocalPool, LocalSpawner};
    use futures::future::{self, LocalBoxFuture};
    use futures::task::{LocalSpawnExt, noop_waker};
    use solar_dashboard::models::{
        error::{AppError, UploadError},
        health::{HealthResponse, HealthStatus},
        job::{ActiveJobs, Job, JobsResponse},
        prediction::{InverterId, InverterMetrics, Prediction, PredictionFeatures},
        upload::{UploadFile, UploadOptions, UploadResponse},
    };
    use solar_dashboard::services::{
        SolarApi, TaskHandle,
        dashboard::{load_inverter_metrics, load_predictions},
        health::HealthMonitor,
        poller::{JobPoller, PollerSettings, TickOutcome},
        retry::RetryPolicy,
        scheduler::Scheduler,
        upload::UploadCoordinator,
    };
    use solar_dashboard::store::{AppState, Store};
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::future::Future;
    use std::rc::Rc;
    use std::task::{Context, Poll};
    use yew::Callback;

    // Sleeps at or above this length never resolve, so request timeouts only
    // fire when a test configures a short one.
    const NEVER_MS: u32 = 10_000;

    #[derive(Clone)]
    struct TestScheduler {
        spawner: LocalSpawner,
        sleeps: Rc<RefCell<Vec<u32>>>,
    }

    impl TestScheduler {
        fn new(pool: &LocalPool) -> Self {
            Self {
                spawner: pool.spawner(),
                sleeps: Rc::default(),
            }
        }

        fn sleeps_of(&self, ms: u32) -> usize {
            self.sleeps.borrow().iter().filter(|&&s| s == ms).count()
        }
    }

    impl Scheduler for TestScheduler {
        fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()> {
            self.sleeps.borrow_mut().push(ms);
            if ms >= NEVER_MS {
                Box::pin(future::pending())
            } else {
                Box::pin(future::ready(()))
            }
        }

        fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
            self.spawner.spawn_local(task).unwrap();
        }
    }

    #[derive(Default)]
    struct MockApi {
        upload_calls: Cell<usize>,
        job_calls: Cell<usize>,
        health_calls: Cell<usize>,
        prediction_calls: Cell<usize>,
        upload_response: RefCell<Option<Result<UploadResponse, AppError>>>,
        upload_gate: RefCell<Option<oneshot::Receiver<()>>>,
        last_options: Cell<Option<UploadOptions>>,
        job_script: RefCell<VecDeque<Result<JobsResponse, AppError>>>,
        jobs_never_answer: Cell<bool>,
        job_gates: RefCell<VecDeque<oneshot::Receiver<()>>>,
        health_response: RefCell<Option<Result<HealthResponse, AppError>>>,
        failing_inverters: RefCell<Vec<u8>>,
    }

    impl MockApi {
        fn script_jobs(&self, responses: Vec<Result<JobsResponse, AppError>>) {
            *self.job_script.borrow_mut() = responses.into();
        }

        fn gate_upload(&self) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            *self.upload_gate.borrow_mut() = Some(rx);
            tx
        }

        fn gate_job_query(&self) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.job_gates.borrow_mut().push_back(rx);
            tx
        }

        fn fails(&self, inverter: InverterId) -> bool {
            self.failing_inverters.borrow().contains(&inverter.get())
        }
    }

    impl SolarApi for MockApi {
        async fn check_health(&self) -> Result<HealthResponse, AppError> {
            self.health_calls.set(self.health_calls.get() + 1);
            self.health_response
                .borrow()
                .clone()
                .unwrap_or_else(|| Ok(healthy()))
        }

        async fn upload_file(
            &self,
            _file: &UploadFile,
            options: &UploadOptions,
        ) -> Result<UploadResponse, AppError> {
            self.upload_calls.set(self.upload_calls.get() + 1);
            self.last_options.set(Some(*options));

            let gate = self.upload_gate.borrow_mut().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }

            self.upload_response.borrow().clone().unwrap_or_else(|| {
                Ok(UploadResponse {
                    success: true,
                    job_id: Some("abc".to_string()),
                    message: "File uploaded".to_string(),
                })
            })
        }

        async fn fetch_jobs(
            &self,
            _include_history: bool,
            _limit: u32,
        ) -> Result<JobsResponse, AppError> {
            self.job_calls.set(self.job_calls.get() + 1);
            if self.jobs_never_answer.get() {
                future::pending::<()>().await;
            }

            // The response is fixed when the query is issued, not when it settles
            let next = self.job_script.borrow_mut().pop_front();
            let gate = self.job_gates.borrow_mut().pop_front();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            next.unwrap_or_else(|| Ok(JobsResponse::default()))
        }

        async fn fetch_predictions(
            &self,
            inverter: InverterId,
            start: DateTime<Utc>,
            _end: DateTime<Utc>,
            _interval_minutes: u32,
        ) -> Result<Vec<Prediction>, AppError> {
            self.prediction_calls.set(self.prediction_calls.get() + 1);
            if self.fails(inverter) {
                return Err(AppError::Server {
                    status: 500,
                    message: "Model not trained".to_string(),
                });
            }

            Ok((0..24)
                .map(|h| Prediction {
                    prediction_timestamp: start + Duration::hours(h),
                    predicted_power: f64::from(inverter.get()),
                    features: PredictionFeatures {
                        direct_radiation: 100.0,
                    },
                })
                .collect())
        }

        async fn fetch_metrics(&self, inverter: InverterId) -> Result<InverterMetrics, AppError> {
            if self.fails(inverter) {
                return Err(AppError::Network("connection reset".to_string()));
            }
            Ok(InverterMetrics { r2: 0.9, mae: 0.1 })
        }
    }

    fn healthy() -> HealthResponse {
        HealthResponse {
            status: "healthy".to_string(),
            database: Some("connected".to_string()),
            api_version: Some("1.0.0".to_string()),
        }
    }

    fn running(progress: f64, message: &str) -> Result<JobsResponse, AppError> {
        Ok(JobsResponse {
            active_jobs: ActiveJobs {
                total: 1,
                jobs: vec![Job::new(progress, message)],
            },
        })
    }

    fn txt_file(size: usize) -> UploadFile {
        UploadFile::new("production.txt", vec![b'0'; size])
    }

    struct Harness {
        pool: LocalPool,
        api: Rc<MockApi>,
        store: Store,
        scheduler: TestScheduler,
    }

    impl Harness {
        fn new() -> Self {
            let pool = LocalPool::new();
            let scheduler = TestScheduler::new(&pool);
            Self {
                pool,
                api: Rc::new(MockApi::default()),
                store: Store::new(),
                scheduler,
            }
        }

        fn coordinator(&self) -> UploadCoordinator<MockApi, TestScheduler> {
            UploadCoordinator::new(self.api.clone(), self.store.clone(), self.scheduler.clone())
        }

        fn poller(&self, settings: PollerSettings) -> JobPoller<MockApi, TestScheduler> {
            JobPoller::new(self.api.clone(), self.store.clone(), self.scheduler.clone())
                .with_settings(settings)
        }

        fn run<F: Future>(&mut self, fut: F) -> F::Output {
            self.pool.run_until(fut)
        }

        fn settle(&mut self) {
            self.pool.run_until_stalled();
        }
    }

    // Polls once without an executor; used to observe state mid-request.
    fn poll_once<F: Future>(fut: std::pin::Pin<&mut F>) -> Poll<F::Output> {
        let waker = noop_waker();
        fut.poll(&mut Context::from_waker(&waker))
    }

    #[test]
    fn test_oversized_file_never_reaches_network() {
        let mut h = Harness::new();
        let coordinator = h.coordinator();

        let result = h.run(coordinator.submit(
            Some(txt_file(10 * 1024 * 1024 + 1)),
            UploadOptions::default(),
        ));

        assert!(matches!(result, Err(UploadError::FileTooLarge { .. })));
        assert_eq!(h.api.upload_calls.get(), 0);
        assert!(h.store.upload_status().is_idle());
    }

    #[test]
    fn test_wrong_extension_never_reaches_network() {
        let mut h = Harness::new();
        let coordinator = h.coordinator();

        let file = UploadFile::new("production.csv", vec![b'0'; 2048]);
        let result = h.run(coordinator.submit(Some(file), UploadOptions::default()));

        assert!(matches!(
            result,
            Err(UploadError::UnsupportedFileType { .. })
        ));
        assert_eq!(h.api.upload_calls.get(), 0);
    }

    #[test]
    fn test_submit_without_file() {
        let mut h = Harness::new();
        let coordinator = h.coordinator();

        let result = h.run(coordinator.submit(None, UploadOptions::default()));

        assert_eq!(result.unwrap_err(), UploadError::NoFileSelected);
        assert_eq!(h.api.upload_calls.get(), 0);
    }

    #[test]
    fn test_second_submit_while_uploading_is_rejected() {
        let mut h = Harness::new();
        let coordinator = h.coordinator();
        let release = h.api.gate_upload();

        let first = coordinator.submit(Some(txt_file(2048)), UploadOptions::default());
        let mut first = Box::pin(first);
        assert!(poll_once(first.as_mut()).is_pending());
        assert!(h.store.is_uploading());

        let second = h.run(coordinator.submit(Some(txt_file(2048)), UploadOptions::default()));
        assert_eq!(second.unwrap_err(), UploadError::UploadInProgress);

        release.send(()).unwrap();
        let outcome = h.run(first).unwrap();

        assert_eq!(outcome.job_id.as_deref(), Some("abc"));
        assert_eq!(h.api.upload_calls.get(), 1);
    }

    #[test]
    fn test_upload_to_completion() {
        let mut h = Harness::new();
        let coordinator = h.coordinator();
        let release = h.api.gate_upload();

        let submit = coordinator.submit(Some(txt_file(2048)), UploadOptions::default());
        let mut submit = Box::pin(submit);
        assert!(poll_once(submit.as_mut()).is_pending());
        assert!(h.store.upload_status().is_uploading);

        release.send(()).unwrap();
        let outcome = h.run(submit).unwrap();
        assert_eq!(outcome.job_id.as_deref(), Some("abc"));
        assert_eq!(h.api.last_options.get(), Some(UploadOptions::default()));

        let upload = h.store.upload_status();
        assert!(upload.success);
        assert!(!upload.is_uploading);
        assert_eq!(upload.error, None);

        // Server reports nothing running on the first poll
        h.settle();
        let job = h.store.job_status();
        assert!(job.completed);
        assert!(!job.is_monitoring);
        assert_eq!(job.current_progress, 100.0);
        assert!(outcome.monitor.unwrap().is_cancelled());

        h.settle();
        assert_eq!(h.api.job_calls.get(), 1);
    }

    #[test]
    fn test_job_progress_is_reported_until_idle() {
        let mut h = Harness::new();
        h.api.script_jobs(vec![
            running(40.0, "Fetching weather"),
            running(80.0, "Training models"),
        ]);

        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = seen.clone();
            h.store.subscribe(Callback::from(move |state: AppState| {
                seen.borrow_mut().push(state.job.current_progress);
            }));
        }

        let handle = h.poller(PollerSettings::default()).start_monitoring("abc");
        h.settle();

        assert_eq!(h.api.job_calls.get(), 3);
        let mut seen = seen.borrow().clone();
        seen.dedup();
        assert_eq!(seen, vec![40.0, 80.0, 100.0]);
        assert!(h.store.job_status().completed);
        assert!(handle.is_cancelled());
        assert_eq!(h.scheduler.sleeps_of(2_000), 2);
    }

    #[test]
    fn test_stale_poll_does_not_overwrite_newer() {
        let h = Harness::new();
        let older = h.store.next_tick_seq();
        let newer = h.store.next_tick_seq();
        assert!(newer > older);

        let latest = ActiveJobs {
            total: 1,
            jobs: vec![Job::new(80.0, "Training models")],
        };
        let stale = ActiveJobs {
            total: 1,
            jobs: vec![Job::new(40.0, "Fetching weather")],
        };

        assert!(h.store.apply_job_tick(newer, &latest));
        assert!(!h.store.apply_job_tick(older, &stale));

        let job = h.store.job_status();
        assert_eq!(job.current_progress, 80.0);
        assert_eq!(job.last_message, "Training models");
    }

    #[test]
    fn test_late_idle_poll_does_not_complete_running_job() {
        let mut h = Harness::new();
        h.api.script_jobs(vec![
            Ok(JobsResponse::default()),
            running(80.0, "Training models"),
        ]);
        let release_older = h.api.gate_job_query();
        let release_newer = h.api.gate_job_query();
        let poller = h.poller(PollerSettings::default());
        let handle = TaskHandle::new();

        let mut older = Box::pin(poller.tick(&handle));
        assert!(poll_once(older.as_mut()).is_pending());
        let mut newer = Box::pin(poller.tick(&handle));
        assert!(poll_once(newer.as_mut()).is_pending());

        release_newer.send(()).unwrap();
        assert_eq!(h.run(newer), TickOutcome::Active);
        release_older.send(()).unwrap();
        assert_eq!(h.run(older), TickOutcome::Stale);

        let job = h.store.job_status();
        assert!(!job.completed);
        assert!(job.is_monitoring);
        assert_eq!(job.current_progress, 80.0);
        assert_eq!(job.last_message, "Training models");
        assert!(!TickOutcome::Stale.keeps_polling());
    }

    #[test]
    fn test_completion_is_recorded_once() {
        let mut h = Harness::new();
        let poller = h.poller(PollerSettings::default());
        let handle = TaskHandle::new();

        let completions = Rc::new(Cell::new(0));
        {
            let completions = completions.clone();
            let was_completed = Cell::new(false);
            h.store.subscribe(Callback::from(move |state: AppState| {
                if state.job.completed && !was_completed.get() {
                    completions.set(completions.get() + 1);
                }
                was_completed.set(state.job.completed);
            }));
        }

        assert_eq!(h.run(poller.tick(&handle)), TickOutcome::Completed);
        assert_eq!(h.run(poller.tick(&handle)), TickOutcome::Completed);

        assert_eq!(completions.get(), 1);
        assert!(!h.store.mark_job_completed());
        assert_eq!(h.store.job_status().current_progress, 100.0);
    }

    #[test]
    fn test_poll_failure_stops_monitoring() {
        let mut h = Harness::new();
        h.api.script_jobs(vec![
            Err(AppError::Network("connection refused".to_string())),
            running(50.0, "never seen"),
        ]);

        let handle = h.poller(PollerSettings::default()).start_monitoring("abc");
        h.settle();

        assert_eq!(h.api.job_calls.get(), 1);
        assert!(handle.is_cancelled());
        let job = h.store.job_status();
        assert!(!job.completed);
        assert_eq!(job.current_progress, 0.0);
    }

    #[test]
    fn test_poll_retries_transient_errors_when_configured() {
        let mut h = Harness::new();
        h.api.script_jobs(vec![
            Err(AppError::Server {
                status: 503,
                message: "Service unavailable".to_string(),
            }),
            Ok(JobsResponse::default()),
        ]);
        let settings = PollerSettings {
            retry: RetryPolicy::with_backoff(3),
            ..PollerSettings::default()
        };

        let outcome = h.run(h.poller(settings).tick(&TaskHandle::new()));

        assert_eq!(outcome, TickOutcome::Completed);
        assert_eq!(h.api.job_calls.get(), 2);
        assert_eq!(h.scheduler.sleeps_of(500), 1);
    }

    #[test]
    fn test_client_errors_are_not_retried() {
        let mut h = Harness::new();
        h.api.script_jobs(vec![Err(AppError::Server {
            status: 404,
            message: "Not found".to_string(),
        })]);
        let settings = PollerSettings {
            retry: RetryPolicy::with_backoff(3),
            ..PollerSettings::default()
        };

        let outcome = h.run(h.poller(settings).tick(&TaskHandle::new()));

        assert_eq!(outcome, TickOutcome::Failed);
        assert_eq!(h.api.job_calls.get(), 1);
    }

    #[test]
    fn test_unanswered_poll_times_out() {
        let mut h = Harness::new();
        h.api.jobs_never_answer.set(true);
        let settings = PollerSettings {
            request_timeout_ms: 50,
            ..PollerSettings::default()
        };

        let outcome = h.run(h.poller(settings).tick(&TaskHandle::new()));

        assert_eq!(outcome, TickOutcome::Failed);
        assert_eq!(h.scheduler.sleeps_of(50), 1);
        assert!(!h.store.job_status().completed);
    }

    #[test]
    fn test_cancelled_tick_leaves_state_alone() {
        let mut h = Harness::new();
        h.api.script_jobs(vec![running(60.0, "Training models")]);
        let handle = TaskHandle::new();
        handle.cancel();

        let outcome = h.run(h.poller(PollerSettings::default()).tick(&handle));

        assert_eq!(outcome, TickOutcome::Cancelled);
        assert_eq!(h.store.job_status(), Default::default());
    }

    #[test]
    fn test_stop_monitoring_is_idempotent() {
        let mut h = Harness::new();
        let poller = h.poller(PollerSettings::default());

        let handle = poller.start_monitoring("abc");
        poller.stop_monitoring(&handle);
        poller.stop_monitoring(&handle);
        h.settle();

        assert_eq!(h.api.job_calls.get(), 0);
        poller.stop_monitoring(&handle);
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_upload_server_error_is_recorded() {
        let mut h = Harness::new();
        *h.api.upload_response.borrow_mut() = Some(Err(AppError::Server {
            status: 422,
            message: "Invalid file format".to_string(),
        }));
        let coordinator = h.coordinator();

        let result = h.run(coordinator.submit(Some(txt_file(2048)), UploadOptions::default()));
        h.settle();

        assert!(matches!(result, Err(UploadError::Request(_))));
        let upload = h.store.upload_status();
        assert!(!upload.is_uploading);
        assert!(!upload.success);
        assert_eq!(upload.error.as_deref(), Some("Invalid file format"));
        assert_eq!(h.api.job_calls.get(), 0);
    }

    #[test]
    fn test_upload_declined_by_server() {
        let mut h = Harness::new();
        *h.api.upload_response.borrow_mut() = Some(Ok(UploadResponse {
            success: false,
            job_id: None,
            message: "Duplicate data".to_string(),
        }));
        let coordinator = h.coordinator();

        let result = h.run(coordinator.submit(Some(txt_file(2048)), UploadOptions::default()));

        assert_eq!(
            result.unwrap_err(),
            UploadError::Rejected("Duplicate data".to_string())
        );
        assert_eq!(
            h.store.upload_status().error.as_deref(),
            Some("Duplicate data")
        );
    }

    #[test]
    fn test_upload_without_job_does_not_poll() {
        let mut h = Harness::new();
        *h.api.upload_response.borrow_mut() = Some(Ok(UploadResponse {
            success: true,
            job_id: None,
            message: "Validated".to_string(),
        }));
        let coordinator = h.coordinator();
        let options = UploadOptions {
            validate_only: true,
            ..UploadOptions::default()
        };

        let outcome = h.run(coordinator.submit(Some(txt_file(2048)), options)).unwrap();
        h.settle();

        assert!(outcome.monitor.is_none());
        assert!(h.store.upload_status().success);
        assert_eq!(h.api.job_calls.get(), 0);
        assert_eq!(h.api.last_options.get(), Some(options));
    }

    #[test]
    fn test_upload_allowed_again_after_failure() {
        let mut h = Harness::new();
        *h.api.upload_response.borrow_mut() =
            Some(Err(AppError::Network("offline".to_string())));
        let coordinator = h.coordinator();

        assert!(
            h.run(coordinator.submit(Some(txt_file(10)), UploadOptions::default()))
                .is_err()
        );

        *h.api.upload_response.borrow_mut() = None;
        assert!(
            h.run(coordinator.submit(Some(txt_file(10)), UploadOptions::default()))
                .is_ok()
        );
        assert_eq!(h.api.upload_calls.get(), 2);
    }

    #[test]
    fn test_health_server_error() {
        let mut h = Harness::new();
        *h.api.health_response.borrow_mut() = Some(Err(AppError::Server {
            status: 500,
            message: "Internal Server Error".to_string(),
        }));
        let monitor = HealthMonitor::new(h.api.clone(), h.store.clone(), h.scheduler.clone());

        let status = h.run(monitor.probe());

        assert_eq!(status, HealthStatus::Error);
        let health = h.store.server_health();
        assert_eq!(health.status, HealthStatus::Error);
        assert!(health.last_checked.is_some());
        assert!(!health.is_online());
    }

    #[test]
    fn test_health_monitor_probes_immediately() {
        let mut h = Harness::new();
        let monitor = HealthMonitor::new(h.api.clone(), h.store.clone(), h.scheduler.clone());

        let handle = monitor.start();
        h.settle();

        assert_eq!(h.api.health_calls.get(), 1);
        let health = h.store.server_health();
        assert_eq!(health.status, HealthStatus::Healthy);
        assert!(health.is_online());
        assert_eq!(health.api_version.as_deref(), Some("1.0.0"));
        assert_eq!(h.scheduler.sleeps_of(30_000), 1);

        handle.cancel();
    }

    #[test]
    fn test_health_payload_other_than_healthy() {
        let mut h = Harness::new();
        *h.api.health_response.borrow_mut() = Some(Ok(HealthResponse {
            status: "degraded".to_string(),
            database: Some("connected".to_string()),
            api_version: None,
        }));
        let monitor = HealthMonitor::new(h.api.clone(), h.store.clone(), h.scheduler.clone());

        assert_eq!(h.run(monitor.probe()), HealthStatus::Error);
        assert_eq!(h.store.server_health().label(), "Offline");
    }

    #[test]
    fn test_cancelled_health_monitor_stops_probing() {
        let mut h = Harness::new();
        let monitor = HealthMonitor::new(h.api.clone(), h.store.clone(), h.scheduler.clone())
            .with_interval(1_000);

        let handle = monitor.start();
        handle.cancel();
        h.settle();

        assert_eq!(h.api.health_calls.get(), 0);
        assert_eq!(h.store.server_health().status, HealthStatus::Unknown);
    }

    #[test]
    fn test_load_predictions_with_failing_inverter() {
        let mut h = Harness::new();
        h.api.failing_inverters.borrow_mut().push(3);
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

        h.pool
            .run_until(load_predictions(h.api.as_ref(), &h.store, &h.scheduler, now));

        let state = h.store.snapshot();
        assert!(!state.is_loading_predictions);
        assert_eq!(h.api.prediction_calls.get(), 8);
        assert_eq!(state.inverter_predictions.len(), 8);
        let inv3 = InverterId::new(3).unwrap();
        assert!(state.inverter_predictions[&inv3].is_empty());

        // 24 hours of (1 + 2 + ... + 8) minus inverter 3
        let expected_total = 24.0 * (36.0 - 3.0);
        let daily = state.daily_production.unwrap();
        assert_eq!(daily.hourly.len(), 24);
        assert_eq!(daily.daily_total(), expected_total);
        assert_eq!(state.production_metrics.daily_total, expected_total);
        assert_eq!(state.production_metrics.daily_average, expected_total / 24.0);
        assert_eq!(state.production_metrics.monthly_production, expected_total * 30.0);
        assert_eq!(state.last_error, None);
        // No pause after the failed inverter
        assert_eq!(h.scheduler.sleeps_of(100), 7);
    }

    #[test]
    fn test_load_predictions_all_inverters_failing() {
        let mut h = Harness::new();
        h.api.failing_inverters.borrow_mut().extend(1..=8);
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

        h.pool
            .run_until(load_predictions(h.api.as_ref(), &h.store, &h.scheduler, now));

        let state = h.store.snapshot();
        assert!(!state.is_loading_predictions);
        assert_eq!(state.daily_production, None);
        assert_eq!(
            state.last_error.as_deref(),
            Some("Failed to load predictions: Model not trained")
        );
        assert_eq!(h.scheduler.sleeps_of(100), 0);

        // Metrics loading afterwards keeps the message visible
        h.api.failing_inverters.borrow_mut().clear();
        h.pool
            .run_until(load_inverter_metrics(h.api.as_ref(), &h.store, &h.scheduler));
        assert!(h.store.snapshot().last_error.is_some());
    }

    #[test]
    fn test_load_metrics_all_inverters_failing() {
        let mut h = Harness::new();
        h.api.failing_inverters.borrow_mut().extend(1..=8);

        h.pool
            .run_until(load_inverter_metrics(h.api.as_ref(), &h.store, &h.scheduler));

        let state = h.store.snapshot();
        assert!(!state.is_loading_metrics);
        assert_eq!(state.inverter_metrics.len(), 8);
        assert!(state.inverter_metrics.values().all(Option::is_none));
        assert_eq!(
            state.last_error.as_deref(),
            Some("Failed to load model metrics: Network error: connection reset")
        );
    }

    #[test]
    fn test_load_metrics_with_failing_inverter() {
        let mut h = Harness::new();
        h.api.failing_inverters.borrow_mut().push(5);

        h.pool
            .run_until(load_inverter_metrics(h.api.as_ref(), &h.store, &h.scheduler));

        let state = h.store.snapshot();
        assert!(!state.is_loading_metrics);
        assert_eq!(state.inverter_metrics.len(), 8);
        assert_eq!(state.inverter_metrics[&InverterId::new(5).unwrap()], None);
        let inv1 = state.inverter_metrics[&InverterId::new(1).unwrap()].unwrap();
        assert_eq!(inv1.r2_percent(), 90.0);
        assert_eq!(state.last_error, None);
        assert_eq!(h.scheduler.sleeps_of(100), 7);
    }
}
