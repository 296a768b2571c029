use super::api::SolarApi;
use super::poller::JobPoller;
use super::scheduler::{Scheduler, TaskHandle, with_timeout};
use crate::config::Config;
use crate::models::{
    error::{PreviewError, UploadError},
    production::{ProductionFile, parse_production_file},
    upload::{UploadFile, UploadOptions},
};
use crate::store::Store;
use std::cell::Cell;
use std::rc::Rc;

/// What a successful upload produced.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    pub job_id: Option<String>,
    pub message: String,
    /// Present when the server started background work for this upload.
    pub monitor: Option<TaskHandle>,
}

/// Checks a selection before anything is sent.
pub fn validate_file(file: Option<&UploadFile>) -> Result<&UploadFile, UploadError> {
    let file = file.ok_or(UploadError::NoFileSelected)?;

    if file.size() > Config::MAX_UPLOAD_BYTES {
        return Err(UploadError::FileTooLarge {
            size: file.size(),
            limit: Config::MAX_UPLOAD_BYTES,
        });
    }

    if !file.name.ends_with(Config::ACCEPTED_EXTENSION) {
        return Err(UploadError::UnsupportedFileType {
            name: file.name.clone(),
        });
    }

    Ok(file)
}

/// Parses the selected file for the preview table and chart.
pub fn preview_file(file: &UploadFile) -> Result<ProductionFile, PreviewError> {
    parse_production_file(&file.text())
}

/// Validates and uploads production files, then hands the resulting job to
/// the [`JobPoller`].
pub struct UploadCoordinator<A, S> {
    api: Rc<A>,
    store: Store,
    scheduler: S,
    poller: JobPoller<A, S>,
    timeout_ms: u32,
    in_flight: Rc<Cell<bool>>,
}

impl<A, S: Clone> Clone for UploadCoordinator<A, S> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            store: self.store.clone(),
            scheduler: self.scheduler.clone(),
            poller: self.poller.clone(),
            timeout_ms: self.timeout_ms,
            in_flight: self.in_flight.clone(),
        }
    }
}

impl<A, S> UploadCoordinator<A, S>
where
    A: SolarApi + 'static,
    S: Scheduler,
{
    pub fn new(api: Rc<A>, store: Store, scheduler: S) -> Self {
        let poller = JobPoller::new(api.clone(), store.clone(), scheduler.clone());
        Self::with_poller(api, store, scheduler, poller)
    }

    pub fn with_poller(api: Rc<A>, store: Store, scheduler: S, poller: JobPoller<A, S>) -> Self {
        Self {
            api,
            store,
            scheduler,
            poller,
            timeout_ms: Config::UPLOAD_TIMEOUT_MS,
            in_flight: Rc::new(Cell::new(false)),
        }
    }

    pub fn poller(&self) -> &JobPoller<A, S> {
        &self.poller
    }

    /// Uploads `file` with `options`.
    ///
    /// Validation and the in-flight check complete before the first await, so
    /// a rejected call never reaches the network. On success the upload status
    /// moves to `success` and, if the server returned a job id, monitoring
    /// starts. Failures are recorded in the upload status and not retried.
    pub async fn submit(
        &self,
        file: Option<UploadFile>,
        options: UploadOptions,
    ) -> Result<UploadOutcome, UploadError> {
        let file = validate_file(file.as_ref())?;

        if self.in_flight.get() || self.store.is_uploading() {
            return Err(UploadError::UploadInProgress);
        }

        let guard = InFlight::enter(&self.in_flight);
        self.store.begin_upload();
        log::info!("Uploading {} ({} bytes)", file.name, file.size());

        let result = with_timeout(
            &self.scheduler,
            self.timeout_ms,
            self.api.upload_file(file, &options),
        )
        .await;
        drop(guard);

        let response = match result {
            Ok(response) if response.success => response,
            Ok(response) => {
                log::warn!("Upload rejected: {}", response.message);
                self.store.apply_upload_result(Err(response.message.clone()));
                return Err(UploadError::Rejected(response.message));
            }
            Err(e) => {
                log::error!("File upload error: {e}");
                self.store.apply_upload_result(Err(e.to_string()));
                return Err(e.into());
            }
        };

        self.store.apply_upload_result(Ok(&response));
        let monitor = response
            .job_id
            .as_deref()
            .map(|job_id| self.poller.start_monitoring(job_id));

        Ok(UploadOutcome {
            job_id: response.job_id,
            message: response.message,
            monitor,
        })
    }
}

/// Clears the coordinator's in-flight flag when the request settles or the
/// submit future is dropped.
struct InFlight<'a>(&'a Cell<bool>);

impl<'a> InFlight<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
