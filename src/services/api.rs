use crate::config::Config;
use crate::models::{
    error::AppError,
    health::HealthResponse,
    job::JobsResponse,
    prediction::{InverterId, InverterMetrics, MetricsResponse, Prediction},
    upload::{UploadFile, UploadOptions, UploadResponse},
};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// Operations offered by the remote prediction service.
///
/// [`SolarClient`] is the HTTP implementation; the coordinator and pollers are
/// generic over this trait so they can be driven without a network.
#[allow(async_fn_in_trait)]
pub trait SolarApi {
    /// `GET /health`
    async fn check_health(&self) -> Result<HealthResponse, AppError>;

    /// `POST /api/data/upload-txt`
    async fn upload_file(
        &self,
        file: &UploadFile,
        options: &UploadOptions,
    ) -> Result<UploadResponse, AppError>;

    /// `GET /api/data/jobs`
    async fn fetch_jobs(&self, include_history: bool, limit: u32)
    -> Result<JobsResponse, AppError>;

    /// `POST /api/models/predict-bulk` for a single inverter
    async fn fetch_predictions(
        &self,
        inverter: InverterId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval_minutes: u32,
    ) -> Result<Vec<Prediction>, AppError>;

    /// `GET /api/models/metrics/{id}`
    async fn fetch_metrics(&self, inverter: InverterId) -> Result<InverterMetrics, AppError>;
}

// API CONFIGURATION
/// Configuration for the prediction API client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    /// Creates a builder for constructing an `ApiConfig`.
    pub fn builder() -> ApiConfigBuilder {
        ApiConfigBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }

    pub fn upload_url(&self) -> String {
        format!("{}/api/data/upload-txt", self.base_url)
    }

    pub fn jobs_url(&self, include_history: bool, limit: u32) -> String {
        format!(
            "{}/api/data/jobs?include_history={include_history}&limit={limit}",
            self.base_url
        )
    }

    /// Bulk prediction URL. Timestamps are RFC3339 with milliseconds, percent-encoded.
    pub fn predict_url(
        &self,
        inverter: InverterId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval_minutes: u32,
    ) -> Result<Url, AppError> {
        let base = format!("{}/api/models/predict-bulk", self.base_url);
        Url::parse_with_params(
            &base,
            &[
                ("inverter_ids", inverter.get().to_string()),
                ("start_time", start.to_rfc3339_opts(SecondsFormat::Millis, true)),
                ("end_time", end.to_rfc3339_opts(SecondsFormat::Millis, true)),
                ("interval_minutes", interval_minutes.to_string()),
            ],
        )
        .map_err(|e| AppError::Config(format!("Invalid prediction URL {base}: {e}")))
    }

    pub fn metrics_url(&self, inverter: InverterId) -> String {
        format!("{}/api/models/metrics/{}", self.base_url, inverter.get())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Config::API_BASE_URL.trim_end_matches('/').to_string(),
        }
    }
}

// API CONFIGURATION BUILDER
/// Builder for constructing an `ApiConfig` with custom settings.
#[derive(Debug, Default)]
pub struct ApiConfigBuilder {
    base_url: Option<String>,
}

impl ApiConfigBuilder {
    /// Sets a custom base URL (trailing slashes are dropped).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the `ApiConfig`, rejecting base URLs that do not parse.
    pub fn build(self) -> Result<ApiConfig, AppError> {
        let Some(base_url) = self.base_url else {
            return Ok(ApiConfig::default());
        };

        let base_url = base_url.trim().trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| AppError::Config(format!("Invalid base URL '{base_url}': {e}")))?;

        Ok(ApiConfig { base_url })
    }
}

// SOLAR CLIENT
/// HTTP client for the solar prediction API.
#[derive(Debug, Clone)]
pub struct SolarClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl SolarClient {
    /// Creates a new client with default configuration.
    pub fn new() -> Result<Self, AppError> {
        Self::with_config(ApiConfig::default())
    }

    /// Creates a new client with the specified configuration.
    pub fn with_config(config: ApiConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Returns a reference to the client's configuration.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(Self::classify_error)?;

        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_status(status.as_u16(), &body));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Data(format!("Failed to parse response: {e}")))
    }

    /// Converts a reqwest transport error into an `AppError`.
    ///
    /// Request deadlines are enforced by the caller's timer, which reports
    /// `AppError::Timeout`, so no client-side timeout case exists here.
    fn classify_error(error: reqwest::Error) -> AppError {
        if error.is_builder() {
            AppError::Config(format!("Invalid request: {error}"))
        } else if error.is_request() {
            AppError::Network(format!("request failed: {error}"))
        } else {
            AppError::Network(error.to_string())
        }
    }
}

impl SolarApi for SolarClient {
    async fn check_health(&self) -> Result<HealthResponse, AppError> {
        self.get_json(&self.config.health_url()).await
    }

    async fn upload_file(
        &self,
        file: &UploadFile,
        options: &UploadOptions,
    ) -> Result<UploadResponse, AppError> {
        let part = Part::bytes(file.data.clone()).file_name(file.name.clone());
        let form = options
            .form_fields()
            .into_iter()
            .fold(Form::new().part("file", part), |form, (name, value)| {
                form.text(name, value)
            });

        let response = self
            .http
            .post(self.config.upload_url())
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(Self::classify_error)?;

        Self::read_json(response).await
    }

    async fn fetch_jobs(
        &self,
        include_history: bool,
        limit: u32,
    ) -> Result<JobsResponse, AppError> {
        self.get_json(&self.config.jobs_url(include_history, limit))
            .await
    }

    async fn fetch_predictions(
        &self,
        inverter: InverterId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval_minutes: u32,
    ) -> Result<Vec<Prediction>, AppError> {
        let url = self
            .config
            .predict_url(inverter, start, end, interval_minutes)?;

        let response = self
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .body("")
            .send()
            .await
            .map_err(Self::classify_error)?;

        let mut by_inverter: HashMap<String, Vec<Prediction>> = Self::read_json(response).await?;
        Ok(by_inverter
            .remove(&inverter.get().to_string())
            .unwrap_or_default())
    }

    async fn fetch_metrics(&self, inverter: InverterId) -> Result<InverterMetrics, AppError> {
        let response: MetricsResponse = self.get_json(&self.config.metrics_url(inverter)).await?;
        Ok(response.metrics)
    }
}

/// Builds the error for a non-2xx response, keeping the server's own message.
///
/// The message is taken from a JSON `message` or `detail` field, then from the
/// raw body, and falls back to the status line.
pub fn error_for_status(status: u16, body: &str) -> AppError {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "detail", "error"]
                .iter()
                .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(str::to_string))
        });

    let message = from_json
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| format!("Request failed with status {status}"));

    AppError::Server { status, message }
}
