/// Configuration constants for the application
pub struct Config;

impl Config {
    /// API base URL, overridable at build time via `SOLAR_API_BASE_URL`
    pub const API_BASE_URL: &'static str = match option_env!("SOLAR_API_BASE_URL") {
        Some(url) => url,
        None => "http://localhost:8000",
    };

    /// Job status polling interval (2 seconds)
    pub const POLL_INTERVAL_MS: u32 = 2_000;

    /// Server health probe interval (30 seconds)
    pub const HEALTH_CHECK_INTERVAL_MS: u32 = 30_000;

    /// Timeout for JSON requests (health, jobs, predictions, metrics)
    pub const REQUEST_TIMEOUT_MS: u32 = 15_000;

    /// Timeout for the multipart upload request
    pub const UPLOAD_TIMEOUT_MS: u32 = 120_000;

    /// Largest accepted upload (10 MiB)
    pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

    /// Accepted upload file extension
    pub const ACCEPTED_EXTENSION: &'static str = ".txt";

    /// `limit` sent with job status queries
    pub const JOB_QUERY_LIMIT: u32 = 20;

    /// Pause between per-inverter requests
    pub const INVERTER_REQUEST_GAP_MS: u32 = 100;

    /// Forecast resolution requested from the prediction endpoint
    pub const PREDICTION_INTERVAL_MINUTES: u32 = 60;

    /// Rows shown in the upload preview table
    pub const PREVIEW_ROWS: usize = 5;

    /// Delay before a successful upload status is cleared
    pub const UPLOAD_RESET_DELAY_MS: u32 = 5_000;

    /// Delay before a completed job status is cleared
    pub const JOB_RESET_DELAY_MS: u32 = 10_000;

    /// Console log level
    pub const LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
}
