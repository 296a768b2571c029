pub mod file_preview;
pub mod health_badge;
pub mod job_progress;
pub mod metrics_panel;
pub mod series_chart;
pub mod upload_widget;

pub use health_badge::HealthBadge;
pub use metrics_panel::MetricsPanel;
pub use upload_widget::UploadWidget;
