use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A background job reported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub last_message: String,
    /// Fields this client does not interpret (job id, type, timestamps, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Job {
    pub fn new(progress: f64, last_message: impl Into<String>) -> Self {
        Self {
            progress,
            last_message: last_message.into(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActiveJobs {
    pub total: usize,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

impl ActiveJobs {
    pub const fn is_idle(&self) -> bool {
        self.total == 0
    }
}

/// Body returned by `GET /api/data/jobs`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobsResponse {
    pub active_jobs: ActiveJobs,
}

/// Client-side view of server processing triggered by an upload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobStatus {
    pub active_jobs: Vec<Job>,
    pub is_monitoring: bool,
    pub current_progress: f64,
    pub last_message: String,
    pub completed: bool,
}

impl JobStatus {
    /// Applies a poll result. The first active job drives progress and message.
    pub fn apply(&mut self, active: &ActiveJobs) {
        self.active_jobs = active.jobs.clone();
        self.is_monitoring = active.total > 0;

        if let Some(current) = active.jobs.first() {
            self.current_progress = current.progress.clamp(0.0, 100.0);
            self.last_message = current.last_message.clone();
        }
    }

    /// Returns false if the job was already marked completed.
    pub fn complete(&mut self) -> bool {
        if self.completed {
            return false;
        }
        self.is_monitoring = false;
        self.completed = true;
        self.current_progress = 100.0;
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
