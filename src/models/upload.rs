use serde::{Deserialize, Serialize};

/// Processing flags sent alongside an uploaded production file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOptions {
    pub validate_only: bool,
    pub fetch_weather: bool,
    pub forced: bool,
    pub train_models: bool,
    pub fetch_future_weather: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            validate_only: false,
            fetch_weather: true,
            forced: false,
            train_models: true,
            fetch_future_weather: true,
        }
    }
}

impl UploadOptions {
    /// Multipart form fields in the order the server documents them.
    pub fn form_fields(&self) -> [(&'static str, &'static str); 5] {
        [
            ("validate_only", bool_field(self.validate_only)),
            ("fetch_weather", bool_field(self.fetch_weather)),
            ("forced", bool_field(self.forced)),
            ("train_models", bool_field(self.train_models)),
            ("fetch_future_weather", bool_field(self.fetch_future_weather)),
        ]
    }
}

const fn bool_field(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// A file selected by the user, already read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Decodes the contents as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

/// Body returned by `POST /api/data/upload-txt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub message: String,
}

const fn default_success() -> bool {
    true
}

/// Progress of the most recent upload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadStatus {
    pub is_uploading: bool,
    pub progress: u8,
    pub success: bool,
    pub error: Option<String>,
}

impl UploadStatus {
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }

    pub fn begin(&mut self) {
        *self = Self {
            is_uploading: true,
            ..Self::default()
        };
    }

    pub fn set_progress(&mut self, progress: u8) {
        if self.is_uploading {
            self.progress = progress.min(100);
        }
    }

    pub fn succeed(&mut self) {
        *self = Self {
            progress: 100,
            success: true,
            ..Self::default()
        };
    }

    pub fn fail(&mut self, message: String) {
        *self = Self {
            error: Some(message),
            ..Self::default()
        };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
