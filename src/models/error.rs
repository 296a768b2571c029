#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0}ms")]
    Timeout(u32),

    /// Non-2xx response. Displays the server's message verbatim.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Data error: {0}")]
    Data(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid inverter id: {0}")]
    InvalidInverter(u8),
}

impl AppError {
    /// Whether retrying the same request could succeed.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Server { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Rejections from the upload coordinator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UploadError {
    #[error("Please select a file.")]
    NoFileSelected,

    #[error("File size is too large ({size} bytes). Maximum is {limit} bytes.")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Unsupported file type: {name}. Please select a .txt file.")]
    UnsupportedFileType { name: String },

    #[error("An upload is already in progress")]
    UploadInProgress,

    /// The server answered but declined the file.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Request(#[from] AppError),
}

impl UploadError {
    /// Local validation failures, raised before any request is made.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NoFileSelected | Self::FileTooLarge { .. } | Self::UnsupportedFileType { .. }
        )
    }
}

/// Problems found while parsing a production file for preview.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreviewError {
    #[error("File is empty")]
    Empty,

    #[error("Line {line}: expected 9 tab-separated columns, found {found}")]
    MissingColumns { line: usize, found: usize },

    #[error("Line {line}: invalid timestamp '{value}' (expected DD/MM/YYYY HH:MM:SS)")]
    InvalidTimestamp { line: usize, value: String },

    #[error("Line {line}, column {column}: invalid number '{value}'")]
    InvalidNumber {
        line: usize,
        column: usize,
        value: String,
    },
}
