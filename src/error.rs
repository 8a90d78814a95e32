#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid GPX: {0}")]
    InvalidGpx(String),
    #[error("Invalid FIT: {0}")]
    InvalidFit(String),
    #[error("No track points found in file")]
    EmptyFile,
    #[error("Track has no timestamps, cannot derive a start time")]
    MissingTimestamps,
    #[error("Unsupported export file: {0}")]
    UnsupportedFile(String),
    #[error("Failed to read export file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("Record is not an object")]
    NotAnObject,
    #[error("Record is missing field {0}")]
    MissingField(&'static str),
    #[error("Unparseable start time: {0}")]
    InvalidTimestamp(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ElevationError {
    #[error("Elevation request failed: {0}")]
    Transport(String),
    #[error("Elevation service returned status {0}")]
    Status(u16),
    #[error("Invalid elevation response: {0}")]
    Malformed(String),
    #[error("Elevation response has {got} results for {expected} points")]
    LengthMismatch { expected: usize, got: usize },
}

impl ElevationError {
    pub fn is_retryable(&self) -> bool {
        match self {
            ElevationError::Transport(_) => true,
            ElevationError::Status(status) => *status == 429 || (500..=599).contains(status),
            ElevationError::Malformed(_) | ElevationError::LengthMismatch { .. } => false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Missing Strava access token")]
    MissingToken,
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Request failed ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cache file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Failed to write {path}: {source}")]
    Output {
        path: String,
        source: std::io::Error,
    },
}
