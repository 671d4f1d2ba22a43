use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the DCA dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The HTTP request could not be sent or the connection failed.
    #[error("Request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },

    /// The server answered with a non-success status.
    #[error("API error {status} on {endpoint}: {detail}")]
    Api {
        endpoint: String,
        status: u16,
        detail: String,
    },

    /// Registration was rejected because the wallet already has a client.
    #[error("Already registered: {0}")]
    AlreadyRegistered(String),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A time range string is not one of `7d`, `30d`, `90d`, `1y`, `all`.
    #[error("Invalid time range: {0}")]
    InvalidTimeRange(String),

    /// A CSV export could not be written.
    #[error("Failed to write CSV to {path}: {message}")]
    CsvExport { path: PathBuf, message: String },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// `true` for failures worth retrying: no answer, or a 5xx answer.
    pub fn is_transient(&self) -> bool {
        match self {
            DashboardError::Request { .. } => true,
            DashboardError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
