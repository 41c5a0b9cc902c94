use std::io;

/// Represents the different types of errors that can occur while classifying queries.
///
/// Unparseable model output (a confidence that is not a number, an empty label) is
/// never an error: it is absorbed into sentinel defaults. Only failures of the model
/// call itself, bad input and I/O surface here.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// Transport failure while talking to a model backend
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    /// The backend answered with a non-success status
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },
    /// The backend failed in a way that is not tied to HTTP
    #[error("Backend error: {0}")]
    BackendError(String),
    /// A required field is absent from an input record
    #[error("{0}")]
    MissingField(String),
    /// Invalid configuration or input parameters
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ClassifierError {
    /// Builds the error raised when a record lacks the configured text column.
    pub fn missing_column(column: &str) -> Self {
        ClassifierError::MissingField(format!("CSV column '{}' was not found in payload.", column))
    }
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
