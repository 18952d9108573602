use serde::Serialize;
use thiserror::Error;

use detect::{ClassifyError, NormalizeError};
use lens_core::friendly_classification_message;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("db error: {0}")]
    Db(#[from] lens_db::DbError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Input(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("Daily scan limit reached. Upgrade to keep scanning today.")]
    QuotaExceeded,
    #[error("{0}")]
    Classification(String),
    #[error("{0}")]
    Message(String),
}

impl From<NormalizeError> for AppError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::Validation(message) => AppError::Validation(message),
            NormalizeError::Fetch(err) => AppError::Input(err.to_string()),
        }
    }
}

impl AppError {
    pub fn classification(err: &ClassifyError) -> AppError {
        AppError::Classification(friendly_classification_message(err.provider_message()))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub severity: &'static str,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let (status, code, severity) = match err {
            AppError::Validation(_) => (400, Some("validation_error"), "error"),
            AppError::InvalidInput(_) => (400, Some("invalid_input"), "error"),
            // Recoverable through the upgrade prompt, not an error toast.
            AppError::QuotaExceeded => (429, Some("quota_exceeded"), "warning"),
            AppError::Input(_) => (502, Some("input_error"), "error"),
            AppError::Classification(_) => (502, Some("classification_error"), "error"),
            AppError::Db(_) | AppError::Io(_) | AppError::Message(_) => (500, None, "error"),
        };
        Self {
            status,
            message: err.to_string(),
            code: code.map(str::to_string),
            severity,
        }
    }
}
