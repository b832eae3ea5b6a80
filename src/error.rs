use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("File '{filename}' not found")]
    NotFound { filename: String },

    #[error("File '{filename}' is empty")]
    EmptyFile { filename: String },

    #[error("Invalid column '{column}' for '{filename}': {reason}")]
    InvalidColumn {
        filename: String,
        column: String,
        reason: String,
    },

    #[error("Failed to decode '{filename}': {reason}")]
    Decode { filename: String, reason: String },

    #[error("Analysis of '{filename}' was cancelled")]
    Cancelled { filename: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    EmptyFile,
    InvalidColumn,
    Decode,
    Cancelled,
    Internal,
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::NotFound { .. } => ErrorKind::NotFound,
            AnalysisError::EmptyFile { .. } => ErrorKind::EmptyFile,
            AnalysisError::InvalidColumn { .. } => ErrorKind::InvalidColumn,
            AnalysisError::Decode { .. } => ErrorKind::Decode,
            AnalysisError::Cancelled { .. } => ErrorKind::Cancelled,
            AnalysisError::Io(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::EmptyFile | ErrorKind::InvalidColumn => 400,
            ErrorKind::Decode => 422,
            ErrorKind::Cancelled => 499,
            ErrorKind::Internal => 500,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            kind: self.kind(),
            status: self.status_code(),
            detail: self.to_string(),
        }
    }

    pub(crate) fn invalid_column(
        filename: &str,
        column: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        AnalysisError::InvalidColumn {
            filename: filename.to_string(),
            column: column.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn decode(filename: &str, reason: impl Into<String>) -> Self {
        AnalysisError::Decode {
            filename: filename.to_string(),
            reason: reason.into(),
        }
    }
}

/// JSON body for a failed request.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub status: u16,
    pub detail: String,
}
