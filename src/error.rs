//! Crate-wide error type.
//!
//! Every fallible operation returns `Result<T, AppError>`. The `kind` tells callers
//! which class of failure occurred; the message carries the details.

use thiserror::Error;

/// Classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A record is missing or has a malformed required field.
    InvalidRecord,
    /// The training corpus is too small to fit a stable model.
    InsufficientData,
    /// Prediction was requested before a model was trained or loaded.
    NotTrained,
    /// Forecast horizon outside `[1, 365]`.
    InvalidHorizon,
    /// Percent change is undefined (non-positive current price or empty forecast).
    DivisionUndefined,
    /// The artifact location does not exist.
    NotFound,
    /// The artifact exists but cannot be trusted.
    CorruptArtifact,
    /// A configuration value or environment override is invalid.
    InvalidConfig,
    /// Any other filesystem failure.
    Io,
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRecord, message)
    }

    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsufficientData, message)
    }

    pub fn corrupt_artifact(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CorruptArtifact, message)
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidConfig, message)
    }

    /// Prefix the message with extra context, keeping the kind.
    pub fn context(self, prefix: impl std::fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{prefix}: {}", self.message),
        }
    }
}
