//! Error types for the preprocessing operations.
//!
//! Every transformation returns [`Result`]. A failed operation never touches
//! the session's working copy, so callers can surface the error and carry on.
//!
//! Errors are serializable as `{code, message}` so a frontend can branch on
//! the stable code instead of parsing messages.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for preprocessing operations.
#[derive(Error, Debug)]
pub enum PreprocessingError {
    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Operation requires a different column type.
    #[error("Cannot apply {operation} to column '{column}' of type {dtype}")]
    UnsupportedType {
        column: String,
        dtype: String,
        operation: &'static str,
    },

    /// No valid values found in a column for computation.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// An operation would produce a column name that already exists.
    #[error("Column '{0}' already exists in dataset")]
    DuplicateColumn(String),

    /// Outlier rows were detected against an older version of the dataset.
    #[error(
        "Outlier set for '{column}' was computed at revision {detected}, dataset is at revision {current}"
    )]
    StaleOutlierSet {
        column: String,
        detected: u64,
        current: u64,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The source could not be parsed as a table.
    #[error("Failed to load dataset: {0}")]
    LoadFailed(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PreprocessingError>,
    },
}

impl PreprocessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PreprocessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::UnsupportedType { .. } => "UNSUPPORTED_TYPE",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::DuplicateColumn(_) => "DUPLICATE_COLUMN",
            Self::StaleOutlierSet { .. } => "STALE_OUTLIER_SET",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::LoadFailed(_) => "LOAD_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if the error came from the caller's request rather than from the
    /// data or the environment. These are safe to show as-is and retry.
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::UnsupportedType { .. }
            | Self::NoValidValues(_)
            | Self::DuplicateColumn(_)
            | Self::StaleOutlierSet { .. }
            | Self::ColumnNotFound(_) => true,
            Self::WithContext { source, .. } => source.is_user_error(),
            _ => false,
        }
    }
}

impl Serialize for PreprocessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PreprocessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for preprocessing operations.
pub type Result<T> = std::result::Result<T, PreprocessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PreprocessingError::Polars(e).with_context(context))
    }
}
