//! Configuration types for the preprocessing session.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic session setup.

use serde::{Deserialize, Serialize};

/// How flagged outlier values are rewritten by `transform_outliers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutlierTransform {
    /// Clamp to `mean ± threshold * std` of the column
    #[default]
    Clamp,
    /// Replace with the median of the non-flagged values
    Median,
}

/// Configuration for a preprocessing session.
///
/// Use [`PreprocessingConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use autoeda_processing::config::{PreprocessingConfig, OutlierTransform};
///
/// let config = PreprocessingConfig::builder()
///     .outlier_z_threshold(2.5)
///     .outlier_transform(OutlierTransform::Median)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Absolute z-score above which a value is flagged as an outlier.
    /// Default: 3.0
    pub outlier_z_threshold: f64,

    /// Rewrite rule used when transforming outliers.
    /// Default: Clamp
    pub outlier_transform: OutlierTransform,

    /// Separator between the source column name and the category in
    /// one-hot indicator names (`city` + `_` + `A` = `city_A`).
    /// Default: "_"
    pub one_hot_separator: String,

    /// Field separator for CSV load and export.
    /// Default: ','
    pub csv_separator: char,

    /// Number of rows scanned for CSV schema inference (None = all rows).
    /// Default: Some(1000)
    pub infer_schema_length: Option<usize>,

    /// Maximum number of entries kept in the session history.
    /// Default: 50
    pub history_limit: usize,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            outlier_z_threshold: 3.0,
            outlier_transform: OutlierTransform::default(),
            one_hot_separator: "_".to_string(),
            csv_separator: ',',
            infer_schema_length: Some(1000),
            history_limit: 50,
        }
    }
}

impl PreprocessingConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PreprocessingConfigBuilder {
        PreprocessingConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.outlier_z_threshold.is_finite() || self.outlier_z_threshold <= 0.0 {
            return Err(ConfigValidationError::InvalidThreshold(
                self.outlier_z_threshold,
            ));
        }

        if self.one_hot_separator.is_empty() {
            return Err(ConfigValidationError::EmptySeparator);
        }

        if !self.csv_separator.is_ascii() || matches!(self.csv_separator, '"' | '\n' | '\r') {
            return Err(ConfigValidationError::InvalidCsvSeparator(self.csv_separator));
        }

        if self.infer_schema_length == Some(0) {
            return Err(ConfigValidationError::InvalidSchemaLength);
        }

        if self.history_limit == 0 {
            return Err(ConfigValidationError::InvalidHistoryLimit);
        }

        Ok(())
    }

    /// The CSV separator as the byte polars expects.
    ///
    /// Only meaningful after [`validate`](Self::validate) has accepted the
    /// config; non-ASCII separators fall back to a comma.
    pub fn csv_separator_byte(&self) -> u8 {
        if self.csv_separator.is_ascii() {
            self.csv_separator as u8
        } else {
            b','
        }
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid outlier z-score threshold: {0} (must be finite and greater than 0)")]
    InvalidThreshold(f64),

    #[error("One-hot separator must not be empty")]
    EmptySeparator,

    #[error("Invalid CSV separator: {0:?} (must be a single ASCII character other than quote or newline)")]
    InvalidCsvSeparator(char),

    #[error("Schema inference length must be at least 1 (use None to scan all rows)")]
    InvalidSchemaLength,

    #[error("History limit must be at least 1")]
    InvalidHistoryLimit,
}

impl From<ConfigValidationError> for crate::error::PreprocessingError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::PreprocessingError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`PreprocessingConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PreprocessingConfigBuilder {
    outlier_z_threshold: Option<f64>,
    outlier_transform: Option<OutlierTransform>,
    one_hot_separator: Option<String>,
    csv_separator: Option<char>,
    infer_schema_length: Option<Option<usize>>,
    history_limit: Option<usize>,
}

impl PreprocessingConfigBuilder {
    /// Set the absolute z-score above which values are flagged.
    pub fn outlier_z_threshold(mut self, threshold: f64) -> Self {
        self.outlier_z_threshold = Some(threshold);
        self
    }

    /// Set the rewrite rule for transformed outliers.
    pub fn outlier_transform(mut self, transform: OutlierTransform) -> Self {
        self.outlier_transform = Some(transform);
        self
    }

    /// Set the separator used in one-hot indicator column names.
    pub fn one_hot_separator(mut self, separator: impl Into<String>) -> Self {
        self.one_hot_separator = Some(separator.into());
        self
    }

    /// Set the CSV field separator.
    pub fn csv_separator(mut self, separator: char) -> Self {
        self.csv_separator = Some(separator);
        self
    }

    /// Set how many rows are scanned for schema inference.
    ///
    /// # Arguments
    /// * `rows` - `Some(n)` to scan the first `n` rows, `None` to scan all
    pub fn infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    /// Set the maximum number of history entries kept by a session.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PreprocessingConfig` or an error if validation fails.
    pub fn build(self) -> Result<PreprocessingConfig, ConfigValidationError> {
        let defaults = PreprocessingConfig::default();
        let config = PreprocessingConfig {
            outlier_z_threshold: self
                .outlier_z_threshold
                .unwrap_or(defaults.outlier_z_threshold),
            outlier_transform: self.outlier_transform.unwrap_or_default(),
            one_hot_separator: self
                .one_hot_separator
                .unwrap_or(defaults.one_hot_separator),
            csv_separator: self.csv_separator.unwrap_or(defaults.csv_separator),
            infer_schema_length: self
                .infer_schema_length
                .unwrap_or(defaults.infer_schema_length),
            history_limit: self.history_limit.unwrap_or(defaults.history_limit),
        };

        config.validate()?;
        Ok(config)
    }
}
