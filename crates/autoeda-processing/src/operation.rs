//! Serializable descriptions of preprocessing operations.
//!
//! An [`Operation`] is what a dashboard action or recipe entry turns into.
//! It can be applied to any frame without a session, which is how the
//! session itself runs them.

use crate::config::{OutlierTransform, PreprocessingConfig};
use crate::error::{Result, ResultExt};
use crate::transforms::{self, FillMethod};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One transformation of the working dataset.
///
/// Serialized with an `op` tag, e.g.
/// `{"op": "fill_missing", "columns": ["age"], "method": "median"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    RemoveColumns {
        columns: Vec<String>,
    },
    RemoveRowsWithMissing {
        columns: Vec<String>,
    },
    FillMissing {
        columns: Vec<String>,
        #[serde(default)]
        method: FillMethod,
    },
    OneHotEncode {
        columns: Vec<String>,
    },
    LabelEncode {
        columns: Vec<String>,
    },
    Standardize {
        columns: Vec<String>,
    },
    MinMaxScale {
        columns: Vec<String>,
    },
    /// Detect outliers in `column` with the configured threshold and drop
    /// their rows.
    RemoveOutliers {
        column: String,
    },
    /// Detect outliers in `column` with the configured threshold and rewrite
    /// them. `method` overrides the configured transform.
    TransformOutliers {
        column: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<OutlierTransform>,
    },
}

impl Operation {
    /// Short snake_case name, matching the serialized `op` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::RemoveColumns { .. } => "remove_columns",
            Operation::RemoveRowsWithMissing { .. } => "remove_rows_with_missing",
            Operation::FillMissing { .. } => "fill_missing",
            Operation::OneHotEncode { .. } => "one_hot_encode",
            Operation::LabelEncode { .. } => "label_encode",
            Operation::Standardize { .. } => "standardize",
            Operation::MinMaxScale { .. } => "min_max_scale",
            Operation::RemoveOutliers { .. } => "remove_outliers",
            Operation::TransformOutliers { .. } => "transform_outliers",
        }
    }

    /// Run the operation against `df`, returning the transformed frame.
    pub fn apply(&self, df: &DataFrame, config: &PreprocessingConfig) -> Result<DataFrame> {
        match self {
            Operation::RemoveColumns { columns } => transforms::remove_columns(df, columns),
            Operation::RemoveRowsWithMissing { columns } => {
                transforms::remove_rows_with_missing(df, columns)
            }
            Operation::FillMissing { columns, method } => {
                transforms::fill_missing(df, columns, *method)
            }
            Operation::OneHotEncode { columns } => {
                transforms::one_hot_encode(df, columns, &config.one_hot_separator)
            }
            Operation::LabelEncode { columns } => transforms::label_encode(df, columns),
            Operation::Standardize { columns } => transforms::standardize(df, columns),
            Operation::MinMaxScale { columns } => transforms::min_max_scale(df, columns),
            Operation::RemoveOutliers { column } => {
                let set = transforms::detect_outliers(df, column, config.outlier_z_threshold)?;
                transforms::remove_outliers(df, column, &set.rows)
            }
            Operation::TransformOutliers { column, method } => {
                let set = transforms::detect_outliers(df, column, config.outlier_z_threshold)?;
                transforms::transform_outliers(
                    df,
                    column,
                    &set.rows,
                    set.threshold,
                    method.unwrap_or(config.outlier_transform),
                )
            }
        }
    }
}

/// An ordered list of operations, stored as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipe {
    pub operations: Vec<Operation>,
}

impl Recipe {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(crate::error::PreprocessingError::from)
            .context(format!("Reading recipe {}", path.display()))?;
        Self::from_json(&json).context(format!("Parsing recipe {}", path.display()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
