//! Shared utilities for the preprocessing operations.
//!
//! This module contains the helpers every operation leans on: dtype
//! categories, column selection resolution, value extraction and the
//! handful of statistics the transforms need.

use crate::error::{PreprocessingError, Result};
use polars::prelude::*;
use std::collections::HashSet;
use tracing::debug;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for preprocessing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a floating point type (the only ones that can hold NaN).
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// Column Selection Utilities
// =============================================================================

/// Resolve a user selection against the live column list.
///
/// Names missing from `df` are dropped and duplicates collapse onto their
/// first occurrence. The result keeps the selection order.
pub fn resolve_selection<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Vec<String> {
    let live: HashSet<&str> = df
        .get_column_names()
        .into_iter()
        .map(|c| c.as_str())
        .collect();
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(columns.len());

    for name in columns {
        let name = name.as_ref();
        if !live.contains(name) {
            debug!("Ignoring stale selection '{}': column not in dataset", name);
            continue;
        }
        if seen.insert(name) {
            resolved.push(name.to_string());
        }
    }

    resolved
}

/// Column names of `df` as owned strings, in dataset order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|c| c.to_string())
        .collect()
}

/// Fail with [`PreprocessingError::UnsupportedType`] unless every named
/// column is numeric.
pub fn require_numeric(df: &DataFrame, columns: &[String], operation: &'static str) -> Result<()> {
    for name in columns {
        let col = df.column(name)?;
        if !is_numeric_dtype(col.dtype()) {
            return Err(PreprocessingError::UnsupportedType {
                column: name.clone(),
                dtype: format!("{:?}", col.dtype()),
                operation,
            });
        }
    }
    Ok(())
}

/// Fail with [`PreprocessingError::UnsupportedType`] if any named column is
/// numeric.
pub fn require_categorical(
    df: &DataFrame,
    columns: &[String],
    operation: &'static str,
) -> Result<()> {
    for name in columns {
        let col = df.column(name)?;
        if is_numeric_dtype(col.dtype()) {
            return Err(PreprocessingError::UnsupportedType {
                column: name.clone(),
                dtype: format!("{:?}", col.dtype()),
                operation,
            });
        }
    }
    Ok(())
}

// =============================================================================
// Value Extraction Utilities
// =============================================================================

/// Extract a numeric Series as `f64` values. Nulls and NaN both come back as `None`.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    let values = float_series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Extract any Series as its string representation. Nulls stay `None`.
pub fn string_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let str_series = series.cast(&DataType::String)?;
    let values = str_series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

/// Per-row missing flags: null, or NaN for float columns.
pub fn missing_mask(series: &Series) -> PolarsResult<Vec<bool>> {
    if is_float_dtype(series.dtype()) {
        Ok(numeric_values(series)?
            .into_iter()
            .map(|v| v.is_none())
            .collect())
    } else {
        let nulls = series.is_null();
        let mask = nulls.into_iter().map(|v| v.unwrap_or(false)).collect();
        Ok(mask)
    }
}

/// Build a `Float64` Series from optional values.
pub fn float_series(name: &str, values: Vec<Option<f64>>) -> Series {
    Series::new(name.into(), values)
}

// =============================================================================
// Statistics Utilities
// =============================================================================

/// Location and spread of the non-missing values of a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation (ddof = 0).
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl Moments {
    /// Compute moments over the present values, or `None` if there are none.
    pub fn from_values(values: &[Option<f64>]) -> Option<Self> {
        let present = present_series(values);
        let mean = present.mean()?;

        let n = present.len() as f64;
        let floats = present.f64().ok()?;
        let variance = floats
            .into_no_null_iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / n;
        let min = floats.into_no_null_iter().fold(f64::INFINITY, f64::min);
        let max = floats.into_no_null_iter().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            count: present.len(),
            mean,
            std: variance.sqrt(),
            min,
            max,
        })
    }

    /// True when every present value is identical.
    ///
    /// Checked through min/max rather than `std == 0.0`: summation error can
    /// leave a tiny non-zero std on a constant column like `[0.1, 0.1, 0.1]`.
    pub fn is_constant(&self) -> bool {
        self.min == self.max
    }

    /// True when z-scores are defined: the values differ and the population
    /// std is a positive finite number. Distinct values whose squared
    /// deviations underflow still have a zero std.
    pub fn has_spread(&self) -> bool {
        !self.is_constant() && self.std > 0.0 && self.std.is_finite()
    }
}

/// Present values as a `Float64` Series with no nulls.
fn present_series(values: &[Option<f64>]) -> Series {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    Series::new("present".into(), present)
}

/// Median of the present values; even counts average the two middle values.
pub fn median(values: &[Option<f64>]) -> Option<f64> {
    present_series(values).median()
}

/// Most frequent present value. Ties go to the smallest value.
pub fn mode(values: &[Option<f64>]) -> Option<f64> {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(f64::total_cmp);

    let mut best = present[0];
    let mut best_count = 0;
    let mut run_start = 0;
    for i in 1..=present.len() {
        if i == present.len() || present[i] != present[run_start] {
            let run_len = i - run_start;
            // strictly greater keeps the earliest (smallest) value on ties
            if run_len > best_count {
                best = present[run_start];
                best_count = run_len;
            }
            run_start = i;
        }
    }

    Some(best)
}

// =============================================================================
// Tests
// =============================================================================
