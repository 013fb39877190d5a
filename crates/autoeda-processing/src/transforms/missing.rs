//! Missing-data handling.
//!
//! Two mutually exclusive strategies: drop the rows that have a gap in any
//! selected column, or fill each selected numeric column with a statistic of
//! its own present values. A value counts as missing when it is null, or NaN
//! in a float column.

use crate::error::{PreprocessingError, Result};
use crate::utils::{
    Moments, float_series, median, missing_mask, mode, numeric_values, require_numeric,
    resolve_selection,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Statistic used to fill missing numeric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FillMethod {
    /// Arithmetic mean of the present values
    #[default]
    Mean,
    /// Middle value; the average of the two middle values for even counts
    Median,
    /// Most frequent value; ties go to the smallest
    Mode,
}

impl fmt::Display for FillMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FillMethod::Mean => "mean",
            FillMethod::Median => "median",
            FillMethod::Mode => "mode",
        };
        f.write_str(name)
    }
}

impl FillMethod {
    fn compute(self, values: &[Option<f64>]) -> Option<f64> {
        match self {
            FillMethod::Mean => Moments::from_values(values).map(|m| m.mean),
            FillMethod::Median => median(values),
            FillMethod::Mode => mode(values),
        }
    }
}

/// Drop every row with a missing value in any of `columns`.
///
/// An empty selection drops nothing; it does not mean "all columns".
pub fn remove_rows_with_missing<S: AsRef<str>>(
    df: &DataFrame,
    columns: &[S],
) -> Result<DataFrame> {
    let selected = resolve_selection(df, columns);
    if selected.is_empty() {
        return Ok(df.clone());
    }

    let mut keep = vec![true; df.height()];
    for name in &selected {
        let series = df.column(name)?.as_materialized_series();
        for (row, missing) in missing_mask(series)?.into_iter().enumerate() {
            if missing {
                keep[row] = false;
            }
        }
    }

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    let filtered = df.filter(&mask)?;

    info!(
        "Removed {} rows with missing values in {:?}",
        df.height() - filtered.height(),
        selected
    );
    Ok(filtered)
}

/// Fill missing values of the selected numeric columns with `method`.
///
/// Each column is filled from its own present values and becomes `Float64`.
/// Columns without gaps are left exactly as they were. A column with no
/// present values rejects the whole call with
/// [`PreprocessingError::NoValidValues`], leaving the input as the only copy.
pub fn fill_missing<S: AsRef<str>>(
    df: &DataFrame,
    columns: &[S],
    method: FillMethod,
) -> Result<DataFrame> {
    let selected = resolve_selection(df, columns);
    require_numeric(df, &selected, "fill_missing")?;

    let mut filled_df = df.clone();
    for name in &selected {
        let series = df.column(name)?.as_materialized_series();
        let values = numeric_values(series)?;
        let missing = values.iter().filter(|v| v.is_none()).count();
        if missing == 0 {
            debug!("'{}' has no missing values, skipping", name);
            continue;
        }

        let fill_value = method
            .compute(&values)
            .ok_or_else(|| PreprocessingError::NoValidValues(name.clone()))?;

        let filled: Vec<Option<f64>> = values
            .into_iter()
            .map(|v| Some(v.unwrap_or(fill_value)))
            .collect();
        filled_df.replace(name, float_series(name, filled))?;

        info!(
            "Filled {} missing values in '{}' with {}: {:.4}",
            missing, name, method, fill_value
        );
    }

    Ok(filled_df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f64_at(df: &DataFrame, col: &str, row: usize) -> f64 {
        df.column(col)
            .unwrap()
            .get(row)
            .unwrap()
            .try_extract::<f64>()
            .unwrap()
    }

    // ========================================================================
    // remove_rows_with_missing() tests
    // ========================================================================

    #[test]
    fn test_remove_rows_any_selected_column() {
        let df = df![
            "a" => [Some(1.0), None, Some(3.0), Some(4.0)],
            "b" => [Some("x"), Some("y"), None, Some("z")],
            "c" => [Option::<i64>::None, Some(2), Some(3), Some(4)],
        ]
        .unwrap();

        let result = remove_rows_with_missing(&df, &["a", "b"]).unwrap();

        // rows 1 and 2 dropped; row 0 kept since "c" is not selected
        assert_eq!(result.height(), 2);
        assert_eq!(f64_at(&result, "a", 0), 1.0);
        assert_eq!(f64_at(&result, "a", 1), 4.0);
        assert_eq!(df.height(), 4);
    }

    #[test]
    fn test_remove_rows_empty_selection_is_noop() {
        let df = df![
            "a" => [Some(1.0), None],
        ]
        .unwrap();

        let empty: [&str; 0] = [];
        let result = remove_rows_with_missing(&df, &empty).unwrap();
        assert_eq!(result.height(), 2);
    }

    #[test]
    fn test_remove_rows_treats_nan_as_missing() {
        let df = df![
            "a" => [1.0, f64::NAN, 3.0],
        ]
        .unwrap();

        let result = remove_rows_with_missing(&df, &["a"]).unwrap();
        assert_eq!(result.height(), 2);
    }

    #[test]
    fn test_remove_rows_stale_column_ignored() {
        let df = df![
            "a" => [Some(1.0), None],
        ]
        .unwrap();

        let result = remove_rows_with_missing(&df, &["gone"]).unwrap();
        assert_eq!(result.height(), 2);
    }

    // ========================================================================
    // fill_missing() tests
    // ========================================================================

    #[test]
    fn test_fill_mean() {
        let df = df![
            "values" => [Some(1.0), None, Some(5.0)],
        ]
        .unwrap();

        let result = fill_missing(&df, &["values"], FillMethod::Mean).unwrap();
        let values = result.column("values").unwrap();
        assert_eq!(values.null_count(), 0);
        assert_eq!(f64_at(&result, "values", 1), 3.0);

        // the input still has its gap
        assert_eq!(df.column("values").unwrap().null_count(), 1);
    }

    #[test]
    fn test_fill_median_even_count() {
        let df = df![
            "values" => [Some(1.0), None, Some(2.0), Some(10.0), Some(4.0)],
        ]
        .unwrap();

        let result = fill_missing(&df, &["values"], FillMethod::Median).unwrap();
        // median of [1, 2, 4, 10] = 3
        assert_eq!(f64_at(&result, "values", 1), 3.0);
    }

    #[test]
    fn test_fill_mode_tie_takes_smallest() {
        let df = df![
            "values" => [Some(7i64), Some(2), None, Some(7), Some(2)],
        ]
        .unwrap();

        let result = fill_missing(&df, &["values"], FillMethod::Mode).unwrap();
        assert_eq!(f64_at(&result, "values", 2), 2.0);
        assert!(matches!(
            result.column("values").unwrap().dtype(),
            DataType::Float64
        ));
    }

    #[test]
    fn test_fill_columns_independently() {
        let df = df![
            "a" => [Some(1.0), None, Some(3.0)],
            "b" => [None, Some(10.0), Some(20.0)],
        ]
        .unwrap();

        let result = fill_missing(&df, &["a", "b"], FillMethod::Mean).unwrap();
        assert_eq!(f64_at(&result, "a", 1), 2.0);
        assert_eq!(f64_at(&result, "b", 0), 15.0);
    }

    #[test]
    fn test_fill_column_without_gaps_untouched() {
        let df = df![
            "ints" => [1i64, 2, 3],
        ]
        .unwrap();

        let result = fill_missing(&df, &["ints"], FillMethod::Mean).unwrap();
        assert!(matches!(
            result.column("ints").unwrap().dtype(),
            DataType::Int64
        ));
    }

    #[test]
    fn test_fill_all_missing_rejected() {
        let df = df![
            "ok" => [Some(1.0), None],
            "empty" => [Option::<f64>::None, None],
        ]
        .unwrap();

        let err = fill_missing(&df, &["ok", "empty"], FillMethod::Median).unwrap_err();
        assert!(matches!(err, PreprocessingError::NoValidValues(ref c) if c == "empty"));
    }

    #[test]
    fn test_fill_rejects_non_numeric() {
        let df = df![
            "city" => [Some("A"), None],
        ]
        .unwrap();

        let err = fill_missing(&df, &["city"], FillMethod::Mode).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_TYPE");
    }

    #[test]
    fn test_fill_method_serde_names() {
        let json = serde_json::to_string(&FillMethod::Median).unwrap();
        assert_eq!(json, "\"median\"");
        let parsed: FillMethod = serde_json::from_str("\"mode\"").unwrap();
        assert_eq!(parsed, FillMethod::Mode);
    }
}
