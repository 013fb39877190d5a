//! Z-score outlier detection and treatment.
//!
//! Detection is read-only and returns an [`OutlierSet`] of row indices.
//! Treatments take those indices back and either drop the rows or rewrite
//! the flagged values in place.

use crate::config::OutlierTransform;
use crate::error::{PreprocessingError, Result};
use crate::types::OutlierSet;
use crate::utils::{Moments, float_series, median, numeric_values, require_numeric};
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info};

fn numeric_column(df: &DataFrame, column: &str, operation: &'static str) -> Result<Vec<Option<f64>>> {
    if df.get_column_index(column).is_none() {
        return Err(PreprocessingError::ColumnNotFound(column.to_string()));
    }
    require_numeric(df, &[column.to_string()], operation)?;
    Ok(numeric_values(df.column(column)?.as_materialized_series())?)
}

/// Flag every row of `column` whose z-score magnitude exceeds `threshold`.
///
/// Uses the mean and population standard deviation of the present values.
/// Missing values are never flagged. A column with fewer than two present
/// values, or with no spread, has no outliers.
pub fn detect_outliers(df: &DataFrame, column: &str, threshold: f64) -> Result<OutlierSet> {
    let values = numeric_column(df, column, "detect_outliers")?;

    let mut rows = Vec::new();
    if let Some(moments) = Moments::from_values(&values)
        && moments.count >= 2
        && moments.has_spread()
    {
        for (row, value) in values.iter().enumerate() {
            if let Some(x) = value
                && ((x - moments.mean) / moments.std).abs() > threshold
            {
                rows.push(row);
            }
        }
        debug!(
            "'{}': mean={:.4}, std={:.4}, {} rows beyond |z| > {}",
            column,
            moments.mean,
            moments.std,
            rows.len(),
            threshold
        );
    } else {
        debug!("'{}': not enough spread for z-scores", column);
    }

    Ok(OutlierSet {
        column: column.to_string(),
        rows,
        threshold,
        revision: 0,
    })
}

/// Drop exactly the rows listed in `rows`. Indices past the end are ignored.
pub fn remove_outliers(df: &DataFrame, column: &str, rows: &[usize]) -> Result<DataFrame> {
    if df.get_column_index(column).is_none() {
        return Err(PreprocessingError::ColumnNotFound(column.to_string()));
    }

    let mut keep = vec![true; df.height()];
    for &row in rows {
        if let Some(flag) = keep.get_mut(row) {
            *flag = false;
        }
    }

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    let filtered = df.filter(&mask)?;

    info!(
        "Removed {} outlier rows flagged in '{}'",
        df.height() - filtered.height(),
        column
    );
    Ok(filtered)
}

/// Rewrite the flagged values of `column`, keeping every row.
///
/// [`OutlierTransform::Clamp`] pulls each flagged value back to
/// `mean ± threshold · std`. [`OutlierTransform::Median`] replaces it with the
/// median of the unflagged values, or of all values when every present value
/// is flagged. The rewritten column is `Float64`.
pub fn transform_outliers(
    df: &DataFrame,
    column: &str,
    rows: &[usize],
    threshold: f64,
    method: OutlierTransform,
) -> Result<DataFrame> {
    let values = numeric_column(df, column, "transform_outliers")?;
    let flagged: HashSet<usize> = rows.iter().copied().filter(|&r| r < values.len()).collect();

    let Some(moments) = Moments::from_values(&values) else {
        return Ok(df.clone());
    };
    if flagged.is_empty() {
        return Ok(df.clone());
    }

    let replacement: Box<dyn Fn(f64) -> f64> = match method {
        OutlierTransform::Clamp => {
            let lower = moments.mean - threshold * moments.std;
            let upper = moments.mean + threshold * moments.std;
            debug!("'{}': clamping to [{:.4}, {:.4}]", column, lower, upper);
            Box::new(move |x: f64| x.max(lower).min(upper))
        }
        OutlierTransform::Median => {
            let unflagged: Vec<Option<f64>> = values
                .iter()
                .enumerate()
                .filter(|(row, _)| !flagged.contains(row))
                .map(|(_, v)| *v)
                .collect();
            let fill = median(&unflagged)
                .or_else(|| median(&values))
                .unwrap_or(moments.mean);
            debug!("'{}': replacing with median {:.4}", column, fill);
            Box::new(move |_: f64| fill)
        }
    };

    let transformed: Vec<Option<f64>> = values
        .iter()
        .enumerate()
        .map(|(row, v)| match v {
            Some(x) if flagged.contains(&row) => Some(replacement(*x)),
            other => *other,
        })
        .collect();

    let mut transformed_df = df.clone();
    transformed_df.replace(column, float_series(column, transformed))?;

    info!(
        "Transformed {} outliers in '{}' ({:?})",
        flagged.len(),
        column,
        method
    );
    Ok(transformed_df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn f64_column(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    fn skewed() -> DataFrame {
        // 1..=20 then a far outlier
        let mut x: Vec<f64> = (1..=20).map(f64::from).collect();
        x.push(100.0);
        df!["x" => x].unwrap()
    }

    #[test]
    fn test_detect_default_threshold() {
        let set = detect_outliers(&skewed(), "x", 3.0).unwrap();
        assert_eq!(set.rows, vec![20]);
        assert_eq!(set.column, "x");
        assert!(set.contains(20));
    }

    #[test]
    fn test_detect_small_sample() {
        let df = df!["x" => [1.0, 2.0, 3.0, 4.0, 100.0]].unwrap();

        // five values cap |z| at 2, so 3.0 finds nothing
        assert!(detect_outliers(&df, "x", 3.0).unwrap().is_empty());
        assert_eq!(detect_outliers(&df, "x", 1.5).unwrap().rows, vec![4]);
    }

    #[test]
    fn test_detect_degenerate_columns() {
        let df = df![
            "constant" => [5.0, 5.0, 5.0],
            "single" => [Some(1.0), None, None],
        ]
        .unwrap();

        assert!(detect_outliers(&df, "constant", 0.1).unwrap().is_empty());
        assert!(detect_outliers(&df, "single", 0.1).unwrap().is_empty());
    }

    #[test]
    fn test_detect_underflowing_spread_flags_nothing() {
        let df = df![
            "tiny" => [0.0, 0.0, 0.0, 1e-170],
            "subnormal" => [0.0, 5e-324, 0.0, 0.0],
        ]
        .unwrap();

        assert!(detect_outliers(&df, "tiny", 3.0).unwrap().is_empty());
        assert!(detect_outliers(&df, "subnormal", 0.5).unwrap().is_empty());
    }

    #[test]
    fn test_detect_errors() {
        let df = df!["s" => ["a", "b"]].unwrap();

        let err = detect_outliers(&df, "nope", 3.0).unwrap_err();
        assert!(matches!(err, PreprocessingError::ColumnNotFound(ref c) if c == "nope"));
        assert_eq!(
            detect_outliers(&df, "s", 3.0).unwrap_err().error_code(),
            "UNSUPPORTED_TYPE"
        );
    }

    #[test]
    fn test_detect_is_deterministic() {
        let df = skewed();
        assert_eq!(
            detect_outliers(&df, "x", 2.0).unwrap(),
            detect_outliers(&df, "x", 2.0).unwrap()
        );
    }

    #[test]
    fn test_remove_outliers_drops_listed_rows() {
        let df = df![
            "x" => [1.0, 2.0, 3.0, 4.0, 100.0],
            "label" => ["a", "b", "c", "d", "e"],
        ]
        .unwrap();

        let removed = remove_outliers(&df, "x", &[4, 99]).unwrap();
        assert_eq!(
            f64_column(&removed, "x"),
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]
        );
        assert_eq!(df.height(), 5);
    }

    #[test]
    fn test_transform_clamp() {
        let df = df!["x" => [1.0, 2.0, 3.0, 4.0, 100.0]].unwrap();
        let set = detect_outliers(&df, "x", 1.5).unwrap();

        let transformed = transform_outliers(&df, "x", &set.rows, 1.5, OutlierTransform::Clamp).unwrap();
        let values = f64_column(&transformed, "x");

        let moments = Moments::from_values(&f64_column(&df, "x")).unwrap();
        let upper = moments.mean + 1.5 * moments.std;
        assert_eq!(transformed.height(), 5);
        assert_eq!(&values[..4], &[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        assert!((values[4].unwrap() - upper).abs() < 1e-9);
    }

    #[test]
    fn test_transform_median() {
        let df = df!["x" => [Some(1i64), Some(2), None, Some(3), Some(4), Some(100)]].unwrap();

        let transformed = transform_outliers(&df, "x", &[5], 1.5, OutlierTransform::Median).unwrap();
        // median of [1, 2, 3, 4]
        assert_eq!(
            f64_column(&transformed, "x"),
            vec![Some(1.0), Some(2.0), None, Some(3.0), Some(4.0), Some(2.5)]
        );
    }

    #[test]
    fn test_transform_without_rows_is_noop() {
        let df = df!["x" => [1i64, 2, 3]].unwrap();

        let transformed = transform_outliers(&df, "x", &[], 3.0, OutlierTransform::Clamp).unwrap();
        assert!(transformed.equals_missing(&df));
    }
}
