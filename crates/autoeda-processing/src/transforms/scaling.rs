//! Numeric scaling.

use crate::error::Result;
use crate::utils::{Moments, float_series, numeric_values, require_numeric, resolve_selection};
use polars::prelude::*;
use tracing::{debug, info};

/// Apply `rescale` to every present value of each selected numeric column.
///
/// Columns with no present values are converted to `Float64` and otherwise
/// left alone.
fn scale_columns<S, F>(
    df: &DataFrame,
    columns: &[S],
    operation: &'static str,
    rescale: F,
) -> Result<DataFrame>
where
    S: AsRef<str>,
    F: Fn(&Moments, f64) -> f64,
{
    let selected = resolve_selection(df, columns);
    require_numeric(df, &selected, operation)?;

    let mut scaled_df = df.clone();
    for name in &selected {
        let values = numeric_values(df.column(name)?.as_materialized_series())?;
        let scaled: Vec<Option<f64>> = match Moments::from_values(&values) {
            Some(moments) => {
                debug!(
                    "{} '{}': mean={:.4}, std={:.4}, min={:.4}, max={:.4}",
                    operation, name, moments.mean, moments.std, moments.min, moments.max
                );
                values
                    .into_iter()
                    .map(|v| v.map(|x| rescale(&moments, x)))
                    .collect()
            }
            None => {
                debug!("{} '{}': no present values", operation, name);
                values
            }
        };
        scaled_df.replace(name, float_series(name, scaled))?;
    }

    if !selected.is_empty() {
        info!("Applied {} to {:?}", operation, selected);
    }
    Ok(scaled_df)
}

/// Standardize each selected column to zero mean and unit population
/// variance. A column without spread becomes all zeros.
pub fn standardize<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<DataFrame> {
    scale_columns(df, columns, "standardize", |m, x| {
        if m.has_spread() {
            (x - m.mean) / m.std
        } else {
            0.0
        }
    })
}

/// Rescale each selected column linearly into `[0, 1]`. A constant column
/// becomes all zeros.
pub fn min_max_scale<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<DataFrame> {
    scale_columns(df, columns, "min_max_scale", |m, x| {
        let range = m.max - m.min;
        if range > 0.0 && range.is_finite() {
            (x - m.min) / range
        } else {
            0.0
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f64_column(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_standardize_zero_mean_unit_std() {
        let df = df![
            "x" => [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0],
        ]
        .unwrap();

        let scaled = standardize(&df, &["x"]).unwrap();
        let values = f64_column(&scaled, "x");
        let moments = Moments::from_values(&values).unwrap();

        assert!(moments.mean.abs() < 1e-9);
        assert!((moments.std - 1.0).abs() < 1e-9);
        // mean 5, population std 2
        assert_eq!(values[0], Some(-1.5));
    }

    #[test]
    fn test_standardize_constant_column_is_zero() {
        let df = df![
            "c" => [0.1, 0.1, 0.1],
        ]
        .unwrap();

        let scaled = standardize(&df, &["c"]).unwrap();
        assert_eq!(f64_column(&scaled, "c"), vec![Some(0.0); 3]);
    }

    #[test]
    fn test_scaling_underflowing_spread_stays_finite() {
        let df = df![
            "tiny" => [0.0, 0.0, 0.0, 1e-170],
            "subnormal" => [0.0, 5e-324, 0.0, 0.0],
        ]
        .unwrap();

        let standardized = standardize(&df, &["tiny", "subnormal"]).unwrap();
        assert_eq!(f64_column(&standardized, "tiny"), vec![Some(0.0); 4]);
        assert_eq!(f64_column(&standardized, "subnormal"), vec![Some(0.0); 4]);

        // the range itself is representable, so min-max still separates them
        let rescaled = min_max_scale(&df, &["tiny", "subnormal"]).unwrap();
        assert_eq!(
            f64_column(&rescaled, "tiny"),
            vec![Some(0.0), Some(0.0), Some(0.0), Some(1.0)]
        );
        assert_eq!(
            f64_column(&rescaled, "subnormal"),
            vec![Some(0.0), Some(1.0), Some(0.0), Some(0.0)]
        );
    }

    #[test]
    fn test_standardize_keeps_nulls_and_casts_ints() {
        let df = df![
            "n" => [Some(1i64), None, Some(3)],
        ]
        .unwrap();

        let scaled = standardize(&df, &["n"]).unwrap();
        assert_eq!(
            f64_column(&scaled, "n"),
            vec![Some(-1.0), None, Some(1.0)]
        );
    }

    #[test]
    fn test_standardize_all_null_stays_null() {
        let df = df![
            "empty" => [Option::<f64>::None, None],
        ]
        .unwrap();

        let scaled = standardize(&df, &["empty"]).unwrap();
        assert_eq!(scaled.column("empty").unwrap().null_count(), 2);
    }

    #[test]
    fn test_min_max_range() {
        let df = df![
            "x" => [10.0, 20.0, 15.0, 30.0],
            "untouched" => [1, 2, 3, 4],
        ]
        .unwrap();

        let scaled = min_max_scale(&df, &["x"]).unwrap();
        assert_eq!(
            f64_column(&scaled, "x"),
            vec![Some(0.0), Some(0.5), Some(0.25), Some(1.0)]
        );
        assert!(matches!(
            scaled.column("untouched").unwrap().dtype(),
            DataType::Int32
        ));
    }

    #[test]
    fn test_min_max_constant_column_is_zero() {
        let df = df![
            "c" => [Some(4.0), None, Some(4.0)],
        ]
        .unwrap();

        let scaled = min_max_scale(&df, &["c"]).unwrap();
        assert_eq!(f64_column(&scaled, "c"), vec![Some(0.0), None, Some(0.0)]);
    }

    #[test]
    fn test_scaling_rejects_strings() {
        let df = df![
            "s" => ["a", "b"],
        ]
        .unwrap();

        assert_eq!(
            min_max_scale(&df, &["s"]).unwrap_err().error_code(),
            "UNSUPPORTED_TYPE"
        );
        assert_eq!(
            standardize(&df, &["s"]).unwrap_err().error_code(),
            "UNSUPPORTED_TYPE"
        );
    }

    #[test]
    fn test_scaling_leaves_input_alone() {
        let df = df![
            "x" => [1.0, 2.0, 3.0],
        ]
        .unwrap();
        let before = df.clone();

        let _ = standardize(&df, &["x"]).unwrap();
        assert!(df.equals_missing(&before));
    }
}
