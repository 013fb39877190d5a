//! Read-only dataset profiling.
//!
//! Builds the overview the dashboard shows next to the data grid: shape,
//! missingness, dtype listing, numeric summary statistics and the most
//! frequent values of each categorical column. Nothing here mutates the
//! frame it is given.

mod statistics;

use crate::classify::classify;
use crate::error::Result;
use crate::types::{ColumnSummary, DatasetOverview};
use crate::utils::{get_dtype_category, missing_mask};
use polars::prelude::*;
use tracing::debug;

pub(crate) use statistics::{category_summary, numeric_summary};

/// Number of `(value, count)` pairs kept per categorical column.
pub const TOP_VALUES: usize = 5;

/// Profile `df`.
pub fn profile(df: &DataFrame) -> Result<DatasetOverview> {
    let classification = classify(df);
    let mut column_summaries = Vec::with_capacity(df.width());
    let mut numeric_summaries = Vec::new();
    let mut category_summaries = Vec::new();
    let mut missing_cells = 0;

    for col in df.get_columns() {
        let name = col.name().to_string();
        let series = col.as_materialized_series();

        let null_count = missing_mask(series)?.into_iter().filter(|m| *m).count();
        missing_cells += null_count;
        let null_percentage = if df.height() > 0 {
            (null_count as f64 / df.height() as f64) * 100.0
        } else {
            0.0
        };

        column_summaries.push(ColumnSummary {
            name: name.clone(),
            dtype: format!("{:?}", series.dtype()),
            category: get_dtype_category(series.dtype()),
            null_count,
            null_percentage,
            unique_count: series.n_unique()?,
        });

        if classification.is_numerical(&name) {
            if let Some(summary) = numeric_summary(&name, series)? {
                numeric_summaries.push(summary);
            }
        } else {
            category_summaries.push(category_summary(&name, series, TOP_VALUES)?);
        }
    }

    let duplicate_rows = if df.width() == 0 {
        0
    } else {
        df.height()
            - df.unique::<&str, &str>(None, UniqueKeepStrategy::First, None)?
                .height()
    };

    debug!(
        "Profiled {} columns: {} missing cells, {} duplicate rows",
        df.width(),
        missing_cells,
        duplicate_rows
    );

    Ok(DatasetOverview {
        rows: df.height(),
        columns: df.width(),
        numerical_columns: classification.numerical.len(),
        categorical_columns: classification.categorical.len(),
        duplicate_rows,
        missing_cells,
        column_summaries,
        numeric_summaries,
        category_summaries,
    })
}
