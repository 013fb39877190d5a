//! Per-column statistics for the profiler.

use crate::error::Result;
use crate::types::{CategorySummary, NumericSummary};
use crate::utils::{Moments, median, numeric_values, string_values};
use polars::prelude::*;
use std::collections::HashMap;

/// Summary statistics of a numeric column, or `None` if it has no present
/// values.
pub(crate) fn numeric_summary(name: &str, series: &Series) -> Result<Option<NumericSummary>> {
    let values = numeric_values(series)?;
    let Some(moments) = Moments::from_values(&values) else {
        return Ok(None);
    };

    Ok(Some(NumericSummary {
        name: name.to_string(),
        count: moments.count,
        mean: moments.mean,
        std: moments.std,
        min: moments.min,
        median: median(&values).unwrap_or(moments.mean),
        max: moments.max,
    }))
}

/// Distinct count and the `top_n` most frequent values of a column.
/// Equal counts are ordered by value.
pub(crate) fn category_summary(name: &str, series: &Series, top_n: usize) -> Result<CategorySummary> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in string_values(series)?.into_iter().flatten() {
        *counts.entry(value).or_default() += 1;
    }

    let distinct = counts.len();
    let mut top_values: Vec<(String, usize)> = counts.into_iter().collect();
    top_values.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_values.truncate(top_n);

    Ok(CategorySummary {
        name: name.to_string(),
        distinct,
        top_values,
    })
}
