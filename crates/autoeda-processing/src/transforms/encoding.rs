//! Categorical encoding.
//!
//! Categories are always derived from the column being encoded and ordered
//! by their string form, so encoding the same data twice gives the same
//! layout and the same codes.

use crate::error::{PreprocessingError, Result};
use crate::utils::{column_names, require_categorical, resolve_selection, string_values};
use polars::prelude::*;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info};

/// Distinct present values in sorted order.
fn sorted_categories(values: &[Option<String>]) -> BTreeSet<&str> {
    values.iter().flatten().map(String::as_str).collect()
}

/// Replace each selected categorical column with one `Int32` indicator
/// column per distinct value, inserted where the source column was.
///
/// Indicators are named `{column}{separator}{value}`. A missing value is 0 in
/// every indicator of its column. Fails with
/// [`PreprocessingError::DuplicateColumn`] if a generated name clashes with a
/// column that is already there.
pub fn one_hot_encode<S: AsRef<str>>(
    df: &DataFrame,
    columns: &[S],
    separator: &str,
) -> Result<DataFrame> {
    let selected = resolve_selection(df, columns);
    if selected.is_empty() {
        return Ok(df.clone());
    }
    require_categorical(df, &selected, "one_hot_encode")?;

    let selected_set: HashSet<&str> = selected.iter().map(String::as_str).collect();
    let mut taken: HashSet<String> = column_names(df)
        .into_iter()
        .filter(|name| !selected_set.contains(name.as_str()))
        .collect();

    let mut encoded_columns: Vec<Column> = Vec::with_capacity(df.width());
    let mut indicators_added = 0;

    for col in df.get_columns() {
        let name = col.name().as_str();
        if !selected_set.contains(name) {
            encoded_columns.push(col.clone());
            continue;
        }

        let values = string_values(col.as_materialized_series())?;
        let categories = sorted_categories(&values);
        debug!("One-hot encoding '{}' into {} indicators", name, categories.len());

        for category in categories {
            let indicator_name = format!("{name}{separator}{category}");
            if !taken.insert(indicator_name.clone()) {
                return Err(PreprocessingError::DuplicateColumn(indicator_name));
            }

            let indicator: Vec<i32> = values
                .iter()
                .map(|v| i32::from(v.as_deref() == Some(category)))
                .collect();
            encoded_columns.push(Column::from(Series::new(
                indicator_name.as_str().into(),
                indicator,
            )));
            indicators_added += 1;
        }
    }

    let encoded = DataFrame::new(encoded_columns)?;
    info!(
        "One-hot encoded {:?} into {} indicator columns",
        selected, indicators_added
    );
    Ok(encoded)
}

/// Replace each selected categorical column, in place and under the same
/// name, with `Int32` codes `0..k` assigned in sorted value order.
///
/// Missing values stay missing.
pub fn label_encode<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Result<DataFrame> {
    let selected = resolve_selection(df, columns);
    if selected.is_empty() {
        return Ok(df.clone());
    }
    require_categorical(df, &selected, "label_encode")?;

    let mut encoded = df.clone();
    for name in &selected {
        let values = string_values(df.column(name)?.as_materialized_series())?;
        let codes: HashMap<&str, i32> = sorted_categories(&values)
            .into_iter()
            .zip(0i32..)
            .collect();

        let coded: Vec<Option<i32>> = values
            .iter()
            .map(|v| v.as_deref().and_then(|s| codes.get(s).copied()))
            .collect();
        encoded.replace(name, Series::new(name.as_str().into(), coded))?;

        debug!("Label encoded '{}' with {} codes", name, codes.len());
    }

    info!("Label encoded {:?}", selected);
    Ok(encoded)
}
