//! Column pruning.

use crate::error::Result;
use crate::utils::resolve_selection;
use polars::prelude::*;
use tracing::info;

/// Drop every column named in `names`.
///
/// Names that are not in the dataset are ignored, which makes the operation
/// idempotent: a second call with the same names changes nothing.
pub fn remove_columns<S: AsRef<str>>(df: &DataFrame, names: &[S]) -> Result<DataFrame> {
    let present = resolve_selection(df, names);
    if present.is_empty() {
        return Ok(df.clone());
    }

    let cols_ref: Vec<PlSmallStr> = present.iter().map(|s| s.as_str().into()).collect();
    let pruned = df.drop_many(cols_ref);

    info!("Removed {} columns: {:?}", present.len(), present);
    Ok(pruned)
}
