//! Dataset transformations.
//!
//! Every function here borrows its input and returns a new `DataFrame`; none
//! of them mutate the frame they are given. Column selections are resolved
//! against the live column list, so stale names are skipped.

pub mod columns;
pub mod encoding;
pub mod missing;
pub mod outliers;
pub mod scaling;

pub use columns::remove_columns;
pub use encoding::{label_encode, one_hot_encode};
pub use missing::{FillMethod, fill_missing, remove_rows_with_missing};
pub use outliers::{detect_outliers, remove_outliers, transform_outliers};
pub use scaling::{min_max_scale, standardize};
