//! Exploratory Data Analysis Preprocessing Library
//!
//! Interactive, step-by-step preprocessing of a single tabular dataset,
//! built on Polars.
//!
//! # Overview
//!
//! A [`Session`] owns two frames: the dataset exactly as it was loaded and a
//! working copy. Operations run one at a time against the working copy:
//!
//! - **Column pruning**: drop selected columns
//! - **Missing data**: drop incomplete rows, or fill with mean / median / mode
//! - **Encoding**: one-hot and label encoding of categorical columns
//! - **Scaling**: standardization and min-max scaling
//! - **Outliers**: z-score detection, then removal or clamping
//!
//! A rejected operation leaves the working copy untouched, and
//! [`Session::revert`] brings back the original at any time. The profiler
//! and the CSV export read whatever the working copy currently is.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use autoeda_processing::{DataSource, FillMethod, Operation, PreprocessingConfig, Session};
//!
//! let mut session = Session::load(&DataSource::Example, PreprocessingConfig::default())?;
//!
//! session.apply(&Operation::FillMissing {
//!     columns: vec!["Age".into()],
//!     method: FillMethod::Median,
//! })?;
//! session.apply(&Operation::OneHotEncode {
//!     columns: vec!["Sex".into(), "Embarked".into()],
//! })?;
//!
//! let outliers = session.detect_outliers("Fare")?;
//! session.transform_outliers(&outliers)?;
//!
//! std::fs::write("processed.csv", session.export()?)?;
//! ```
//!
//! Every operation is also available as a free function over `&DataFrame`
//! in [`transforms`], for use without a session.
//!
//! # Recipes
//!
//! [`Operation`] is serde-serializable, so a list of dashboard actions can be
//! stored as JSON and replayed with [`Session::apply_all`]:
//!
//! ```json
//! [
//!   {"op": "remove_columns", "columns": ["PassengerId", "Name", "Ticket", "Cabin"]},
//!   {"op": "fill_missing", "columns": ["Age"], "method": "median"},
//!   {"op": "label_encode", "columns": ["Sex"]},
//!   {"op": "standardize", "columns": ["Age", "Fare"]}
//! ]
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod io;
pub mod operation;
pub mod profiler;
pub mod session;
pub mod transforms;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use classify::classify;
pub use config::{
    ConfigValidationError, OutlierTransform, PreprocessingConfig, PreprocessingConfigBuilder,
};
pub use error::{PreprocessingError, Result as PreprocessingResult, ResultExt};
pub use io::{DataSource, export, load};
pub use operation::{Operation, Recipe};
pub use profiler::profile;
pub use session::Session;
pub use transforms::FillMethod;
pub use types::{
    AppliedOperation, CategorySummary, ColumnClassification, ColumnSummary, DatasetOverview,
    NumericSummary, OutlierSet,
};
pub use utils::{DtypeCategory, get_dtype_category, is_numeric_dtype};
