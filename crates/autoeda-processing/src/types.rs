use crate::operation::Operation;
use crate::utils::DtypeCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Numerical / categorical split of a dataset's columns, in dataset order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnClassification {
    pub numerical: Vec<String>,
    pub categorical: Vec<String>,
}

impl ColumnClassification {
    pub fn is_numerical(&self, column: &str) -> bool {
        self.numerical.iter().any(|c| c == column)
    }

    pub fn is_categorical(&self, column: &str) -> bool {
        self.categorical.iter().any(|c| c == column)
    }
}

/// Rows flagged as outliers in a single numeric column.
///
/// Row indices are only meaningful against the dataset they were computed
/// on; `revision` records which working copy that was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierSet {
    pub column: String,
    /// Flagged row indices, ascending.
    pub rows: Vec<usize>,
    /// The |z| threshold used for detection.
    pub threshold: f64,
    /// Session revision the detection ran against (0 outside a session).
    pub revision: u64,
}

impl OutlierSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, row: usize) -> bool {
        self.rows.binary_search(&row).is_ok()
    }
}

/// One accepted operation in a session's history.
///
/// Outlier treatments driven by an [`OutlierSet`] store the rows they touched
/// in `outlier_rows`. Replaying `operation` on its own re-runs detection, so
/// it can pick different rows if the threshold or data differ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedOperation {
    pub operation: Operation,
    pub applied_at: DateTime<Utc>,
    pub shape_before: (usize, usize),
    pub shape_after: (usize, usize),
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlier_rows: Option<Vec<usize>>,
}

// ============================================================================
// Profiling Types
// ============================================================================

/// Per-column overview entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    /// Polars data type as string ("Int64", "Float64", "String")
    pub dtype: String,
    pub category: DtypeCategory,
    pub null_count: usize,
    pub null_percentage: f64,
    pub unique_count: usize,
}

/// Descriptive statistics of a numeric column (population std).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

/// Most frequent values of a categorical column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,
    pub distinct: usize,
    /// `(value, count)` pairs, most frequent first, ties in value order.
    pub top_values: Vec<(String, usize)>,
}

/// Read-only description of a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    pub numerical_columns: usize,
    pub categorical_columns: usize,
    pub duplicate_rows: usize,
    pub missing_cells: usize,
    pub column_summaries: Vec<ColumnSummary>,
    pub numeric_summaries: Vec<NumericSummary>,
    pub category_summaries: Vec<CategorySummary>,
}

impl DatasetOverview {
    /// Columns that contain at least one missing value.
    pub fn columns_with_missing(&self) -> Vec<&ColumnSummary> {
        self.column_summaries
            .iter()
            .filter(|c| c.null_count > 0)
            .collect()
    }
}
