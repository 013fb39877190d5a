//! The dataset store behind one preprocessing session.
//!
//! ```text
//! load ──► original (never changes)
//!            │ clone
//!            ▼
//!          working ──apply(op)──► working' ──apply(op)──► working''
//!            ▲                                               │
//!            └──────────────────── revert ◄──────────────────┘
//! ```
//!
//! Every operation runs against a borrowed working copy and the result only
//! replaces it on success, so a rejected operation leaves the session exactly
//! as it was. The revision counter goes up on every replacement; outlier sets
//! remember the revision they were detected at and are refused once the
//! working copy has moved on.

use crate::classify;
use crate::config::PreprocessingConfig;
use crate::error::{PreprocessingError, Result};
use crate::io::{self, DataSource};
use crate::operation::Operation;
use crate::profiler;
use crate::transforms;
use crate::types::{AppliedOperation, ColumnClassification, DatasetOverview, OutlierSet};
use chrono::Utc;
use polars::prelude::*;
use tracing::{info, warn};

/// Original snapshot, working copy and history of a single dataset.
#[derive(Debug, Clone)]
pub struct Session {
    original: DataFrame,
    working: DataFrame,
    config: PreprocessingConfig,
    revision: u64,
    history: Vec<AppliedOperation>,
}

impl Session {
    /// Start a session on an already loaded frame.
    pub fn new(df: DataFrame, config: PreprocessingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            working: df.clone(),
            original: df,
            config,
            revision: 0,
            history: Vec::new(),
        })
    }

    /// Load `source` and start a session on it.
    pub fn load(source: &DataSource, config: PreprocessingConfig) -> Result<Self> {
        config.validate()?;
        let df = io::load(source, &config)?;
        Self::new(df, config)
    }

    /// The dataset as it was loaded.
    pub fn original(&self) -> &DataFrame {
        &self.original
    }

    /// The dataset after every accepted operation.
    pub fn working(&self) -> &DataFrame {
        &self.working
    }

    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Operations accepted since load or the last revert, oldest first.
    pub fn history(&self) -> &[AppliedOperation] {
        &self.history
    }

    pub fn classify(&self) -> ColumnClassification {
        classify::classify(&self.working)
    }

    pub fn profile(&self) -> Result<DatasetOverview> {
        profiler::profile(&self.working)
    }

    pub fn export(&self) -> Result<Vec<u8>> {
        io::export(&self.working, &self.config)
    }

    /// Apply one operation to the working copy.
    pub fn apply(&mut self, operation: &Operation) -> Result<&DataFrame> {
        match operation.apply(&self.working, &self.config) {
            Ok(next) => Ok(self.commit(operation.clone(), None, next)),
            Err(e) => {
                warn!("Rejected {}: {}", operation.name(), e);
                Err(e)
            }
        }
    }

    /// Apply operations in order, stopping at the first failure. Operations
    /// before the failing one stay applied.
    pub fn apply_all(&mut self, operations: &[Operation]) -> Result<&DataFrame> {
        for operation in operations {
            self.apply(operation)?;
        }
        Ok(&self.working)
    }

    /// Detect outliers in the working copy with the configured threshold.
    pub fn detect_outliers(&self, column: &str) -> Result<OutlierSet> {
        let mut set =
            transforms::detect_outliers(&self.working, column, self.config.outlier_z_threshold)?;
        set.revision = self.revision;
        Ok(set)
    }

    /// Drop the rows of a fresh outlier set.
    pub fn remove_outliers(&mut self, outliers: &OutlierSet) -> Result<&DataFrame> {
        self.ensure_fresh(outliers)?;
        let next = transforms::remove_outliers(&self.working, &outliers.column, &outliers.rows)?;
        let operation = Operation::RemoveOutliers {
            column: outliers.column.clone(),
        };
        Ok(self.commit(operation, Some(outliers.rows.clone()), next))
    }

    /// Rewrite the values of a fresh outlier set with the configured transform.
    pub fn transform_outliers(&mut self, outliers: &OutlierSet) -> Result<&DataFrame> {
        self.ensure_fresh(outliers)?;
        let method = self.config.outlier_transform;
        let next = transforms::transform_outliers(
            &self.working,
            &outliers.column,
            &outliers.rows,
            outliers.threshold,
            method,
        )?;
        let operation = Operation::TransformOutliers {
            column: outliers.column.clone(),
            method: Some(method),
        };
        Ok(self.commit(operation, Some(outliers.rows.clone()), next))
    }

    /// Throw away every change and go back to the loaded dataset.
    pub fn revert(&mut self) -> &DataFrame {
        self.working = self.original.clone();
        self.revision += 1;
        self.history.clear();
        info!("Reverted to original dataset {:?}", self.original.shape());
        &self.working
    }

    fn ensure_fresh(&self, outliers: &OutlierSet) -> Result<()> {
        if outliers.revision != self.revision {
            return Err(PreprocessingError::StaleOutlierSet {
                column: outliers.column.clone(),
                detected: outliers.revision,
                current: self.revision,
            });
        }
        Ok(())
    }

    fn commit(
        &mut self,
        operation: Operation,
        outlier_rows: Option<Vec<usize>>,
        next: DataFrame,
    ) -> &DataFrame {
        let entry = AppliedOperation {
            operation,
            applied_at: Utc::now(),
            shape_before: self.working.shape(),
            shape_after: next.shape(),
            outlier_rows,
        };
        info!(
            "Applied {} at revision {}: {:?} -> {:?}",
            entry.operation.name(),
            self.revision + 1,
            entry.shape_before,
            entry.shape_after
        );

        self.working = next;
        self.revision += 1;

        while self.history.len() >= self.config.history_limit {
            self.history.remove(0);
        }
        self.history.push(entry);

        &self.working
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::FillMethod;

    fn session() -> Session {
        let df = df![
            "age" => [Some(22.0), None, Some(35.0)],
            "city" => ["A", "B", "A"],
        ]
        .unwrap();
        Session::new(df, PreprocessingConfig::default()).unwrap()
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_apply_replaces_working_only() {
        let mut session = session();
        session
            .apply(&Operation::RemoveColumns {
                columns: columns(&["city"]),
            })
            .unwrap();

        assert_eq!(session.working().width(), 1);
        assert_eq!(session.original().width(), 2);
        assert_eq!(session.revision(), 1);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].shape_before, (3, 2));
        assert_eq!(session.history()[0].shape_after, (3, 1));
        assert_eq!(session.history()[0].outlier_rows, None);
    }

    #[test]
    fn test_rejected_operation_changes_nothing() {
        let mut session = session();
        let before = session.working().clone();

        let err = session
            .apply(&Operation::Standardize {
                columns: columns(&["city"]),
            })
            .unwrap_err();

        assert_eq!(err.error_code(), "UNSUPPORTED_TYPE");
        assert!(session.working().equals_missing(&before));
        assert_eq!(session.revision(), 0);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_revert_restores_original() {
        let mut session = session();
        session
            .apply(&Operation::FillMissing {
                columns: columns(&["age"]),
                method: FillMethod::Mean,
            })
            .unwrap();
        session
            .apply(&Operation::OneHotEncode {
                columns: columns(&["city"]),
            })
            .unwrap();

        session.revert();

        assert!(session.working().equals_missing(session.original()));
        assert_eq!(session.working().column("age").unwrap().null_count(), 1);
        assert!(session.history().is_empty());
        assert_eq!(session.revision(), 3);
    }

    #[test]
    fn test_apply_all_stops_at_first_failure() {
        let mut session = session();
        let result = session.apply_all(&[
            Operation::LabelEncode {
                columns: columns(&["city"]),
            },
            Operation::OneHotEncode {
                // now numeric, so rejected
                columns: columns(&["city"]),
            },
            Operation::RemoveColumns {
                columns: columns(&["age"]),
            },
        ]);

        assert!(result.is_err());
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.working().width(), 2);
    }

    #[test]
    fn test_stale_outlier_set_rejected() {
        let mut x: Vec<f64> = (1..=20).map(f64::from).collect();
        x.push(100.0);
        let df = df!["x" => x, "y" => vec![1i64; 21]].unwrap();
        let mut session = Session::new(df, PreprocessingConfig::default()).unwrap();

        let outliers = session.detect_outliers("x").unwrap();
        assert_eq!(outliers.rows, vec![20]);
        assert_eq!(outliers.revision, 0);

        session
            .apply(&Operation::RemoveColumns {
                columns: columns(&["y"]),
            })
            .unwrap();

        let err = session.remove_outliers(&outliers).unwrap_err();
        assert!(matches!(
            err,
            PreprocessingError::StaleOutlierSet {
                detected: 0,
                current: 1,
                ..
            }
        ));

        let fresh = session.detect_outliers("x").unwrap();
        assert_eq!(session.remove_outliers(&fresh).unwrap().height(), 20);
        assert_eq!(session.history()[1].outlier_rows, Some(vec![20]));
    }

    #[test]
    fn test_transform_outliers_records_method() {
        let mut x: Vec<f64> = (1..=20).map(f64::from).collect();
        x.push(100.0);
        let mut session = Session::new(df!["x" => x].unwrap(), PreprocessingConfig::default()).unwrap();

        let outliers = session.detect_outliers("x").unwrap();
        session.transform_outliers(&outliers).unwrap();

        assert_eq!(session.working().height(), 21);
        assert_eq!(session.history()[0].outlier_rows, Some(vec![20]));
        assert!(matches!(
            session.history()[0].operation,
            Operation::TransformOutliers {
                method: Some(crate::config::OutlierTransform::Clamp),
                ..
            }
        ));
    }

    #[test]
    fn test_history_limit_drops_oldest() {
        let df = df!["a" => [1i64], "b" => [2i64], "c" => [3i64]].unwrap();
        let config = PreprocessingConfig::builder().history_limit(2).build().unwrap();
        let mut session = Session::new(df, config).unwrap();

        for name in ["a", "b", "c"] {
            session
                .apply(&Operation::RemoveColumns {
                    columns: columns(&[name]),
                })
                .unwrap();
        }

        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[0].shape_before, (1, 2));
        assert_eq!(session.revision(), 3);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PreprocessingConfig {
            outlier_z_threshold: -1.0,
            ..PreprocessingConfig::default()
        };
        let err = Session::new(DataFrame::empty(), config).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }
}
