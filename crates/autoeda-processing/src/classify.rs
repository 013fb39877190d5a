//! Column classification.
//!
//! Splits a dataset's columns into numerical and categorical sets. Every
//! transform uses this split to decide which columns it may touch, so it is
//! recomputed from the live dataset instead of being cached.

use crate::types::ColumnClassification;
use crate::utils::is_numeric_dtype;
use polars::prelude::*;

/// Classify columns by dtype: integers and floats are numerical, everything
/// else (text, categorical, boolean, datetime) is categorical.
pub fn classify(df: &DataFrame) -> ColumnClassification {
    let mut classification = ColumnClassification::default();

    for col in df.get_columns() {
        let name = col.name().to_string();
        if is_numeric_dtype(col.dtype()) {
            classification.numerical.push(name);
        } else {
            classification.categorical.push(name);
        }
    }

    classification
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_mixed_types() {
        let df = df![
            "age" => [Some(22i64), None, Some(35)],
            "city" => ["A", "B", "A"],
            "fare" => [7.25, 71.28, 8.05],
            "alive" => [true, false, true],
        ]
        .unwrap();

        let classification = classify(&df);
        assert_eq!(
            classification.numerical,
            vec!["age".to_string(), "fare".to_string()]
        );
        assert_eq!(
            classification.categorical,
            vec!["city".to_string(), "alive".to_string()]
        );
        assert!(classification.is_numerical("age"));
        assert!(classification.is_categorical("alive"));
        assert!(!classification.is_numerical("missing"));
    }

    #[test]
    fn test_classify_empty_dataframe() {
        let classification = classify(&DataFrame::empty());
        assert!(classification.numerical.is_empty());
        assert!(classification.categorical.is_empty());
    }
}
