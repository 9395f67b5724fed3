//! Модуль предобработки данных

pub mod feature_engineering;
pub mod split;

pub use feature_engineering::{FeatureEngineer, FeatureSet};
pub use split::train_test_split;

use thiserror::Error;

use crate::dataset::DatasetError;

#[derive(Debug, Error)]
pub enum PreprocessingError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("Invalid numeric value '{value}' in column '{column}' at line {line}")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
    },

    #[error("Target '{target}' must have exactly two classes, found {found:?}")]
    ClassCount { target: String, found: Vec<String> },

    #[error("No feature columns besides target '{0}'")]
    NoFeatures(String),

    #[error("test_size must be in (0, 1), got {0}")]
    InvalidTestSize(f64),

    #[error(
        "With n_samples={n_rows}, test_size={test_size} the resulting split is empty \
         (train={n_train}, test={n_test})"
    )]
    EmptyPartition {
        n_rows: usize,
        test_size: f64,
        n_train: usize,
        n_test: usize,
    },
}
