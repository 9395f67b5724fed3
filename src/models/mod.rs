//! ML модели

pub mod attrition;
pub mod evaluation;

pub use attrition::AttritionModel;
pub use evaluation::accuracy;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to fit logistic regression: {0}")]
    Fit(String),

    #[error("Expected {expected} features, got {found}")]
    FeatureMismatch { expected: usize, found: usize },

    #[error("Prediction length {found} does not match {expected} labels")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Cannot evaluate on an empty test set")]
    EmptyEvaluation,

    #[error("Model file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Model serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
