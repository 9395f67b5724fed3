//! Трекинг экспериментов в MLflow

pub mod client;
pub mod types;

pub use client::{ArtifactStore, MlflowClient};
pub use types::{RunInfo, RunStatus};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("Invalid tracking URI '{uri}': {source}")]
    InvalidUri {
        uri: String,
        source: url::ParseError,
    },

    #[error("Unsupported tracking URI '{0}': expected an http(s) MLflow server")]
    UnsupportedScheme(String),

    #[error("Tracking server request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("MLflow API error {status} {error_code}: {message}")]
    Api {
        status: u16,
        error_code: String,
        message: String,
    },

    #[error("Cannot set a deleted experiment '{0}' as the active experiment")]
    DeletedExperiment(String),

    #[error("Run {0} has no artifact URI")]
    MissingArtifactUri(String),

    #[error("Unsupported artifact store '{0}'")]
    UnsupportedArtifactStore(String),

    #[error("Invalid artifact file {}", .0.display())]
    InvalidArtifact(PathBuf),

    #[error("Artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
