//! Конфигурация обучения и трекинга

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::attrition::DEFAULT_MAX_ITERATIONS as LIBRARY_MAX_ITERATIONS;

pub const DEFAULT_CSV_PATH: &str = "data/employee_data.csv";
pub const DEFAULT_TARGET: &str = "left_company";
pub const DEFAULT_MODEL_PATH: &str = "models/attrition_model.pkl";
pub const DEFAULT_TEST_SIZE: f64 = 0.2;
pub const LOCAL_TEST_SIZE: f64 = 0.25;
pub const DEFAULT_RANDOM_STATE: u64 = 42;
pub const DEFAULT_MAX_ITERATIONS: u64 = 1000;

pub const TRACKING_URI_ENV: &str = "MLFLOW_TRACKING_URI";
pub const DEFAULT_TRACKING_URI: &str = "http://localhost:7006";
pub const DEFAULT_EXPERIMENT: &str = "employee-attrition";
pub const DEFAULT_RUN_NAME: &str = "logreg-run";
/// Путь артефакта модели внутри рана
pub const MODEL_ARTIFACT_PATH: &str = "model";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub csv_path: PathBuf,
    pub target: String,
    pub test_size: f64,
    pub random_state: u64,
    pub max_iterations: u64,
    pub model_path: PathBuf,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            target: DEFAULT_TARGET.to_string(),
            test_size: DEFAULT_TEST_SIZE,
            random_state: DEFAULT_RANDOM_STATE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

impl TrainConfig {
    /// Константы локального запуска без трекинга: test 25%, лимит итераций библиотеки
    pub fn local() -> Self {
        Self {
            test_size: LOCAL_TEST_SIZE,
            max_iterations: LIBRARY_MAX_ITERATIONS,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub tracking_uri: String,
    pub experiment: String,
    pub run_name: String,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            tracking_uri: DEFAULT_TRACKING_URI.to_string(),
            experiment: DEFAULT_EXPERIMENT.to_string(),
            run_name: DEFAULT_RUN_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracked_defaults() {
        let config = TrainConfig::default();
        assert_eq!(config.csv_path, PathBuf::from("data/employee_data.csv"));
        assert_eq!(config.target, "left_company");
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.random_state, 42);
        assert_eq!(config.max_iterations, 1000);
        assert_eq!(config.model_path, PathBuf::from("models/attrition_model.pkl"));
    }

    #[test]
    fn test_local_constants() {
        let config = TrainConfig::local();
        assert_eq!(config.test_size, 0.25);
        assert_eq!(config.max_iterations, 100);
        assert_eq!(config.target, "left_company");
    }

    #[test]
    fn test_partial_config_is_filled_with_defaults() {
        let config: TrainConfig = serde_json::from_str(r#"{"test_size": 0.3}"#).unwrap();
        assert_eq!(config.test_size, 0.3);
        assert_eq!(config.random_state, 42);

        let tracking: TrackingConfig = serde_json::from_str(r#"{"run_name": "nightly"}"#).unwrap();
        assert_eq!(tracking.run_name, "nightly");
        assert_eq!(tracking.tracking_uri, "http://localhost:7006");
        assert_eq!(tracking.experiment, "employee-attrition");
    }
}
