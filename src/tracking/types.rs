//! Типы REST API MLflow (2.0)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Finished,
    Failed,
    Killed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunTag {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Experiment {
    pub experiment_id: String,
    pub name: String,
    #[serde(default)]
    pub lifecycle_stage: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetExperimentResponse {
    pub experiment: Experiment,
}

#[derive(Debug, Serialize)]
pub struct CreateExperimentRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct CreateExperimentResponse {
    pub experiment_id: String,
}

#[derive(Debug, Serialize)]
pub struct CreateRunRequest<'a> {
    pub experiment_id: &'a str,
    pub run_name: &'a str,
    pub start_time: i64,
    pub tags: Vec<RunTag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunInfo {
    pub run_id: String,
    pub experiment_id: String,
    #[serde(default)]
    pub run_name: Option<String>,
    #[serde(default)]
    pub artifact_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Run {
    pub info: RunInfo,
}

#[derive(Debug, Deserialize)]
pub struct CreateRunResponse {
    pub run: Run,
}

#[derive(Debug, Serialize)]
pub struct LogParamRequest<'a> {
    pub run_id: &'a str,
    pub key: &'a str,
    pub value: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LogMetricRequest<'a> {
    pub run_id: &'a str,
    pub key: &'a str,
    pub value: f64,
    pub timestamp: i64,
    pub step: i64,
}

#[derive(Debug, Serialize)]
pub struct UpdateRunRequest<'a> {
    pub run_id: &'a str,
    pub status: RunStatus,
    pub end_time: i64,
}

/// Тело ошибки MLflow: `{"error_code": "...", "message": "..."}`
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error_code: String,
    #[serde(default)]
    pub message: String,
}
