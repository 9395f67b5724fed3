//! HTTP клиент MLflow tracking server

use std::path::{Path, PathBuf};

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use super::types::*;
use super::TrackingError;
use crate::models::attrition::MODEL_TYPE;

const TOKEN_ENV: &str = "MLFLOW_TRACKING_TOKEN";
const USERNAME_ENV: &str = "MLFLOW_TRACKING_USERNAME";
const PASSWORD_ENV: &str = "MLFLOW_TRACKING_PASSWORD";

const MLMODEL_FILE: &str = "MLmodel";
const MODEL_FLAVOR: &str = "attrition_ml_json";

#[derive(Debug, Clone)]
enum Auth {
    Bearer(String),
    Basic {
        username: String,
        password: Option<String>,
    },
}

/// Клиент REST API MLflow. Запросы выполняются последовательно, без повторов.
#[derive(Debug, Clone)]
pub struct MlflowClient {
    http: reqwest::Client,
    base_url: Url,
    auth: Option<Auth>,
}

impl MlflowClient {
    pub fn new(tracking_uri: &str) -> Result<Self, TrackingError> {
        let mut base_url = Url::parse(tracking_uri).map_err(|source| TrackingError::InvalidUri {
            uri: tracking_uri.to_string(),
            source,
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(TrackingError::UnsupportedScheme(tracking_uri.to_string()));
        }
        // иначе Url::join заменит последний сегмент пути
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            auth: None,
        })
    }

    /// Клиент с авторизацией из MLFLOW_TRACKING_TOKEN / MLFLOW_TRACKING_USERNAME
    pub fn from_env(tracking_uri: &str) -> Result<Self, TrackingError> {
        let client = Self::new(tracking_uri)?;
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            return Ok(client.with_bearer_token(token));
        }
        if let Ok(username) = std::env::var(USERNAME_ENV) {
            let password = std::env::var(PASSWORD_ENV).ok();
            return Ok(client.with_basic_auth(username, password));
        }
        Ok(client)
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(Auth::Bearer(token.into()));
        self
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.auth = Some(Auth::Basic {
            username: username.into(),
            password,
        });
        self
    }

    pub fn tracking_uri(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, TrackingError> {
        self.base_url
            .join(path)
            .map_err(|source| TrackingError::InvalidUri {
                uri: format!("{}{}", self.base_url, path),
                source,
            })
    }

    /// Идентификатор эксперимента; создается, если его еще нет
    pub async fn set_experiment(&self, name: &str) -> Result<String, TrackingError> {
        match self.get_experiment_by_name(name).await? {
            Some(experiment) => {
                if experiment.lifecycle_stage.as_deref() == Some("deleted") {
                    return Err(TrackingError::DeletedExperiment(name.to_string()));
                }
                debug!("Using experiment '{}' ({})", name, experiment.experiment_id);
                Ok(experiment.experiment_id)
            }
            None => {
                let experiment_id = self.create_experiment(name).await?;
                info!("Created experiment '{}' ({})", name, experiment_id);
                Ok(experiment_id)
            }
        }
    }

    pub async fn get_experiment_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Experiment>, TrackingError> {
        let result: Result<GetExperimentResponse, _> = self
            .get_json(
                "api/2.0/mlflow/experiments/get-by-name",
                &[("experiment_name", name)],
            )
            .await;

        match result {
            Ok(response) => Ok(Some(response.experiment)),
            Err(TrackingError::Api { ref error_code, .. })
                if error_code == "RESOURCE_DOES_NOT_EXIST" =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn create_experiment(&self, name: &str) -> Result<String, TrackingError> {
        let response: CreateExperimentResponse = self
            .post_json(
                "api/2.0/mlflow/experiments/create",
                &CreateExperimentRequest { name },
            )
            .await?;
        Ok(response.experiment_id)
    }

    pub async fn start_run(
        &self,
        experiment_id: &str,
        run_name: &str,
    ) -> Result<RunInfo, TrackingError> {
        let mut tags = vec![
            RunTag {
                key: "mlflow.runName".to_string(),
                value: run_name.to_string(),
            },
            RunTag {
                key: "mlflow.source.type".to_string(),
                value: "LOCAL".to_string(),
            },
            RunTag {
                key: "mlflow.source.name".to_string(),
                value: env!("CARGO_PKG_NAME").to_string(),
            },
        ];
        if let Ok(user) = std::env::var("USER").or_else(|_| std::env::var("USERNAME")) {
            tags.push(RunTag {
                key: "mlflow.user".to_string(),
                value: user,
            });
        }

        let response: CreateRunResponse = self
            .post_json(
                "api/2.0/mlflow/runs/create",
                &CreateRunRequest {
                    experiment_id,
                    run_name,
                    start_time: now_millis(),
                    tags,
                },
            )
            .await?;

        info!(
            "Started run '{}' ({}) in experiment {}",
            run_name, response.run.info.run_id, experiment_id
        );
        Ok(response.run.info)
    }

    pub async fn log_param(&self, run_id: &str, key: &str, value: &str) -> Result<(), TrackingError> {
        let _: IgnoredAny = self
            .post_json(
                "api/2.0/mlflow/runs/log-parameter",
                &LogParamRequest { run_id, key, value },
            )
            .await?;
        debug!("Logged param {}={}", key, value);
        Ok(())
    }

    pub async fn log_metric(&self, run_id: &str, key: &str, value: f64) -> Result<(), TrackingError> {
        let _: IgnoredAny = self
            .post_json(
                "api/2.0/mlflow/runs/log-metric",
                &LogMetricRequest {
                    run_id,
                    key,
                    value,
                    timestamp: now_millis(),
                    step: 0,
                },
            )
            .await?;
        debug!("Logged metric {}={}", key, value);
        Ok(())
    }

    /// Загружает файл в `<artifact_uri>/<artifact_path>/<имя файла>`
    pub async fn log_artifact(
        &self,
        run: &RunInfo,
        local_path: &Path,
        artifact_path: &str,
    ) -> Result<(), TrackingError> {
        let file_name = artifact_file_name(local_path)?;
        let body = tokio::fs::read(local_path).await.map_err(io_error(local_path))?;
        self.upload(run, &artifact_relative(artifact_path, file_name), body)
            .await
    }

    /// Файл модели и дескриптор `MLmodel` рядом с ним, чтобы MLflow
    /// показывал `artifact_path` как модель
    pub async fn log_model(
        &self,
        run: &RunInfo,
        local_path: &Path,
        artifact_path: &str,
    ) -> Result<(), TrackingError> {
        self.log_artifact(run, local_path, artifact_path).await?;

        let file_name = artifact_file_name(local_path)?;
        let descriptor = mlmodel_descriptor(&run.run_id, artifact_path, file_name);
        self.upload(
            run,
            &artifact_relative(artifact_path, MLMODEL_FILE),
            descriptor.into_bytes(),
        )
        .await
    }

    async fn upload(
        &self,
        run: &RunInfo,
        relative: &str,
        body: Vec<u8>,
    ) -> Result<(), TrackingError> {
        let artifact_uri = run
            .artifact_uri
            .as_deref()
            .ok_or_else(|| TrackingError::MissingArtifactUri(run.run_id.clone()))?;

        match ArtifactStore::resolve(artifact_uri)? {
            ArtifactStore::Proxied(root) => {
                let url = self.endpoint(&format!(
                    "api/2.0/mlflow-artifacts/artifacts/{}/{}",
                    root, relative
                ))?;
                let response = self.request(Method::PUT, url).body(body).send().await?;
                check(response).await?;
            }
            ArtifactStore::Local(root) => {
                let destination = root.join(relative);
                if let Some(parent) = destination.parent() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(io_error(parent))?;
                }
                tokio::fs::write(&destination, body)
                    .await
                    .map_err(io_error(&destination))?;
            }
        }

        info!("Logged artifact {} to {}", relative, artifact_uri);
        Ok(())
    }

    pub async fn end_run(&self, run_id: &str, status: RunStatus) -> Result<(), TrackingError> {
        let _: IgnoredAny = self
            .post_json(
                "api/2.0/mlflow/runs/update",
                &UpdateRunRequest {
                    run_id,
                    status,
                    end_time: now_millis(),
                },
            )
            .await?;
        info!("Run {} ended with status {:?}", run_id, status);
        Ok(())
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.auth {
            Some(Auth::Bearer(token)) => builder.bearer_auth(token),
            Some(Auth::Basic { username, password }) => builder.basic_auth(username, password.as_ref()),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, TrackingError> {
        let url = self.endpoint(path)?;
        let response = self.request(Method::GET, url).query(query).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, TrackingError> {
        let url = self.endpoint(path)?;
        let response = self.request(Method::POST, url).json(body).send().await?;
        Ok(check(response).await?.json().await?)
    }
}

/// Ошибки сервера превращаются в `TrackingError::Api`
async fn check(response: Response) -> Result<Response, TrackingError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => format!("failed to read response body: {err}"),
    };
    Err(api_error(status, body))
}

fn api_error(status: StatusCode, body: String) -> TrackingError {
    let (error_code, message) = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(api) => (api.error_code, api.message),
        Err(_) => (
            status.canonical_reason().unwrap_or("UNKNOWN").to_string(),
            body,
        ),
    };

    TrackingError::Api {
        status: status.as_u16(),
        error_code,
        message,
    }
}

fn artifact_file_name(local_path: &Path) -> Result<&str, TrackingError> {
    local_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| TrackingError::InvalidArtifact(local_path.to_path_buf()))
}

fn artifact_relative(artifact_path: &str, file_name: &str) -> String {
    let artifact_path = artifact_path.trim_matches('/');
    if artifact_path.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", artifact_path, file_name)
    }
}

/// YAML дескриптор модели в формате MLflow
fn mlmodel_descriptor(run_id: &str, artifact_path: &str, model_file: &str) -> String {
    format!(
        "artifact_path: {artifact_path}\n\
         flavors:\n\
         \x20 {MODEL_FLAVOR}:\n\
         \x20   model_file: {model_file}\n\
         \x20   model_type: {MODEL_TYPE}\n\
         \x20   crate_version: {version}\n\
         run_id: {run_id}\n\
         utc_time_created: '{created}'\n",
        artifact_path = artifact_path.trim_matches('/'),
        version = env!("CARGO_PKG_VERSION"),
        created = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.6f"),
    )
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> TrackingError {
    let path = path.to_path_buf();
    move |source| TrackingError::Io { path, source }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Куда физически пишутся артефакты рана
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactStore {
    /// `mlflow-artifacts:`, загрузка через прокси tracking server
    Proxied(String),
    /// `file:` или абсолютный путь
    Local(PathBuf),
}

impl ArtifactStore {
    pub fn resolve(artifact_uri: &str) -> Result<Self, TrackingError> {
        if let Some(rest) = artifact_uri.strip_prefix("mlflow-artifacts:") {
            // mlflow-artifacts:/1/<run>/artifacts или mlflow-artifacts://host:port/1/<run>/artifacts
            let path = match rest.strip_prefix("//") {
                Some(with_host) => with_host.split_once('/').map(|(_, p)| p).unwrap_or(""),
                None => rest,
            };
            return Ok(Self::Proxied(path.trim_matches('/').to_string()));
        }

        if artifact_uri.starts_with("file:") {
            return Url::parse(artifact_uri)
                .ok()
                .and_then(|url| url.to_file_path().ok())
                .map(Self::Local)
                .ok_or_else(|| TrackingError::UnsupportedArtifactStore(artifact_uri.to_string()));
        }

        if Path::new(artifact_uri).is_absolute() {
            return Ok(Self::Local(PathBuf::from(artifact_uri)));
        }

        Err(TrackingError::UnsupportedArtifactStore(artifact_uri.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = MlflowClient::new("http://localhost:7006").unwrap();
        assert_eq!(
            client.endpoint("api/2.0/mlflow/runs/create").unwrap().as_str(),
            "http://localhost:7006/api/2.0/mlflow/runs/create"
        );

        let client = MlflowClient::new("https://tracking.example.com/mlflow").unwrap();
        assert_eq!(
            client.endpoint("api/2.0/mlflow/runs/create").unwrap().as_str(),
            "https://tracking.example.com/mlflow/api/2.0/mlflow/runs/create"
        );
    }

    #[test]
    fn test_rejects_non_http_uri() {
        assert!(matches!(
            MlflowClient::new("file:///tmp/mlruns"),
            Err(TrackingError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            MlflowClient::new("databricks"),
            Err(TrackingError::InvalidUri { .. })
        ));
    }

    #[test]
    fn test_resolve_proxied_store() {
        assert_eq!(
            ArtifactStore::resolve("mlflow-artifacts:/3/abc123/artifacts").unwrap(),
            ArtifactStore::Proxied("3/abc123/artifacts".to_string())
        );
        assert_eq!(
            ArtifactStore::resolve("mlflow-artifacts://mlflow:5000/3/abc123/artifacts/").unwrap(),
            ArtifactStore::Proxied("3/abc123/artifacts".to_string())
        );
    }

    #[test]
    fn test_resolve_local_store() {
        assert_eq!(
            ArtifactStore::resolve("file:///srv/mlruns/1/abc/artifacts").unwrap(),
            ArtifactStore::Local(PathBuf::from("/srv/mlruns/1/abc/artifacts"))
        );
        assert_eq!(
            ArtifactStore::resolve("/srv/mlruns/1/abc/artifacts").unwrap(),
            ArtifactStore::Local(PathBuf::from("/srv/mlruns/1/abc/artifacts"))
        );
        assert!(matches!(
            ArtifactStore::resolve("s3://bucket/1/abc/artifacts"),
            Err(TrackingError::UnsupportedArtifactStore(_))
        ));
    }

    #[test]
    fn test_mlmodel_descriptor_points_at_model_file() {
        let descriptor = mlmodel_descriptor("run-1", "/model/", "attrition_model.pkl");
        let lines: Vec<&str> = descriptor.lines().collect();

        assert_eq!(lines[0], "artifact_path: model");
        assert_eq!(lines[1], "flavors:");
        assert_eq!(lines[2], "  attrition_ml_json:");
        assert_eq!(lines[3], "    model_file: attrition_model.pkl");
        assert_eq!(lines[4], "    model_type: LogisticRegression");
        assert!(lines[5].starts_with("    crate_version: "));
        assert_eq!(lines[6], "run_id: run-1");
        assert!(lines[7].starts_with("utc_time_created: '"));
    }

    #[test]
    fn test_api_error_body() {
        let err = api_error(
            StatusCode::NOT_FOUND,
            r#"{"error_code": "RESOURCE_DOES_NOT_EXIST", "message": "no such run"}"#.to_string(),
        );
        assert!(matches!(
            err,
            TrackingError::Api { status: 404, ref error_code, ref message }
                if error_code == "RESOURCE_DOES_NOT_EXIST" && message == "no such run"
        ));

        let err = api_error(StatusCode::BAD_GATEWAY, "upstream down".to_string());
        assert!(matches!(
            err,
            TrackingError::Api { status: 502, ref error_code, ref message }
                if error_code == "Bad Gateway" && message == "upstream down"
        ));
    }

    #[test]
    fn test_run_status_wire_format() {
        assert_eq!(serde_json::to_string(&RunStatus::Finished).unwrap(), "\"FINISHED\"");
        assert_eq!(serde_json::to_string(&RunStatus::Failed).unwrap(), "\"FAILED\"");
    }
}
