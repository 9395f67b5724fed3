//! Сценарий обучения: загрузка -> split -> обучение -> оценка -> сохранение

use ndarray::Array1;
use tracing::{info, warn};

use crate::config::{TrackingConfig, TrainConfig, MODEL_ARTIFACT_PATH};
use crate::error::Result;
use crate::models::attrition::MODEL_TYPE;
use crate::models::{accuracy, AttritionModel};
use crate::preprocessing::{train_test_split, FeatureEngineer, FeatureSet};
use crate::tracking::{MlflowClient, RunInfo, RunStatus};
use crate::types::{Table, TrainTestSplit, TrainingReport};

/// Данные после загрузки и разбиения
pub struct PreparedData {
    pub features: FeatureSet,
    pub split: TrainTestSplit,
}

pub struct TrainingOutcome {
    pub model: AttritionModel,
    pub report: TrainingReport,
    /// Предсказания на test в порядке `split.test`
    pub test_predictions: Array1<bool>,
}

/// Загрузка CSV, проверка цели, признаки и разбиение.
/// Выполняется до любых сетевых вызовов.
pub fn prepare(config: &TrainConfig) -> Result<PreparedData> {
    let table = Table::from_csv(&config.csv_path)?;
    table.require_column(&config.target)?;

    let features = FeatureEngineer::extract(&table, &config.target)?;
    let split = train_test_split(features.n_samples(), config.test_size, config.random_state)?;

    info!(
        "Split {} rows into {} train / {} test (test_size={}, random_state={})",
        features.n_samples(),
        split.train.len(),
        split.test.len(),
        config.test_size,
        config.random_state
    );

    Ok(PreparedData { features, split })
}

pub fn fit_and_evaluate(prepared: &PreparedData, config: &TrainConfig) -> Result<TrainingOutcome> {
    let model = AttritionModel::train(
        &prepared.features,
        &prepared.split.train,
        config.max_iterations,
    )?;

    let (test_x, test_y) = prepared.features.select(&prepared.split.test);
    let test_predictions = model.predict(&test_x)?;
    let accuracy = accuracy(&test_y, &test_predictions)?;
    info!("Test accuracy: {:.4}", accuracy);

    let report = TrainingReport {
        accuracy,
        train_rows: prepared.split.train.len(),
        test_rows: prepared.split.test.len(),
        max_iterations: config.max_iterations,
        model_path: config.model_path.clone(),
    };

    Ok(TrainingOutcome {
        model,
        report,
        test_predictions,
    })
}

/// Запуск без трекинга
pub fn run_local(config: &TrainConfig) -> Result<TrainingOutcome> {
    let prepared = prepare(config)?;
    let outcome = fit_and_evaluate(&prepared, config)?;
    outcome.model.save(&config.model_path)?;
    Ok(outcome)
}

/// Параметры рана в том виде, в котором они уходят в MLflow
pub fn run_params(config: &TrainConfig, report: &TrainingReport) -> Vec<(&'static str, String)> {
    vec![
        ("model", MODEL_TYPE.to_string()),
        ("test_size", config.test_size.to_string()),
        ("random_state", config.random_state.to_string()),
        ("train_rows", report.train_rows.to_string()),
        ("test_rows", report.test_rows.to_string()),
    ]
}

/// Запуск с записью рана в MLflow.
///
/// Если что-то падает после открытия рана, ран помечается FAILED
/// (ошибка этой пометки только логируется) и исходная ошибка возвращается.
pub async fn run_tracked(
    config: &TrainConfig,
    tracking: &TrackingConfig,
    client: &MlflowClient,
) -> Result<TrainingOutcome> {
    let prepared = prepare(config)?;

    info!("Tracking to {}", client.tracking_uri());
    let experiment_id = client.set_experiment(&tracking.experiment).await?;
    let run = client.start_run(&experiment_id, &tracking.run_name).await?;

    match train_and_log(&prepared, config, client, &run).await {
        Ok(outcome) => {
            client.end_run(&run.run_id, RunStatus::Finished).await?;
            Ok(outcome)
        }
        Err(err) => {
            if let Err(end_err) = client.end_run(&run.run_id, RunStatus::Failed).await {
                warn!("Failed to mark run {} as FAILED: {}", run.run_id, end_err);
            }
            Err(err)
        }
    }
}

async fn train_and_log(
    prepared: &PreparedData,
    config: &TrainConfig,
    client: &MlflowClient,
    run: &RunInfo,
) -> Result<TrainingOutcome> {
    let outcome = fit_and_evaluate(prepared, config)?;

    for (key, value) in run_params(config, &outcome.report) {
        client.log_param(&run.run_id, key, &value).await?;
    }
    client
        .log_metric(&run.run_id, "accuracy", outcome.report.accuracy)
        .await?;

    outcome.model.save(&config.model_path)?;
    client
        .log_model(run, &config.model_path, MODEL_ARTIFACT_PATH)
        .await?;

    Ok(outcome)
}
