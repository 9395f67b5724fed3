//! Обучение модели оттока с записью рана в MLflow

use std::path::PathBuf;

use clap::Parser;

use attrition_ml::config::{
    TrackingConfig, TrainConfig, DEFAULT_CSV_PATH, DEFAULT_EXPERIMENT, DEFAULT_MAX_ITERATIONS,
    DEFAULT_MODEL_PATH, DEFAULT_RANDOM_STATE, DEFAULT_RUN_NAME, DEFAULT_TARGET,
    DEFAULT_TEST_SIZE, DEFAULT_TRACKING_URI, TRACKING_URI_ENV,
};
use attrition_ml::{logging, pipeline, MlflowClient};

#[derive(Parser, Debug)]
#[command(name = "attrition-train")]
#[command(version)]
#[command(about = "Employee Attrition – MLflow demo", long_about = None)]
struct Cli {
    /// Path to CSV
    #[arg(long, default_value = DEFAULT_CSV_PATH)]
    csv: PathBuf,

    /// Target column name
    #[arg(long, default_value = DEFAULT_TARGET)]
    target: String,

    /// MLflow experiment name
    #[arg(long, default_value = DEFAULT_EXPERIMENT)]
    experiment: String,

    /// MLflow run name
    #[arg(long, default_value = DEFAULT_RUN_NAME)]
    run: String,

    /// Test split fraction
    #[arg(long, default_value_t = DEFAULT_TEST_SIZE)]
    test_size: f64,

    /// Random seed
    #[arg(long, default_value_t = DEFAULT_RANDOM_STATE)]
    random_state: u64,

    /// Optimizer iteration cap
    #[arg(long = "max-iter", default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iter: u64,

    /// Where to write the fitted model
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model_out: PathBuf,

    /// MLflow tracking server
    #[arg(long, env = TRACKING_URI_ENV, default_value = DEFAULT_TRACKING_URI)]
    tracking_uri: String,
}

impl Cli {
    fn into_configs(self) -> (TrainConfig, TrackingConfig) {
        let train = TrainConfig {
            csv_path: self.csv,
            target: self.target,
            test_size: self.test_size,
            random_state: self.random_state,
            max_iterations: self.max_iter,
            model_path: self.model_out,
        };
        let tracking = TrackingConfig {
            tracking_uri: self.tracking_uri,
            experiment: self.experiment,
            run_name: self.run,
        };
        (train, tracking)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let (train, tracking) = Cli::parse().into_configs();
    let client = MlflowClient::from_env(&tracking.tracking_uri)?;

    let outcome = pipeline::run_tracked(&train, &tracking, &client).await?;

    println!("✅ Accuracy: {}", outcome.report.accuracy);
    Ok(())
}
