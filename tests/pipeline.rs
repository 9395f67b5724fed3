mod common;

use attrition_ml::config::TrainConfig;
use attrition_ml::pipeline::{fit_and_evaluate, prepare, run_local};
use attrition_ml::AttritionModel;

fn config_in(dir: &tempfile::TempDir, rows: usize) -> TrainConfig {
    let csv_path = common::write_file(
        &dir.path().join("data").join("employee_data.csv"),
        &common::employee_csv(rows),
    );
    TrainConfig {
        csv_path,
        model_path: dir.path().join("models").join("attrition_model.pkl"),
        ..TrainConfig::default()
    }
}

#[test]
fn thousand_rows_train_and_save() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, 1000);

    let outcome = run_local(&config).unwrap();

    assert_eq!(outcome.report.train_rows, 800);
    assert_eq!(outcome.report.test_rows, 200);
    assert_eq!(outcome.test_predictions.len(), 200);
    assert!((0.0..=1.0).contains(&outcome.report.accuracy));
    assert!(config.model_path.exists());
}

#[test]
fn local_constants_split_a_quarter() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainConfig {
        test_size: 0.25,
        max_iterations: 100,
        ..config_in(&dir, 1000)
    };

    let outcome = run_local(&config).unwrap();
    assert_eq!(outcome.report.train_rows, 750);
    assert_eq!(outcome.report.test_rows, 250);
    assert_eq!(outcome.report.max_iterations, 100);
}

#[test]
fn reloaded_model_predicts_the_same() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, 400);

    let prepared = prepare(&config).unwrap();
    let outcome = fit_and_evaluate(&prepared, &config).unwrap();
    outcome.model.save(&config.model_path).unwrap();

    let restored = AttritionModel::load(&config.model_path).unwrap();
    let (test_x, _) = prepared.features.select(&prepared.split.test);
    assert_eq!(restored.predict(&test_x).unwrap(), outcome.test_predictions);
    assert_eq!(restored.feature_names, prepared.features.feature_names);
    assert_eq!(restored.target, "left_company");
}

#[test]
fn same_seed_same_split_and_accuracy() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, 300);

    let first = prepare(&config).unwrap();
    let second = prepare(&config).unwrap();
    assert_eq!(first.split, second.split);
    assert_eq!(first.split.len(), 300);

    let a = fit_and_evaluate(&first, &config).unwrap();
    let b = fit_and_evaluate(&second, &config).unwrap();
    assert_eq!(a.report.accuracy, b.report.accuracy);
    assert_eq!(a.test_predictions, b.test_predictions);
}

#[test]
fn missing_target_lists_columns() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainConfig {
        target: "churned".to_string(),
        ..config_in(&dir, 50)
    };

    let err = prepare(&config).err().unwrap();
    let message = err.to_string();
    assert!(message.contains("Target 'churned' not found"));
    assert!(message.contains("satisfaction"));
    assert!(message.contains("left_company"));
}
