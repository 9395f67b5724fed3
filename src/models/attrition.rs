//! Логистическая регрессия для прогноза увольнения сотрудника

use std::fs;
use std::path::{Path, PathBuf};

use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::ModelError;
use crate::preprocessing::FeatureSet;

/// Лимит итераций оптимизатора по умолчанию (как у linfa-logistic)
pub const DEFAULT_MAX_ITERATIONS: u64 = 100;

/// L2 регуляризация
const ALPHA: f64 = 1.0;
const GRADIENT_TOLERANCE: f64 = 1e-4;

pub const MODEL_TYPE: &str = "LogisticRegression";

#[derive(Serialize, Deserialize)]
pub struct AttritionModel {
    pub model_type: String,
    pub target: String,
    pub feature_names: Vec<String>,
    pub classes: [String; 2],
    pub max_iterations: u64,
    fitted: FittedLogisticRegression<f64, bool>,
}

impl AttritionModel {
    /// Обучение на строках `train_rows` из `features`.
    ///
    /// Если оптимизатор не сошелся за `max_iterations`, пишется warning
    /// и модель возвращается с достигнутыми весами.
    pub fn train(
        features: &FeatureSet,
        train_rows: &[usize],
        max_iterations: u64,
    ) -> Result<Self, ModelError> {
        let (records, targets) = features.select(train_rows);
        let dataset = Dataset::new(records, targets);

        let fitted = LogisticRegression::default()
            .alpha(ALPHA)
            .gradient_tolerance(GRADIENT_TOLERANCE)
            .max_iterations(max_iterations)
            .fit(&dataset)
            .map_err(|e| ModelError::Fit(e.to_string()))?;

        let model = Self {
            model_type: MODEL_TYPE.to_string(),
            target: features.target.clone(),
            feature_names: features.feature_names.clone(),
            classes: features.classes.clone(),
            max_iterations,
            fitted,
        };

        let grad_norm = model.gradient_norm(&dataset.records, &dataset.targets);
        if grad_norm > GRADIENT_TOLERANCE {
            tracing::warn!(
                "Logistic regression did not converge in {} iterations (gradient norm {:.3e}), \
                 using the last weights",
                max_iterations,
                grad_norm
            );
        }

        tracing::info!(
            "Trained {} on {} rows, {} features",
            MODEL_TYPE,
            dataset.records.nrows(),
            model.feature_names.len()
        );

        Ok(model)
    }

    pub fn predict(&self, records: &Array2<f64>) -> Result<Array1<bool>, ModelError> {
        self.check_features(records)?;
        Ok(self.fitted.predict(records))
    }

    /// Предсказания в исходных значениях целевой колонки
    pub fn predict_labels(&self, records: &Array2<f64>) -> Result<Vec<String>, ModelError> {
        let predictions = self.predict(records)?;
        Ok(predictions
            .iter()
            .map(|&p| self.classes[usize::from(p)].clone())
            .collect())
    }

    /// Вероятность положительного класса (`classes[1]`)
    pub fn predict_proba(&self, records: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        self.check_features(records)?;
        let probs = self.fitted.predict_probabilities(records);
        let predictions: Array1<bool> = self.fitted.predict(records);
        // linfa сам выбирает, какой класс считать положительным
        if positive_class(&probs, &predictions) {
            Ok(probs)
        } else {
            Ok(probs.mapv(|p| 1.0 - p))
        }
    }

    pub fn weights(&self) -> &Array1<f64> {
        self.fitted.params()
    }

    pub fn intercept(&self) -> f64 {
        self.fitted.intercept()
    }

    /// Сохранение в JSON, директория создается при необходимости
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ModelError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let body = serde_json::to_vec(self)?;
        fs::write(path, body).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("Model saved to {}", path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let body = fs::read(path).map_err(|source| ModelError::Io {
            path: PathBuf::from(path),
            source,
        })?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn check_features(&self, records: &Array2<f64>) -> Result<(), ModelError> {
        if records.ncols() != self.feature_names.len() {
            return Err(ModelError::FeatureMismatch {
                expected: self.feature_names.len(),
                found: records.ncols(),
            });
        }
        Ok(())
    }

    /// Норма градиента штрафованной log-loss в найденной точке
    fn gradient_norm(&self, records: &Array2<f64>, targets: &Array1<bool>) -> f64 {
        let probs = self.fitted.predict_probabilities(records);
        let predictions: Array1<bool> = self.fitted.predict(records);
        let positive = positive_class(&probs, &predictions);

        let residual: Array1<f64> = probs
            .iter()
            .zip(targets.iter())
            .map(|(p, &y)| p - if y == positive { 1.0 } else { 0.0 })
            .collect();

        let grad_w = records.t().dot(&residual) + self.fitted.params() * ALPHA;
        let grad_b = residual.sum();

        (grad_w.dot(&grad_w) + grad_b * grad_b).sqrt()
    }
}

/// Класс, которому linfa отдает вероятность из `predict_probabilities`
fn positive_class(probs: &Array1<f64>, predictions: &Array1<bool>) -> bool {
    let mut pairs = probs.iter().zip(predictions.iter());
    if let Some((_, &class)) = pairs.clone().find(|(p, _)| **p > 0.5) {
        return class;
    }
    match pairs.find(|(p, _)| **p < 0.5) {
        Some((_, &class)) => !class,
        None => true,
    }
}
