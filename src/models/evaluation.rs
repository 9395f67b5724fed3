//! Оценка качества классификатора

use ndarray::{Array1, Zip};

use super::ModelError;

/// Доля предсказаний, совпавших с истинной меткой
pub fn accuracy<T: PartialEq>(y_true: &Array1<T>, y_pred: &Array1<T>) -> Result<f64, ModelError> {
    if y_true.len() != y_pred.len() {
        return Err(ModelError::LengthMismatch {
            expected: y_true.len(),
            found: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(ModelError::EmptyEvaluation);
    }

    let matches = Zip::from(y_true)
        .and(y_pred)
        .fold(0usize, |acc, t, p| acc + usize::from(t == p));

    Ok(matches as f64 / y_true.len() as f64)
}
