//! Разбиение на train/test

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::PreprocessingError;
use crate::types::TrainTestSplit;

/// Перемешивает индексы строк с фиксированным seed и отрезает `ceil(n * test_size)`
/// строк в test. Без стратификации.
pub fn train_test_split(
    n_rows: usize,
    test_size: f64,
    seed: u64,
) -> Result<TrainTestSplit, PreprocessingError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PreprocessingError::InvalidTestSize(test_size));
    }

    let n_test = (test_size * n_rows as f64).ceil() as usize;
    let n_train = n_rows.saturating_sub(n_test);
    if n_train == 0 || n_test == 0 {
        return Err(PreprocessingError::EmptyPartition {
            n_rows,
            test_size,
            n_train,
            n_test,
        });
    }

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    let test = indices;

    tracing::debug!(seed, n_train, n_test, "Split rows");

    Ok(TrainTestSplit { train, test })
}
