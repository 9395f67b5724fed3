use thiserror::Error;

use crate::dataset::DatasetError;
use crate::models::ModelError;
use crate::preprocessing::PreprocessingError;
use crate::tracking::TrackingError;

/// Общая ошибка обучения
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Tracking(#[from] TrackingError),
}

pub type Result<T> = std::result::Result<T, Error>;
