//! Attrition ML - обучение классификатора оттока сотрудников

pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod tracking;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
pub use models::AttritionModel;
pub use tracking::MlflowClient;
