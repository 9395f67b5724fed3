//! Типы данных для обучения модели оттока

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Таблица из CSV: заголовок и строки сырых значений.
///
/// Загружается один раз и дальше только читается.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Значения одной колонки по порядку строк
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |row| row[index].as_str())
    }
}

/// Разбиение строк на train/test (индексы строк таблицы)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl TrainTestSplit {
    pub fn len(&self) -> usize {
        self.train.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.train.is_empty() && self.test.is_empty()
    }
}

/// Итог одного обучения
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub accuracy: f64,
    pub train_rows: usize,
    pub test_rows: usize,
    pub max_iterations: u64,
    pub model_path: PathBuf,
}
