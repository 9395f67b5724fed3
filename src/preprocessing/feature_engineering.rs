//! Feature engineering: таблица -> матрица признаков и бинарная цель

use ndarray::{Array1, Array2, Axis};

use super::PreprocessingError;
use crate::types::Table;

/// Признаки и метки, готовые для обучения
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub feature_names: Vec<String>,
    pub target: String,
    /// Классы цели по возрастанию; `classes[1]` соответствует `true`
    pub classes: [String; 2],
    pub records: Array2<f64>,
    pub targets: Array1<bool>,
}

impl FeatureSet {
    pub fn n_samples(&self) -> usize {
        self.records.nrows()
    }

    /// Подвыборка строк в заданном порядке
    pub fn select(&self, rows: &[usize]) -> (Array2<f64>, Array1<bool>) {
        (
            self.records.select(Axis(0), rows),
            self.targets.select(Axis(0), rows),
        )
    }
}

pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Все колонки кроме цели становятся числовыми признаками
    pub fn extract(table: &Table, target: &str) -> Result<FeatureSet, PreprocessingError> {
        let target_idx = table.require_column(target)?;

        let feature_idx: Vec<usize> = (0..table.columns.len())
            .filter(|&i| i != target_idx)
            .collect();
        if feature_idx.is_empty() {
            return Err(PreprocessingError::NoFeatures(target.to_string()));
        }

        let classes = Self::label_classes(table, target_idx)?;

        let n_samples = table.n_rows();
        let mut records = Array2::zeros((n_samples, feature_idx.len()));
        let mut targets = Array1::from_elem(n_samples, false);

        for (i, row) in table.rows.iter().enumerate() {
            for (j, &col) in feature_idx.iter().enumerate() {
                records[[i, j]] = Self::parse_value(&row[col]).ok_or_else(|| {
                    PreprocessingError::InvalidValue {
                        // +2: заголовок и нумерация с единицы
                        line: i + 2,
                        column: table.columns[col].clone(),
                        value: row[col].clone(),
                    }
                })?;
            }
            targets[i] = row[target_idx] == classes[1];
        }

        let feature_names = feature_idx
            .iter()
            .map(|&i| table.columns[i].clone())
            .collect();

        Ok(FeatureSet {
            feature_names,
            target: target.to_string(),
            classes,
            records,
            targets,
        })
    }

    /// Число из ячейки. `true`/`false` -> 1/0, пустые и нечисловые -> None
    pub fn parse_value(raw: &str) -> Option<f64> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("true") {
            return Some(1.0);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Some(0.0);
        }
        raw.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Ровно два различных значения цели, отсортированные
    fn label_classes(table: &Table, target_idx: usize) -> Result<[String; 2], PreprocessingError> {
        let mut found: Vec<&str> = table.column_values(target_idx).collect();
        found.sort_unstable();
        found.dedup();

        match found.as_slice() {
            [negative, positive] => Ok([negative.to_string(), positive.to_string()]),
            _ => Err(PreprocessingError::ClassCount {
                target: table.columns[target_idx].clone(),
                found: found.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }
}
