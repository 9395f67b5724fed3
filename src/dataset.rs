//! Загрузка табличных данных из CSV

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::types::Table;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("CSV not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read CSV {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },

    #[error("CSV {} has no header row", .0.display())]
    MissingHeader(PathBuf),

    #[error("Target '{target}' not found. Columns: {}", column_list(columns))]
    MissingColumn { target: String, columns: Vec<String> },
}

/// Список колонок в виде `['a', 'b']`
fn column_list(columns: &[String]) -> String {
    let quoted: Vec<String> = columns.iter().map(|c| format!("'{c}'")).collect();
    format!("[{}]", quoted.join(", "))
}

impl Table {
    /// Читает CSV с заголовком. Строки разной длины считаются ошибкой.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DatasetError::NotFound(path.to_path_buf()));
        }

        let csv_error = |source: csv::Error| DatasetError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(csv_error)?;

        let columns: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(str::to_string)
            .collect();
        if columns.is_empty() {
            return Err(DatasetError::MissingHeader(path.to_path_buf()));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        tracing::info!(
            "Loaded {} rows x {} columns from {}",
            rows.len(),
            columns.len(),
            path.display()
        );

        Ok(Self { columns, rows })
    }

    /// Индекс колонки или ошибка со списком доступных колонок
    pub fn require_column(&self, name: &str) -> Result<usize, DatasetError> {
        self.column_index(name)
            .ok_or_else(|| DatasetError::MissingColumn {
                target: name.to_string(),
                columns: self.columns.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_csv(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("employees.csv");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_loads_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "age, salary,left_company\n30,1000,True\n45, 2000 ,False\n");

        let table = Table::from_csv(&path).unwrap();
        assert_eq!(table.columns, vec!["age", "salary", "left_company"]);
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.rows[1], vec!["45", "2000", "False"]);
    }

    #[test]
    fn test_missing_file_mentions_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");

        let err = Table::from_csv(&path).unwrap_err();
        assert!(matches!(err, DatasetError::NotFound(_)));
        assert!(err.to_string().contains("nope.csv"));
        assert!(err.to_string().starts_with("CSV not found: "));
    }

    #[test]
    fn test_ragged_rows_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "a,b\n1,2\n3\n");

        let err = Table::from_csv(&path).unwrap_err();
        assert!(matches!(err, DatasetError::Csv { .. }));
    }

    #[test]
    fn test_empty_file_has_no_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "");

        let err = Table::from_csv(&path).unwrap_err();
        assert!(matches!(err, DatasetError::MissingHeader(_)));
    }

    #[test]
    fn test_missing_target_lists_columns() {
        let table = Table {
            columns: vec!["age".to_string(), "salary".to_string()],
            rows: vec![],
        };

        let err = table.require_column("left_company").unwrap_err();
        let message = err.to_string();
        assert_eq!(
            message,
            "Target 'left_company' not found. Columns: ['age', 'salary']"
        );
        assert_eq!(table.require_column("salary").unwrap(), 1);
    }
}
