#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub const HEADER: &str = "age,satisfaction,monthly_hours,overtime,left_company";

/// Детерминированный датасет: уходят недовольные и перерабатывающие
pub fn employee_csv(rows: usize) -> String {
    let mut body = String::from(HEADER);
    body.push('\n');
    for i in 0..rows {
        let age = 22 + (i * 7) % 40;
        let satisfaction = ((i * 37) % 100) as f64 / 100.0;
        let monthly_hours = 140 + (i * 13) % 120;
        let overtime = i % 3 == 0;
        let left = satisfaction < 0.35 || (overtime && monthly_hours > 230);
        let _ = writeln!(
            body,
            "{},{},{},{},{}",
            age,
            satisfaction,
            monthly_hours,
            if overtime { "True" } else { "False" },
            if left { "True" } else { "False" }
        );
    }
    body
}

pub fn write_file(path: &Path, body: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, body).unwrap();
    path.to_path_buf()
}
