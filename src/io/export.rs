//! File exports: raw period tables, evaluation tables and fit results.
//!
//! CSV outputs use empty cells for missing values so they read back through
//! `Table` unchanged.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::domain::FitResult;
use crate::error::AppError;
use crate::math::Metrics;

/// One fitted series as written to the results JSON.
#[derive(Debug, Clone, Serialize)]
pub struct FitRecord<'a> {
    pub label: &'a str,
    pub x_column: &'a str,
    pub y_column: &'a str,
    #[serde(flatten)]
    pub fit: &'a FitResult,
}

fn create(path: &Path, what: &str) -> Result<File, AppError> {
    File::create(path).map_err(|e| AppError::io(format!("Failed to create {what} '{}': {e}", path.display())))
}

fn csv_error(path: &Path, e: csv::Error) -> AppError {
    AppError::io(format!("Failed to write CSV '{}': {e}", path.display()))
}

/// Write named nullable columns side by side. Shorter columns are padded
/// with empty cells.
pub fn write_columns_csv(path: &Path, columns: &[(String, Vec<Option<f64>>)]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(create(path, "CSV")?);

    writer
        .write_record(columns.iter().map(|(name, _)| name.as_str()))
        .map_err(|e| csv_error(path, e))?;

    let rows = columns.iter().map(|(_, values)| values.len()).max().unwrap_or(0);
    for i in 0..rows {
        let record = columns
            .iter()
            .map(|(_, values)| values.get(i).copied().flatten().map(format_value).unwrap_or_default());
        writer.write_record(record).map_err(|e| csv_error(path, e))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush CSV '{}': {e}", path.display())))
}

/// Write one metrics row per counting.
pub fn write_evaluation_csv(path: &Path, rows: &[(String, Metrics)]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(create(path, "CSV")?);

    writer
        .write_record(["counting", "count", "mean", "std", "sem"])
        .map_err(|e| csv_error(path, e))?;

    for (name, m) in rows {
        let opt = |v: Option<f64>| v.map(format_value).unwrap_or_default();
        writer
            .write_record([
                name.clone(),
                m.count.to_string(),
                opt(m.mean),
                opt(m.std),
                opt(m.sem),
            ])
            .map_err(|e| csv_error(path, e))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush CSV '{}': {e}", path.display())))
}

/// Write fit results as pretty-printed JSON.
pub fn write_fit_results_json(path: &Path, records: &[FitRecord<'_>]) -> Result<(), AppError> {
    let writer = BufWriter::new(create(path, "results JSON")?);
    serde_json::to_writer_pretty(writer, records)
        .map_err(|e| AppError::io(format!("Failed to write results JSON '{}': {e}", path.display())))
}

fn format_value(v: f64) -> String {
    format!("{v}")
}
