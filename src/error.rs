use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Invalid contract amount {value:?} on line {row}")]
    InvalidAmount { row: usize, value: String },

    #[error("Invalid contract date {value:?} on line {row} (expected day-first, e.g. 03/04/2025)")]
    InvalidDate { row: usize, value: String },

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config {path}: {reason}")]
    ConfigRead { path: PathBuf, reason: String },

    #[error("Failed to parse config {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("Validation: {0}")]
    Validation(String),
}

#[cfg(feature = "python")]
impl From<DashboardError> for pyo3::PyErr {
    fn from(err: DashboardError) -> pyo3::PyErr {
        pyo3::exceptions::PyRuntimeError::new_err(err.to_string())
    }
}
