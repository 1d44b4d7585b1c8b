//! Error types for each pipeline stage.
//!
//! Inference failures are not errors here: they are variants of
//! [`crate::llm::InsightResult`] so callers branch on a closed set of outcomes.

use thiserror::Error;

/// Reading an uploaded file into a table
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("File has no header row")]
    NoHeader,
}

/// Turning a table into a clean series
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Column '{0}' not found in uploaded data")]
    MissingColumn(String),

    #[error("Date and value must be different columns (both set to '{0}')")]
    SameColumn(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum ForecastError {
    #[error("Insufficient data: need at least {required} distinct dates, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Forecast horizon must be between {min} and {max} periods, got {requested}")]
    InvalidHorizon { requested: usize, min: usize, max: usize },

    #[error("Model fitting failed: {0}")]
    Model(String),
}

/// Actions invoked out of order
#[derive(Error, Debug, PartialEq)]
pub enum SessionError {
    #[error("No data loaded. Load a CSV file first.")]
    NoData,

    #[error("Please run the forecast first.")]
    ForecastNotRun,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),
}
