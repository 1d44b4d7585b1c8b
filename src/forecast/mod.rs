//! Forecast adapter around a pluggable fit/predict capability.

pub mod trend;

use crate::core::timeseries;
use crate::error::ForecastError;
use crate::models::{Forecast, ForecastPoint, Series};
use chrono::{DateTime, Utc};

pub use trend::LinearTrendForecaster;

pub const MIN_DISTINCT_TIMESTAMPS: usize = 2;
pub const MIN_HORIZON: usize = 1;
pub const MAX_HORIZON: usize = 52;

/// Something that can learn from a series.
pub trait Forecaster {
    type Model: FittedModel;

    fn name(&self) -> &str;
    fn fit(&self, series: &Series) -> Result<Self::Model, ForecastError>;
}

/// A fitted model predicting at arbitrary timestamps.
pub trait FittedModel {
    fn predict(&self, index: &[DateTime<Utc>]) -> Result<Vec<ForecastPoint>, ForecastError>;
}

/// Fit `forecaster` on `series` and predict over its history plus
/// `horizon` weekly periods after the last observation.
pub fn forecast<F: Forecaster>(
    forecaster: &F,
    series: &Series,
    horizon: usize,
) -> Result<Forecast, ForecastError> {
    if !(MIN_HORIZON..=MAX_HORIZON).contains(&horizon) {
        return Err(ForecastError::InvalidHorizon {
            requested: horizon,
            min: MIN_HORIZON,
            max: MAX_HORIZON,
        });
    }

    let distinct = timeseries::distinct_timestamps(series).len();
    if distinct < MIN_DISTINCT_TIMESTAMPS {
        return Err(ForecastError::InsufficientData {
            required: MIN_DISTINCT_TIMESTAMPS,
            actual: distinct,
        });
    }

    tracing::info!(model = forecaster.name(), rows = series.len(), distinct, horizon, "Fitting forecast model");

    let model = forecaster.fit(series)?;
    let index = timeseries::make_future_index(series, horizon).ok_or_else(|| {
        ForecastError::Model(format!("forecasting {} weeks runs past the supported date range", horizon))
    })?;
    let mut points = model.predict(&index)?;

    if points.len() != index.len() {
        return Err(ForecastError::Model(format!(
            "model returned {} points for an index of {}",
            points.len(),
            index.len()
        )));
    }

    points.sort_by_key(|p| p.timestamp);

    tracing::debug!(points = points.len(), "Forecast complete");
    Ok(Forecast { points, horizon })
}
