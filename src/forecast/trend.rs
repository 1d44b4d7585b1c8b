//! Linear trend model with residual-based uncertainty bands.
//!
//! Fits `y = intercept + slope * t` by ordinary least squares, where `t` is
//! the number of days since the first observation. Interval half-width is
//! `z * sigma * sqrt(1 + weeks_ahead / n)`, so bands widen past the last
//! observation and are never crossing.

use super::{FittedModel, Forecaster};
use crate::core::timeseries::days_since;
use crate::error::ForecastError;
use crate::models::{ForecastPoint, Series};
use chrono::{DateTime, Utc};

const DAYS_PER_PERIOD: f64 = 7.0;

#[derive(Debug, Clone)]
pub struct LinearTrendForecaster {
    /// Coverage of the uncertainty band (e.g. 0.80 for 80%)
    pub interval_width: f64,
}

impl Default for LinearTrendForecaster {
    fn default() -> Self {
        Self { interval_width: 0.80 }
    }
}

impl LinearTrendForecaster {
    pub fn with_interval_width(interval_width: f64) -> Self {
        Self { interval_width }
    }

    fn z_score(&self) -> f64 {
        match self.interval_width {
            x if x >= 0.99 => 2.576,
            x if x >= 0.95 => 1.96,
            x if x >= 0.90 => 1.645,
            _ => 1.282,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LinearTrendModel {
    origin: DateTime<Utc>,
    last_day: f64,
    intercept: f64,
    slope: f64,
    sigma: f64,
    n_observations: usize,
    z: f64,
}

#[cfg(test)]
impl LinearTrendModel {
    fn slope_per_day(&self) -> f64 {
        self.slope
    }

    fn residual_std(&self) -> f64 {
        self.sigma
    }
}

impl Forecaster for LinearTrendForecaster {
    type Model = LinearTrendModel;

    fn name(&self) -> &str {
        "linear_trend"
    }

    fn fit(&self, series: &Series) -> Result<LinearTrendModel, ForecastError> {
        let sorted = series.sorted();
        let origin = sorted
            .points
            .first()
            .map(|p| p.timestamp)
            .ok_or_else(|| ForecastError::Model("empty series".to_string()))?;

        if sorted.points.iter().any(|p| !p.value.is_finite()) {
            return Err(ForecastError::Model("series contains non-finite values".to_string()));
        }

        let xs: Vec<f64> = sorted.points.iter().map(|p| days_since(origin, p.timestamp)).collect();
        let ys = sorted.values();
        let n = xs.len() as f64;

        let mean_x = xs.iter().sum::<f64>() / n;
        let mean_y = ys.iter().sum::<f64>() / n;

        let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
        let sxy: f64 = xs.iter().zip(&ys).map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();

        if sxx.abs() < 1e-10 {
            return Err(ForecastError::Model("singular design: all observations share one date".to_string()));
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let ss_res: f64 = xs
            .iter()
            .zip(&ys)
            .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
            .sum();
        let dof = xs.len().saturating_sub(2).max(1) as f64;
        let sigma = (ss_res / dof).sqrt();

        let last_day = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        tracing::debug!(slope, intercept, sigma, "Linear trend fitted");

        Ok(LinearTrendModel {
            origin,
            last_day,
            intercept,
            slope,
            sigma,
            n_observations: xs.len(),
            z: self.z_score(),
        })
    }
}

impl FittedModel for LinearTrendModel {
    fn predict(&self, index: &[DateTime<Utc>]) -> Result<Vec<ForecastPoint>, ForecastError> {
        let n = self.n_observations as f64;

        index
            .iter()
            .map(|&timestamp| {
                let t = days_since(self.origin, timestamp);
                let point = self.intercept + self.slope * t;
                let weeks_ahead = ((t - self.last_day) / DAYS_PER_PERIOD).max(0.0);
                let half_width = self.z * self.sigma * (1.0 + weeks_ahead / n).sqrt();

                if !point.is_finite() || !half_width.is_finite() {
                    return Err(ForecastError::Model(format!("non-finite prediction at {}", timestamp)));
                }

                Ok(ForecastPoint {
                    timestamp,
                    point,
                    lower: point - half_width,
                    upper: point + half_width,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DataPoint;
    use chrono::{Duration, NaiveDate};

    fn start() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap().and_utc()
    }

    fn weekly(values: &[f64]) -> Series {
        Series::new(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| DataPoint { timestamp: start() + Duration::weeks(i as i64), value: v })
                .collect(),
        )
    }

    #[test]
    fn test_perfect_line() {
        // +7 per week = +1 per day
        let series = weekly(&[10.0, 17.0, 24.0, 31.0]);
        let model = LinearTrendForecaster::default().fit(&series).unwrap();

        assert!((model.slope_per_day() - 1.0).abs() < 1e-9);
        assert!(model.residual_std() < 1e-9);

        let next = start() + Duration::weeks(4);
        let pred = model.predict(&[next]).unwrap();
        assert!((pred[0].point - 38.0).abs() < 1e-9);
        assert!((pred[0].upper - pred[0].lower).abs() < 1e-9);
    }

    #[test]
    fn test_bands_widen_with_horizon() {
        let series = weekly(&[10.0, 14.0, 11.0, 16.0, 13.0, 18.0]);
        let model = LinearTrendForecaster::default().fit(&series).unwrap();

        let last = start() + Duration::weeks(5);
        let preds = model
            .predict(&[last, last + Duration::weeks(1), last + Duration::weeks(10)])
            .unwrap();

        let widths: Vec<f64> = preds.iter().map(|p| p.upper - p.lower).collect();
        assert!(widths[0] > 0.0);
        assert!(widths[0] < widths[1]);
        assert!(widths[1] < widths[2]);
        for p in &preds {
            assert!(p.lower <= p.point && p.point <= p.upper);
        }
    }

    #[test]
    fn test_wider_interval_for_higher_coverage() {
        let series = weekly(&[10.0, 14.0, 11.0, 16.0, 13.0]);
        let at = [start() + Duration::weeks(6)];

        let narrow = LinearTrendForecaster::default().fit(&series).unwrap().predict(&at).unwrap();
        let wide = LinearTrendForecaster::with_interval_width(0.95).fit(&series).unwrap().predict(&at).unwrap();

        assert!(wide[0].upper - wide[0].lower > narrow[0].upper - narrow[0].lower);
    }

    #[test]
    fn test_single_date_is_singular() {
        let mut series = weekly(&[1.0]);
        series.points.push(DataPoint { timestamp: start(), value: 2.0 });

        let err = LinearTrendForecaster::default().fit(&series).unwrap_err();
        assert!(matches!(err, ForecastError::Model(_)));
    }

    #[test]
    fn test_empty_series() {
        assert!(LinearTrendForecaster::default().fit(&Series::default()).is_err());
    }
}
