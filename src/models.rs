use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Cleaned observations in upload order.
/// Duplicated timestamps are kept; call `sorted()` before anything order-sensitive.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Series {
    pub points: Vec<DataPoint>,
}

impl Series {
    pub fn new(points: Vec<DataPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Stable chronological copy (rows sharing a timestamp keep upload order)
    pub fn sorted(&self) -> Series {
        let mut points = self.points.clone();
        points.sort_by_key(|p| p.timestamp);
        Series { points }
    }

    /// Last `n` points in chronological order
    pub fn tail(&self, n: usize) -> Vec<DataPoint> {
        let sorted = self.sorted();
        let start = sorted.points.len().saturating_sub(n);
        sorted.points[start..].to_vec()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastPoint {
    #[serde(rename = "ds")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "yhat")]
    pub point: f64,
    #[serde(rename = "yhat_lower")]
    pub lower: f64,
    #[serde(rename = "yhat_upper")]
    pub upper: f64,
}

/// Fitted history followed by `horizon` future points.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
    pub horizon: usize,
}

impl Forecast {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Only the predicted periods after the last observation
    pub fn future(&self) -> &[ForecastPoint] {
        let start = self.points.len().saturating_sub(self.horizon);
        &self.points[start..]
    }

    pub fn tail(&self, n: usize) -> &[ForecastPoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }
}
