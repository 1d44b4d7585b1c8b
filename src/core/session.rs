//! Per-run state carried between user actions.
//!
//! Each action takes the session explicitly. Derived state is only replaced
//! by re-running the step that produced it; loading new data clears it.

use crate::error::SessionError;
use crate::forecast::{self, Forecaster};
use crate::ingest::{self, Table};
use crate::llm::{InsightProvider, InsightRequest, InsightResult};
use crate::models::{Forecast, Series};

#[derive(Debug, Default)]
pub struct Session {
    table: Option<Table>,
    series: Option<Series>,
    forecast: Option<Forecast>,
    prompt: Option<InsightRequest>,
    last_insight: Option<InsightResult>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_series(&self) -> bool {
        self.series.is_some()
    }

    pub fn has_forecast(&self) -> bool {
        self.forecast.is_some()
    }

    pub fn has_prompt(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn series(&self) -> Option<&Series> {
        self.series.as_ref()
    }

    pub fn forecast(&self) -> Option<&Forecast> {
        self.forecast.as_ref()
    }

    pub fn last_insight(&self) -> Option<&InsightResult> {
        self.last_insight.as_ref()
    }

    /// Validate an uploaded table and make it the session's data.
    ///
    /// On failure the previous data and forecast are kept.
    pub fn load(&mut self, table: Table, date_field: &str, value_field: &str) -> Result<&Series, SessionError> {
        let series = ingest::validate(&table, date_field, value_field)?;

        tracing::info!(rows = table.rows.len(), kept = series.len(), "Series loaded");

        self.table = Some(table);
        self.forecast = None;
        self.prompt = None;
        self.last_insight = None;
        Ok(self.series.insert(series))
    }

    /// Fit and predict, replacing any earlier forecast, and prepare the prompt.
    pub fn run_forecast<F: Forecaster>(&mut self, forecaster: &F, periods: usize) -> Result<&Forecast, SessionError> {
        let series = self.series.as_ref().ok_or(SessionError::NoData)?;
        let result = forecast::forecast(forecaster, series, periods)?;

        self.prompt = Some(InsightRequest::from_results(series, &result));
        self.last_insight = None;
        Ok(self.forecast.insert(result))
    }

    pub fn prompt(&self) -> Result<&InsightRequest, SessionError> {
        self.prompt.as_ref().ok_or(SessionError::ForecastNotRun)
    }

    /// Send the cached prompt. The forecast is untouched whatever the outcome.
    pub async fn ask_insights(&mut self, provider: &dyn InsightProvider) -> Result<&InsightResult, SessionError> {
        let prompt = self.prompt.as_ref().ok_or(SessionError::ForecastNotRun)?;

        let result = provider.ask(prompt).await;
        tracing::info!(provider = provider.name(), outcome = result.kind(), "Insight request finished");

        Ok(self.last_insight.insert(result))
    }
}
