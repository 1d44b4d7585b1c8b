use crate::models::{DataPoint, Forecast, ForecastPoint, Series};
use chrono::{DateTime, Timelike, Utc};
use std::fmt;

/// Points of history and of forecast embedded in a prompt
pub const WINDOW: usize = 8;

/// Prompt text sent to the inference endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightRequest {
    text: String,
}

impl InsightRequest {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Prompt from the last `WINDOW` observations and forecast points
    pub fn from_results(series: &Series, forecast: &Forecast) -> Self {
        build(&series.tail(WINDOW), forecast.tail(WINDOW))
    }
}

impl fmt::Display for InsightRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn format_date(ts: &DateTime<Utc>) -> String {
    if ts.num_seconds_from_midnight() == 0 {
        ts.format("%Y-%m-%d").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M").to_string()
    }
}

fn last<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

/// Build the analysis prompt.
///
/// Inputs are expected in chronological order; only the last `WINDOW` of
/// each are used. Nothing but these two snapshots goes into the text.
pub fn build(recent_history: &[DataPoint], forecast_tail: &[ForecastPoint]) -> InsightRequest {
    let history_rows: Vec<String> = last(recent_history, WINDOW)
        .iter()
        .map(|dp| format!("| {} | {:.2} |", format_date(&dp.timestamp), dp.value))
        .collect();

    let forecast_rows: Vec<String> = last(forecast_tail, WINDOW)
        .iter()
        .map(|fp| {
            format!(
                "| {} | {:.2} | {:.2} | {:.2} |",
                format_date(&fp.timestamp),
                fp.point,
                fp.lower,
                fp.upper
            )
        })
        .collect();

    let text = format!(
        r#"You are a business analyst AI.
Based on the past and forecasted sales data below, provide:
1. A short summary of the forecast (2-3 sentences)
2. Top 3 actionable steps to improve forecasted margins or revenue
3. Key suggestions for better data collection or feature improvements

### Recent historical data
| Date | Value |
|------|-------|
{}

### Forecasted data
| Date | Forecast | Lower | Upper |
|------|----------|-------|-------|
{}

Be concise and use bullet points.
"#,
        if history_rows.is_empty() { "| None | - |".to_string() } else { history_rows.join("\n") },
        if forecast_rows.is_empty() { "| None | - | - | - |".to_string() } else { forecast_rows.join("\n") }
    );

    InsightRequest { text }
}
