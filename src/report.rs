//! Terminal rendering and forecast export.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;

use crate::analysis::statistics::SeriesSummary;
use crate::core::timeseries::sparkline;
use crate::ingest::Table;
use crate::models::{Forecast, Series};

pub const PREVIEW_ROWS: usize = 5;

fn markdown_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "| {} |", headers.join(" | "));
    let _ = writeln!(out, "|{}", headers.iter().map(|h| format!("{}|", "-".repeat(h.len() + 2))).collect::<String>());
    for row in rows {
        let _ = writeln!(out, "| {} |", row.join(" | "));
    }
    out
}

/// First rows of the uploaded table, all columns
pub fn preview(table: &Table) -> String {
    let headers: Vec<&str> = table.headers.iter().map(String::as_str).collect();
    let rows: Vec<Vec<String>> = table
        .head(PREVIEW_ROWS)
        .into_iter()
        .map(|cells| cells.into_iter().map(String::from).collect())
        .collect();
    markdown_table(&headers, &rows)
}

pub fn overview(summary: &SeriesSummary) -> String {
    let rows = [
        ("mean", summary.mean),
        ("std", summary.std),
        ("min", summary.min),
        ("25%", summary.q25),
        ("50%", summary.median),
        ("75%", summary.q75),
        ("max", summary.max),
    ];

    let mut out = format!("{:<6} {:>14}\n", "count", summary.count);
    for (label, value) in rows {
        let _ = writeln!(out, "{:<6} {:>14.2}", label, value);
    }
    out
}

/// Historical trend in one glance: range, endpoints and a sparkline
pub fn trend(series: &Series) -> String {
    let sorted = series.sorted();
    let (Some(first), Some(last)) = (sorted.points.first(), sorted.points.last()) else {
        return "No data points.\n".to_string();
    };

    format!(
        "{} → {} ({} points)\n{:.2} → {:.2}\n{}\n",
        first.timestamp.format("%Y-%m-%d"),
        last.timestamp.format("%Y-%m-%d"),
        sorted.len(),
        first.value,
        last.value,
        sparkline(&sorted.points)
    )
}

/// Future periods only, like the "Predicted Sales" table
pub fn forecast_table(forecast: &Forecast) -> String {
    let rows: Vec<Vec<String>> = forecast
        .future()
        .iter()
        .map(|p| {
            vec![
                p.timestamp.format("%Y-%m-%d").to_string(),
                format!("{:.2}", p.point),
                format!("{:.2}", p.lower),
                format!("{:.2}", p.upper),
            ]
        })
        .collect();
    markdown_table(&["ds", "yhat", "yhat_lower", "yhat_upper"], &rows)
}

/// Write the full forecast as JSON (`.json`) or CSV (anything else)
pub fn export_forecast(forecast: &Forecast, path: &Path) -> Result<()> {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        let json = serde_json::to_string_pretty(&forecast.points)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    } else {
        let mut writer = csv::Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))?;
        writer.write_record(["ds", "yhat", "yhat_lower", "yhat_upper"])?;
        for p in &forecast.points {
            writer.write_record([
                p.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                p.point.to_string(),
                p.lower.to_string(),
                p.upper.to_string(),
            ])?;
        }
        writer.flush()?;
    }

    tracing::info!(path = %path.display(), points = forecast.len(), "Forecast exported");
    Ok(())
}
