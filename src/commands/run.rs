use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::analysis::statistics;
use crate::config::ColumnArgs;
use crate::core::session::Session;
use crate::forecast::LinearTrendForecaster;
use crate::ingest;
use crate::llm::ollama::OllamaClient;
use crate::llm::InsightSettings;
use crate::report;

/// One-shot pipeline: load, describe, forecast, show prompt, optionally ask.
pub async fn run(
    file: &Path,
    columns: &ColumnArgs,
    periods: usize,
    ask: bool,
    export: Option<&Path>,
    settings: &InsightSettings,
) -> Result<()> {
    let mut session = Session::new();

    let table = ingest::load_csv(file).with_context(|| format!("Could not load {}", file.display()))?;
    println!("## Uploaded Data Preview\n{}", report::preview(&table));

    let series = session.load(table, &columns.date_column, &columns.value_column)?;
    if let Some(summary) = statistics::describe(series) {
        println!("## Data Overview\n{}", report::overview(&summary));
    }
    println!("## Historical Trend\n{}", report::trend(series));

    let forecaster = LinearTrendForecaster::with_interval_width(columns.interval_width);
    let forecast = session.run_forecast(&forecaster, periods)?;
    println!("## Predicted Sales\n{}", report::forecast_table(forecast));

    if let Some(path) = export {
        report::export_forecast(forecast, path)?;
        println!("Forecast written to {}\n", path.display());
    }

    println!("## Prompt\n{}", session.prompt()?);

    if !ask {
        return Ok(());
    }

    let client = OllamaClient::new(settings.clone())?;
    let result = session.ask_insights(&client).await?;

    match result.text() {
        Some(text) => {
            println!("## LLM Insights\n{}", text);
            Ok(())
        }
        None => bail!("{}", result),
    }
}
