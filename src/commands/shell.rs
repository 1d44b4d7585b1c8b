//! Interactive session: one command per line, each run to completion.

use anyhow::Result;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::analysis::statistics;
use crate::config::ColumnArgs;
use crate::core::session::Session;
use crate::forecast::LinearTrendForecaster;
use crate::ingest;
use crate::llm::{InsightProvider, InsightResult};
use crate::report;

const HELP: &str = "\
Commands:
  load <file.csv> [date_column] [value_column]   load and validate data
  columns                                        list columns of the loaded file
  preview                                        first rows of the loaded file
  overview                                       summary statistics and trend
  forecast [weeks]                               fit and forecast (default 12)
  prompt                                         show the analysis prompt
  ask                                            ask the LLM for insights
  export <path>                                  write the forecast (.csv/.json)
  status                                         what has been run so far
  help                                           this message
  quit                                           leave
";

const DEFAULT_PERIODS: usize = 12;

pub enum Outcome {
    Continue(String),
    Quit,
}

pub struct Shell {
    session: Session,
    columns: ColumnArgs,
    provider: Box<dyn InsightProvider>,
}

impl Shell {
    pub fn new(columns: ColumnArgs, provider: Box<dyn InsightProvider>) -> Self {
        Self { session: Session::new(), columns, provider }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run one command line. Failures become output text; nothing escapes.
    pub async fn execute(&mut self, line: &str) -> Outcome {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&cmd, args)) = parts.split_first() else {
            return Outcome::Continue(String::new());
        };

        let output = match cmd {
            "quit" | "exit" => return Outcome::Quit,
            "help" => HELP.to_string(),
            "load" => self.load(args),
            "columns" => match self.session.table() {
                Some(table) => format!("{}\n", table.headers.join(", ")),
                None => "No file loaded.\n".to_string(),
            },
            "preview" => match self.session.table() {
                Some(table) => report::preview(table),
                None => "No file loaded.\n".to_string(),
            },
            "overview" => self.overview(),
            "forecast" => self.forecast(args),
            "prompt" => match self.session.prompt() {
                Ok(prompt) => prompt.to_string(),
                Err(e) => format!("⚠️ {}\n", e),
            },
            "ask" => self.ask().await,
            "export" => self.export(args),
            "status" => self.status(),
            other => format!("Unknown command '{}'. Type 'help'.\n", other),
        };

        Outcome::Continue(output)
    }

    fn load(&mut self, args: &[&str]) -> String {
        let Some(path) = args.first() else {
            return "Usage: load <file.csv> [date_column] [value_column]\n".to_string();
        };
        let date = args.get(1).copied().unwrap_or(self.columns.date_column.as_str()).to_string();
        let value = args.get(2).copied().unwrap_or(self.columns.value_column.as_str()).to_string();

        let table = match ingest::load_csv(Path::new(path)) {
            Ok(table) => table,
            Err(e) => return format!("❌ {}\n", e),
        };

        match self.session.load(table, &date, &value) {
            Ok(series) => format!("Loaded {} rows ({} = date, {} = value)\n", series.len(), date, value),
            Err(e) => format!("❌ {}\n", e),
        }
    }

    fn overview(&self) -> String {
        let Some(series) = self.session.series() else {
            return "No file loaded.\n".to_string();
        };
        match statistics::describe(series) {
            Some(summary) => format!("{}\n{}", report::overview(&summary), report::trend(series)),
            None => "No usable rows.\n".to_string(),
        }
    }

    fn forecast(&mut self, args: &[&str]) -> String {
        let periods = match args.first() {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) => n,
                Err(_) => return format!("❌ '{}' is not a number of weeks\n", raw),
            },
            None => DEFAULT_PERIODS,
        };

        let forecaster = LinearTrendForecaster::with_interval_width(self.columns.interval_width);
        match self.session.run_forecast(&forecaster, periods) {
            Ok(forecast) => format!("✅ Forecast completed!\n{}", report::forecast_table(forecast)),
            Err(e) => format!("❌ {}\n", e),
        }
    }

    async fn ask(&mut self) -> String {
        match self.session.ask_insights(self.provider.as_ref()).await {
            Ok(InsightResult::Text(text)) if text.is_fallback() => {
                format!("💡 LLM Insights (unrecognized reply format, showing raw reply)\n{}\n", text.content)
            }
            Ok(InsightResult::Text(text)) => format!("💡 LLM Insights\n{}\n", text.content),
            Ok(failure) => format!("{}\n", failure),
            Err(e) => format!("⚠️ {}\n", e),
        }
    }

    fn export(&self, args: &[&str]) -> String {
        let Some(path) = args.first() else {
            return "Usage: export <path>\n".to_string();
        };
        let Some(forecast) = self.session.forecast() else {
            return "⚠️ Please run the forecast first.\n".to_string();
        };
        match report::export_forecast(forecast, Path::new(path)) {
            Ok(()) => format!("Forecast written to {}\n", path),
            Err(e) => format!("❌ {:#}\n", e),
        }
    }

    fn status(&self) -> String {
        let mark = |done: bool| if done { "yes" } else { "no" };
        let insight = match self.session.last_insight() {
            Some(result) => result.kind(),
            None => "none",
        };
        format!(
            "data loaded: {}\nforecast: {}\nprompt: {}\nlast insight: {}\n",
            mark(self.session.has_series()),
            mark(self.session.has_forecast()),
            mark(self.session.has_prompt()),
            insight
        )
    }
}

/// Read commands from stdin until `quit` or end of input
pub async fn run(columns: ColumnArgs, provider: Box<dyn InsightProvider>) -> Result<()> {
    let mut shell = Shell::new(columns, provider);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    stdout.write_all(b"Sales forecasting & AI insights. Type 'help' for commands.\n").await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match shell.execute(&line).await {
            Outcome::Continue(output) => stdout.write_all(output.as_bytes()).await?,
            Outcome::Quit => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{AnswerSource, InsightRequest, InsightText};
    use async_trait::async_trait;
    use std::io::Write;

    struct Fixed(InsightResult);

    #[async_trait]
    impl InsightProvider for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn ask(&self, _request: &InsightRequest) -> InsightResult {
            self.0.clone()
        }
    }

    fn columns() -> ColumnArgs {
        ColumnArgs { date_column: "Date".to_string(), value_column: "Sales".to_string(), interval_width: 0.8 }
    }

    fn csv_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Date,Sales,Store").unwrap();
        for week in 0..10 {
            writeln!(file, "2024-01-{:02},{},A", 1 + week * 3 % 28, 100 + week * 5).unwrap();
        }
        file
    }

    async fn exec(shell: &mut Shell, line: &str) -> String {
        match shell.execute(line).await {
            Outcome::Continue(out) => out,
            Outcome::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test]
    async fn test_ask_before_forecast_warns() {
        let mut shell = Shell::new(columns(), Box::new(Fixed(InsightResult::Server { status: 500, body: String::new() })));
        let out = exec(&mut shell, "ask").await;
        assert!(out.contains("Please run the forecast first."));
    }

    #[tokio::test]
    async fn test_full_flow() {
        let file = csv_file();
        let reply = InsightResult::Text(InsightText { content: "Grow sales.".to_string(), source: AnswerSource::Response });
        let mut shell = Shell::new(columns(), Box::new(Fixed(reply)));

        let out = exec(&mut shell, &format!("load {}", file.path().display())).await;
        assert!(out.starts_with("Loaded 10 rows"), "{}", out);

        let out = exec(&mut shell, "forecast 6").await;
        assert!(out.contains("Forecast completed"));
        assert_eq!(shell.session().forecast().unwrap().future().len(), 6);

        let out = exec(&mut shell, "prompt").await;
        assert!(out.contains("business analyst"));

        let out = exec(&mut shell, "ask").await;
        assert!(out.contains("Grow sales."));

        let out = exec(&mut shell, "status").await;
        assert!(out.contains("forecast: yes"));
        assert!(out.contains("last insight: success"));
    }

    #[tokio::test]
    async fn test_server_failure_is_reported_and_forecast_kept() {
        let file = csv_file();
        let failure = InsightResult::Server { status: 500, body: "internal error".to_string() };
        let mut shell = Shell::new(columns(), Box::new(Fixed(failure)));

        exec(&mut shell, &format!("load {}", file.path().display())).await;
        exec(&mut shell, "forecast").await;

        let out = exec(&mut shell, "ask").await;
        assert!(out.contains("500"));
        assert!(out.contains("internal error"));
        assert!(shell.session().has_forecast());
    }

    #[tokio::test]
    async fn test_bad_input_is_not_fatal() {
        let mut shell = Shell::new(columns(), Box::new(Fixed(InsightResult::Server { status: 500, body: String::new() })));

        assert!(exec(&mut shell, "load /definitely/not/here.csv").await.starts_with("❌"));
        assert!(exec(&mut shell, "forecast ten").await.contains("not a number"));
        assert!(exec(&mut shell, "forecast").await.contains("No data loaded"));
        assert!(exec(&mut shell, "dance").await.contains("Unknown command"));
        assert_eq!(exec(&mut shell, "   ").await, "");
    }

    #[tokio::test]
    async fn test_missing_column_reported() {
        let file = csv_file();
        let mut shell = Shell::new(columns(), Box::new(Fixed(InsightResult::Server { status: 500, body: String::new() })));

        let out = exec(&mut shell, &format!("load {} Date Revenue", file.path().display())).await;
        assert!(out.contains("Column 'Revenue' not found"));
        assert!(!shell.session().has_series());
    }

    #[tokio::test]
    async fn test_quit() {
        let mut shell = Shell::new(columns(), Box::new(Fixed(InsightResult::Server { status: 500, body: String::new() })));
        assert!(matches!(shell.execute("quit").await, Outcome::Quit));
    }
}
