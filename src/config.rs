//! Command-line and environment configuration.
//!
//! Precedence: flag, then environment (a `.env` file is loaded first),
//! then the built-in defaults from [`InsightSettings::default`].

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::llm::{self, InsightSettings};

#[derive(Debug, Parser)]
#[command(name = "sales-forecaster", version, about = "Forecast sales from a CSV and ask a local LLM for insights")]
pub struct Cli {
    #[command(flatten)]
    pub endpoint: EndpointArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct EndpointArgs {
    /// Inference endpoint URL (Ollama generate route)
    #[arg(long, global = true, env = "SALES_FORECASTER_ENDPOINT", default_value = llm::DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Model identifier sent with each request
    #[arg(long, global = true, env = "SALES_FORECASTER_MODEL", default_value = llm::DEFAULT_MODEL)]
    pub model: String,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "SALES_FORECASTER_TIMEOUT_SECS", default_value_t = llm::DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl EndpointArgs {
    pub fn settings(&self) -> InsightSettings {
        InsightSettings {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ColumnArgs {
    /// Column holding the dates
    #[arg(long, default_value = "Date")]
    pub date_column: String,

    /// Column holding the sales / target values
    #[arg(long, default_value = "Sales")]
    pub value_column: String,

    /// Width of the forecast uncertainty band, strictly between 0 and 1
    #[arg(long, default_value_t = 0.80, value_parser = parse_interval_width)]
    pub interval_width: f64,
}

fn parse_interval_width(raw: &str) -> Result<f64, String> {
    let width: f64 = raw.parse().map_err(|_| format!("'{}' is not a number", raw))?;
    if width > 0.0 && width < 1.0 {
        Ok(width)
    } else {
        Err(format!("interval width must be between 0 and 1 (exclusive), got {}", width))
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load a CSV, forecast, and optionally ask for insights
    Run {
        /// CSV file with a header row
        #[arg(long, short)]
        file: PathBuf,

        #[command(flatten)]
        columns: ColumnArgs,

        /// Number of future weeks to forecast (1-52)
        #[arg(long, short, default_value_t = 12)]
        periods: usize,

        /// Send the analysis prompt to the inference endpoint
        #[arg(long)]
        ask: bool,

        /// Write the forecast to this path (.csv or .json)
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Interactive session
    Shell {
        #[command(flatten)]
        columns: ColumnArgs,
    },
    /// Check the endpoint is up and the model is available
    Check,
    /// List models available on the endpoint
    Models,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["sales-forecaster", "run", "--file", "sales.csv"]).unwrap();
        let settings = cli.endpoint.settings();

        // env vars could override; only assert when unset
        if std::env::var("SALES_FORECASTER_MODEL").is_err() {
            assert_eq!(settings.model, "llama3.2");
        }

        match cli.command {
            Command::Run { file, columns, periods, ask, export } => {
                assert_eq!(file, PathBuf::from("sales.csv"));
                assert_eq!(columns.date_column, "Date");
                assert_eq!(columns.value_column, "Sales");
                assert_eq!(periods, 12);
                assert!(!ask);
                assert!(export.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_interval_width_range() {
        let parse = |width: &str| {
            Cli::try_parse_from(["sales-forecaster", "shell", "--interval-width", width]).map(|cli| match cli.command {
                Command::Shell { columns } => columns.interval_width,
                other => panic!("unexpected command: {:?}", other),
            })
        };

        assert_eq!(parse("0.95").unwrap(), 0.95);
        for bad in ["5.0", "-1", "0", "1", "NaN", "wide"] {
            assert!(parse(bad).is_err(), "accepted {}", bad);
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sales-forecaster",
            "check",
            "--endpoint",
            "http://127.0.0.1:9999/api/generate",
            "--timeout-secs",
            "5",
        ])
        .unwrap();

        let settings = cli.endpoint.settings();
        assert_eq!(settings.endpoint, "http://127.0.0.1:9999/api/generate");
        assert_eq!(settings.timeout_secs, 5);
        assert!(matches!(cli.command, Command::Check));
    }
}
