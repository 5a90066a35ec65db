// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

mod csv_source;

use clap::{Args, Parser, Subcommand};
use csv_source::CsvSource;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;
use tsa_core::{TracingTelemetry, TsaError};
use tsa_pipeline::{AnalysisConfig, AnalysisRequest, DataSource, Pipeline};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Tsa(#[from] TsaError),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Tsa(err) => err.code(),
            Self::Io { .. } => "io_error",
            Self::Json { .. } => "json_error",
            Self::InvalidInput(_) => "invalid_input",
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "tsa",
    version,
    about = "Statistical summaries, change points and anomaly flags for sensor CSV exports"
)]
struct Cli {
    /// Tracing filter directive; overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the sensor columns of a CSV export.
    Columns(ColumnsArgs),
    /// Cleaned, resampled series with a moving average.
    Series(QueryArgs),
    /// Full analysis: statistics, change points, trend, anomalies, baseline.
    Analyze(AnalyzeArgs),
    /// Percentile baseline bands only.
    Baseline(BaselineArgs),
}

#[derive(Debug, Args)]
struct ColumnsArgs {
    #[arg(long)]
    input: PathBuf,
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct QueryArgs {
    #[arg(long)]
    input: PathBuf,
    #[arg(long)]
    column: String,
    #[arg(long)]
    start: String,
    #[arg(long)]
    end: String,
    /// JSON list of `{"start":..,"end":..}` ranges to drop.
    #[arg(long)]
    exclude: Option<String>,
    #[arg(long)]
    resample_points: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// JSON analysis config; flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    #[command(flatten)]
    query: QueryArgs,
    #[arg(long, default_value_t = tsa_pipeline::DEFAULT_WINDOW_SIZE)]
    window_size: usize,
}

#[derive(Debug, Args)]
struct BaselineArgs {
    #[command(flatten)]
    query: QueryArgs,
    /// Comma-separated percentiles, e.g. `5,10,90`.
    #[arg(long)]
    percentiles: Option<String>,
}

#[derive(Serialize)]
struct ColumnsOutput {
    columns: Vec<String>,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Serialize)]
struct ErrorPayload {
    code: String,
    message: String,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = init_tracing(cli.log_level.as_deref()) {
        emit_structured_error(&err);
        process::exit(1);
    }
    if let Err(err) = run(cli.command) {
        tracing::error!(code = err.code(), %err, "command failed");
        emit_structured_error(&err);
        process::exit(1);
    }
}

fn init_tracing(log_level: Option<&str>) -> Result<(), CliError> {
    let filter = match log_level {
        Some(directive) => EnvFilter::try_new(directive)
            .map_err(|err| CliError::invalid_input(format!("invalid --log-level: {err}")))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Columns(args) => {
            let source = CsvSource::open(&args.input)?;
            let output = ColumnsOutput {
                columns: source.columns()?,
            };
            write_json_output(&output, args.output.as_deref())
        }
        Command::Series(args) => {
            let source = CsvSource::open(&args.input)?;
            let request = build_request(&args, BTreeMap::new())?;
            let config = load_config(&args)?;
            let telemetry = TracingTelemetry;
            let pipeline = Pipeline::new(config)?.with_telemetry_sink(&telemetry);
            let view = pipeline.series_view(&source, &request)?;
            write_json_output(&view, args.output.as_deref())
        }
        Command::Analyze(args) => {
            let source = CsvSource::open(&args.query.input)?;
            let extra = BTreeMap::from([("window_size".to_string(), args.window_size.to_string())]);
            let request = build_request(&args.query, extra)?;
            let config = load_config(&args.query)?;
            let telemetry = TracingTelemetry;
            let pipeline = Pipeline::new(config)?.with_telemetry_sink(&telemetry);
            let report = pipeline.analyze(&source, &request)?;
            write_json_output(&report, args.query.output.as_deref())
        }
        Command::Baseline(args) => {
            let source = CsvSource::open(&args.query.input)?;
            let mut extra = BTreeMap::new();
            if let Some(percentiles) = &args.percentiles {
                extra.insert("percentiles".to_string(), percentiles.clone());
            }
            let request = build_request(&args.query, extra)?;
            let config = load_config(&args.query)?;
            let telemetry = TracingTelemetry;
            let pipeline = Pipeline::new(config)?.with_telemetry_sink(&telemetry);
            let report = pipeline.detect_baseline(&source, &request)?;
            write_json_output(&report, args.query.output.as_deref())
        }
    }
}

/// Maps flags onto the string parameters accepted by
/// [`AnalysisRequest::from_params`].
fn build_request(
    args: &QueryArgs,
    extra: BTreeMap<String, String>,
) -> Result<AnalysisRequest, CliError> {
    let mut params = extra;
    params.insert("column".to_string(), args.column.clone());
    params.insert("start_date".to_string(), args.start.clone());
    params.insert("end_date".to_string(), args.end.clone());
    if let Some(points) = args.resample_points {
        params.insert("resample_points".to_string(), points.to_string());
    }
    if let Some(exclude) = &args.exclude {
        params.insert("exclude_ranges".to_string(), exclude.clone());
    }
    Ok(AnalysisRequest::from_params(&params)?)
}

fn load_config(args: &QueryArgs) -> Result<AnalysisConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|source| {
                CliError::io(format!("failed to read '{}'", path.display()), source)
            })?;
            AnalysisConfig::from_json(&raw)?
        }
        None => AnalysisConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.resample.seed = seed;
    }
    Ok(config)
}

fn write_json_output<T: Serialize>(
    payload: &T,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let encoded = serde_json::to_string_pretty(payload)
        .map_err(|source| CliError::json("failed to serialize JSON output", source))?;

    if let Some(path) = output_path {
        fs::write(path, format!("{encoded}\n"))
            .map_err(|source| CliError::io(format!("failed to write '{}'", path.display()), source))
    } else {
        println!("{encoded}");
        Ok(())
    }
}

fn emit_structured_error(err: &CliError) {
    let envelope = ErrorEnvelope {
        error: ErrorPayload {
            code: err.code().to_string(),
            message: err.to_string(),
        },
    };

    match serde_json::to_string_pretty(&envelope) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!(
            "{{\"error\":{{\"code\":\"{}\",\"message\":\"{}\"}}}}",
            err.code(),
            err
        ),
    }
}
