//! `rollbeta` — compute rolling market betas and chart them.
//!
//! Wires fixed run parameters (a ticker list, a benchmark index, a
//! window start date and a sequence of monthly window end dates) into
//! one engine run: populate the price store, compute the beta series,
//! print the result table and write the SVG chart.

use beta_engine::{BetaEngine, DATE_COLUMN, PriceStore, WindowSpec};
use chrono::{Datelike, NaiveDate, Weekday};
use clap::Parser;
use polars::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Deserialize;
use std::path::PathBuf;

/// Default tickers from the reference run: French ADRs against the
/// S&P 500.
const DEFAULT_TICKERS: [&str; 6] = ["SCGLY", "BNPQY", "RNLSY", "LRLCY", "SBGSY", "VEOEY"];

#[derive(Parser)]
#[command(name = "rollbeta")]
#[command(about = "Rolling market-beta computation over monthly windows", long_about = None)]
#[command(version)]
struct Cli {
    /// CSV file of adjusted closes: a `date` column (ISO 8601) plus one
    /// column per symbol. Without it, a seeded random walk is generated
    /// so the program runs offline.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// JSON file overriding the run parameters (tickers, benchmark,
    /// start, first_end, periods).
    #[arg(long)]
    params: Option<PathBuf>,

    /// Tickers to compute betas for.
    #[arg(long, value_delimiter = ',')]
    tickers: Option<Vec<String>>,

    /// Benchmark index symbol.
    #[arg(long)]
    benchmark: Option<String>,

    /// Shared start date of every window.
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Month of the first window end date.
    #[arg(long)]
    first_end: Option<NaiveDate>,

    /// Number of monthly windows.
    #[arg(long)]
    periods: Option<usize>,

    /// Directory the chart is written into.
    #[arg(long, default_value = "resultat")]
    out_dir: PathBuf,

    /// Seed for the synthetic price walk.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Skip chart rendering.
    #[arg(long)]
    no_chart: bool,
}

/// Run parameters, overridable from a JSON file and then from flags.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RunParams {
    tickers: Vec<String>,
    benchmark: String,
    start: NaiveDate,
    first_end: NaiveDate,
    periods: usize,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            tickers: DEFAULT_TICKERS.iter().map(|t| (*t).to_string()).collect(),
            benchmark: "^GSPC".to_string(),
            start: NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date"),
            first_end: NaiveDate::from_ymd_opt(2021, 1, 31).expect("valid date"),
            periods: 24,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let params = resolve_params(&cli)?;
    let spec = WindowSpec::monthly(params.start, params.first_end, params.periods)?;

    let frame = match &cli.csv {
        Some(path) => read_prices(path)?,
        None => {
            tracing::info!(seed = cli.seed, "no --csv given, generating synthetic prices");
            let last_end = *spec.end_dates().last().expect("spec is non-empty");
            synthetic_prices(&params, last_end, cli.seed)?
        }
    };
    let mut store = PriceStore::new();
    store.load(frame)?;

    let engine = BetaEngine::new(params.tickers, params.benchmark);
    let series = engine.beta_series(&store, &spec)?;
    println!("{}", series.to_frame()?);

    if !cli.no_chart {
        if series.is_empty() {
            tracing::warn!("every window failed, skipping chart");
        } else {
            let path = beta_chart::save_chart(&series, &cli.out_dir)?;
            println!("chart written to {}", path.display());
        }
    }
    Ok(())
}

/// Defaults, overlaid by the JSON param file, overlaid by flags.
fn resolve_params(cli: &Cli) -> Result<RunParams, Box<dyn std::error::Error>> {
    let mut params = match &cli.params {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => RunParams::default(),
    };
    if let Some(tickers) = &cli.tickers {
        params.tickers = tickers.clone();
    }
    if let Some(benchmark) = &cli.benchmark {
        params.benchmark = benchmark.clone();
    }
    if let Some(start) = cli.start {
        params.start = start;
    }
    if let Some(first_end) = cli.first_end {
        params.first_end = first_end;
    }
    if let Some(periods) = cli.periods {
        params.periods = periods;
    }
    Ok(params)
}

/// Load the adjusted-close table from a CSV file. The `date` column
/// stays a string column; the store validates it on load.
fn read_prices(path: &std::path::Path) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
}

/// Seeded geometric random walk over weekdays, one column per symbol.
///
/// A stand-in for the remote price retrieval collaborator so the
/// program is runnable without network access.
fn synthetic_prices(
    params: &RunParams,
    last_end: NaiveDate,
    seed: u64,
) -> PolarsResult<DataFrame> {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut dates = Vec::new();
    let mut day = params.start;
    while day <= last_end {
        if day.weekday() != Weekday::Sat && day.weekday() != Weekday::Sun {
            dates.push(day.to_string());
        }
        let Some(next) = day.succ_opt() else { break };
        day = next;
    }

    let mut symbols: Vec<&str> = vec![params.benchmark.as_str()];
    for ticker in &params.tickers {
        if !symbols.contains(&ticker.as_str()) {
            symbols.push(ticker.as_str());
        }
    }

    let mut columns = Vec::with_capacity(symbols.len() + 1);
    columns.push(Column::new(DATE_COLUMN.into(), dates.clone()));
    for symbol in symbols {
        let mut price = rng.gen_range(20.0..200.0);
        let walk: Vec<f64> = dates
            .iter()
            .map(|_| {
                price *= 1.0 + rng.gen_range(-0.02..0.02);
                price
            })
            .collect();
        columns.push(Column::new(symbol.into(), walk));
    }
    DataFrame::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_match_reference_run() {
        let params = RunParams::default();
        assert_eq!(params.tickers.len(), 6);
        assert_eq!(params.benchmark, "^GSPC");
        assert_eq!(params.periods, 24);
        assert_eq!(params.start, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    }

    #[test]
    fn test_params_file_overrides_defaults() {
        let json = r#"{"benchmark": "^FCHI", "periods": 6}"#;
        let params: RunParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.benchmark, "^FCHI");
        assert_eq!(params.periods, 6);
        // Unspecified fields keep their defaults.
        assert_eq!(params.tickers.len(), 6);
    }

    #[test]
    fn test_synthetic_prices_cover_the_run() {
        let params = RunParams::default();
        let last_end = NaiveDate::from_ymd_opt(2022, 12, 31).unwrap();
        let frame = synthetic_prices(&params, last_end, 7).unwrap();
        // date + benchmark + six tickers
        assert_eq!(frame.width(), 8);
        assert!(frame.height() > 500);

        let mut store = PriceStore::new();
        store.load(frame).unwrap();
        let spec = WindowSpec::monthly(params.start, params.first_end, params.periods).unwrap();
        let engine = BetaEngine::new(params.tickers, params.benchmark);
        let series = engine.beta_series(&store, &spec).unwrap();
        assert_eq!(series.len(), 24);
    }

    #[test]
    fn test_synthetic_prices_are_deterministic_per_seed() {
        let params = RunParams::default();
        let last_end = NaiveDate::from_ymd_opt(2021, 1, 31).unwrap();
        let a = synthetic_prices(&params, last_end, 11).unwrap();
        let b = synthetic_prices(&params, last_end, 11).unwrap();
        assert_eq!(a, b);
    }
}
