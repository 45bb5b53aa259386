//! Rolling-beta computation: per-window math and series orchestration.
//!
//! Beta measures the sensitivity of a ticker's returns to benchmark
//! returns: `β = Cov(R_t, R_b) / Var(R_b)`. The engine computes one
//! beta per configured ticker for each window of a [`WindowSpec`] and
//! assembles them into a [`BetaTimeSeries`] ordered by window end date.

use crate::{
    BetaError, Result,
    returns::{column_values, sample_covariance, sample_variance, simple_returns},
    store::{DATE_COLUMN, PriceStore},
    window::{Window, WindowSpec},
};
use chrono::NaiveDate;
use polars::prelude::*;

/// Run parameters for a beta engine: which tickers to compute and
/// which index to measure them against.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EngineConfig {
    /// Tickers to compute betas for, in output-column order.
    pub tickers: Vec<String>,
    /// Benchmark index symbol, e.g. `^GSPC`.
    pub benchmark: String,
}

/// One computed row: the betas of every configured ticker for a single
/// window end date.
#[derive(Debug, Clone, PartialEq)]
pub struct BetaRow {
    /// End date of the window this row was computed over.
    pub end: NaiveDate,
    /// Rounded betas, positionally aligned with the engine's tickers.
    pub betas: Vec<f64>,
}

/// The engine's final output: rows ordered by window end date with a
/// stable ticker-to-column mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct BetaTimeSeries {
    tickers: Vec<String>,
    rows: Vec<BetaRow>,
}

impl BetaTimeSeries {
    /// Ticker order shared by every row.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Computed rows, ordered by end date.
    pub fn rows(&self) -> &[BetaRow] {
        &self.rows
    }

    /// Number of computed rows.
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether every window of the run failed (or none were computed).
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Materialize the series as a DataFrame: a `date` column of
    /// window end dates plus one beta column per ticker.
    ///
    /// Built once here from the accumulated rows; the engine never
    /// concatenates intermediate frames.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.tickers.len() + 1);
        let dates: Vec<String> = self.rows.iter().map(|row| row.end.to_string()).collect();
        columns.push(Column::new(DATE_COLUMN.into(), dates));
        for (index, ticker) in self.tickers.iter().enumerate() {
            let betas: Vec<f64> = self.rows.iter().map(|row| row.betas[index]).collect();
            columns.push(Column::new(ticker.as_str().into(), betas));
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Computes rolling betas for a fixed set of tickers against one
/// benchmark index.
#[derive(Debug, Clone)]
pub struct BetaEngine {
    config: EngineConfig,
}

impl BetaEngine {
    /// Create an engine for the given tickers and benchmark.
    pub fn new(tickers: Vec<String>, benchmark: impl Into<String>) -> Self {
        Self {
            config: EngineConfig {
                tickers,
                benchmark: benchmark.into(),
            },
        }
    }

    /// Create an engine from an existing config.
    pub const fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The engine's run parameters.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute one beta per configured ticker over a single window.
    ///
    /// Slices the store to `[window.start, window.end]` for the
    /// benchmark and every ticker, derives the benchmark return series
    /// once, then for each ticker in configured order derives its
    /// return series and computes
    /// `sample_cov(ticker, benchmark) / sample_var(benchmark)`,
    /// rounded to two decimals.
    ///
    /// The window is all-or-nothing: the first ticker that fails
    /// ([`BetaError::InsufficientData`], [`BetaError::MissingSymbol`])
    /// aborts the whole window and no partial row is returned.
    pub fn window_beta(&self, store: &PriceStore, window: Window) -> Result<BetaRow> {
        let mut symbols: Vec<&str> = Vec::with_capacity(self.config.tickers.len() + 1);
        symbols.push(self.config.benchmark.as_str());
        for ticker in &self.config.tickers {
            // A ticker measured against itself shares the benchmark
            // column; request each column once.
            if !symbols.contains(&ticker.as_str()) {
                symbols.push(ticker.as_str());
            }
        }
        let slice = store.slice(&symbols, window)?;

        let benchmark_prices = column_values(&slice, &self.config.benchmark)?;
        let benchmark_returns = simple_returns(&benchmark_prices);

        let mut betas = Vec::with_capacity(self.config.tickers.len());
        for ticker in &self.config.tickers {
            let prices = column_values(&slice, ticker)?;
            let returns = simple_returns(&prices);

            if returns.len() < 2 || benchmark_returns.len() < 2 {
                let (symbol, observations) = if benchmark_returns.len() < 2 {
                    (self.config.benchmark.clone(), benchmark_returns.len())
                } else {
                    (ticker.clone(), returns.len())
                };
                return Err(BetaError::InsufficientData {
                    symbol,
                    window,
                    observations,
                });
            }

            let beta = sample_covariance(&returns, &benchmark_returns)
                / sample_variance(&benchmark_returns);
            betas.push(round_to_cents(beta));
        }

        Ok(BetaRow {
            end: window.end,
            betas,
        })
    }

    /// Compute the full beta time series over a window spec.
    ///
    /// Windows are processed strictly in end-date order. A window-level
    /// failure (missing symbol, empty slice, insufficient data) is
    /// logged and its row omitted; the remaining windows still run.
    /// Series-level failures ([`BetaError::DataNotLoaded`]) abort the
    /// whole run. The non-empty end-date precondition is enforced by
    /// [`WindowSpec`] construction.
    ///
    /// Output rows keep the input end-date order, minus skipped
    /// windows.
    pub fn beta_series(&self, store: &PriceStore, spec: &WindowSpec) -> Result<BetaTimeSeries> {
        let mut rows = Vec::with_capacity(spec.len());
        for window in spec.windows() {
            match self.window_beta(store, window) {
                Ok(row) => {
                    for (ticker, beta) in self.config.tickers.iter().zip(&row.betas) {
                        tracing::info!(end = %row.end, %ticker, beta, "computed beta");
                    }
                    rows.push(row);
                }
                Err(err) if err.is_window_level() => {
                    tracing::warn!(%window, error = %err, "window skipped");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(BetaTimeSeries {
            tickers: self.config.tickers.clone(),
            rows,
        })
    }
}

/// Round to two decimal places, matching the presentation precision of
/// the output table.
fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
