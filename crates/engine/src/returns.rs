//! Return-series derivation and the covariance/variance primitives.
//!
//! Betas are ratios of second moments of *returns*, never of prices.
//! Both statistics use the sample (n-1) definition so the ratio is
//! internally consistent.

use crate::Result;
use polars::prelude::*;

/// Simple period-over-period returns: `r[i-1] = p[i] / p[i-1] - 1`.
///
/// Yields `n - 1` returns for `n` prices; fewer than two prices yield
/// an empty series.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|pair| pair[1] / pair[0] - 1.0)
        .collect()
}

/// Sample covariance of two equal-length series (n-1 divisor).
///
/// Callers guarantee `xs.len() == ys.len() >= 2`; both series come
/// from the same date-aligned price slice.
pub fn sample_covariance(xs: &[f64], ys: &[f64]) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len() as f64;
    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = ys.iter().sum::<f64>() / n;
    xs.iter()
        .zip(ys)
        .map(|(x, y)| (x - x_mean) * (y - y_mean))
        .sum::<f64>()
        / (n - 1.0)
}

/// Sample variance (n-1 divisor).
pub fn sample_variance(xs: &[f64]) -> f64 {
    sample_covariance(xs, xs)
}

/// Extract a symbol's adjusted-close values from a price slice.
///
/// The slice has already had null rows dropped, so the column is dense.
pub fn column_values(slice: &DataFrame, symbol: &str) -> Result<Vec<f64>> {
    let values = slice.column(symbol)?.f64()?;
    Ok(values.into_no_null_iter().collect())
}
