//! Error types for beta computations.

use crate::window::Window;
use thiserror::Error;

/// Result type for beta engine operations.
pub type Result<T> = std::result::Result<T, BetaError>;

/// Errors that can occur while slicing prices or computing betas.
#[derive(Debug, Error)]
pub enum BetaError {
    /// The price store was never populated
    #[error("price store has not been loaded")]
    DataNotLoaded,

    /// A required ticker or benchmark column is absent from the store
    #[error("no price column loaded for symbol '{symbol}'")]
    MissingSymbol {
        /// The absent ticker or benchmark symbol
        symbol: String,
    },

    /// The date filter for a window produced zero rows
    #[error("no price rows inside window {window}")]
    EmptySlice {
        /// The window whose slice came back empty
        window: Window,
    },

    /// The end-date sequence for a series run is empty
    #[error("empty window range: no end dates to compute")]
    EmptyWindowRange,

    /// Fewer than two return observations for a symbol in a window
    #[error(
        "cannot compute beta for '{symbol}' in window {window}: \
         {observations} return observation(s), need at least 2"
    )]
    InsufficientData {
        /// Symbol whose return series is too short
        symbol: String,
        /// The affected window
        window: Window,
        /// Number of return observations actually available
        observations: usize,
    },

    /// A frame offered to the price store failed validation
    #[error("invalid price table: {reason}")]
    InvalidPriceTable {
        /// What the validation found
        reason: String,
    },

    /// Polars DataFrame error
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl BetaError {
    /// Whether this error is fatal to a single window only, as opposed
    /// to the whole series run.
    ///
    /// Window-level failures are reported and skipped by
    /// [`BetaEngine::beta_series`](crate::BetaEngine::beta_series);
    /// everything else aborts the run.
    pub const fn is_window_level(&self) -> bool {
        matches!(
            self,
            Self::MissingSymbol { .. } | Self::EmptySlice { .. } | Self::InsufficientData { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn window() -> Window {
        Window::new(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 1, 31).unwrap(),
        )
    }

    #[test]
    fn test_window_level_classification() {
        assert!(
            BetaError::MissingSymbol {
                symbol: "BNPQY".into()
            }
            .is_window_level()
        );
        assert!(BetaError::EmptySlice { window: window() }.is_window_level());
        assert!(
            BetaError::InsufficientData {
                symbol: "BNPQY".into(),
                window: window(),
                observations: 1
            }
            .is_window_level()
        );
        assert!(!BetaError::DataNotLoaded.is_window_level());
        assert!(!BetaError::EmptyWindowRange.is_window_level());
    }

    #[test]
    fn test_insufficient_data_message_names_symbol_and_window() {
        let err = BetaError::InsufficientData {
            symbol: "SCGLY".into(),
            window: window(),
            observations: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("SCGLY"));
        assert!(msg.contains("2020-01-01"));
        assert!(msg.contains("2021-01-31"));
    }
}
