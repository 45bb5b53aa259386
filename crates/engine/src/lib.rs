//! Rolling market-beta computation engine.
//!
//! Given a loaded table of daily adjusted-close prices, a benchmark
//! index and a sequence of date windows sharing one fixed start, the
//! engine computes a covariance-over-variance beta per ticker per
//! window and assembles the results into an ordered time series.
//!
//! The engine performs no I/O of its own: prices arrive fully loaded
//! in a [`PriceStore`], and the resulting [`BetaTimeSeries`] is handed
//! to whatever renders or stores it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod returns;
pub mod store;
pub mod window;

// Re-export core types
pub use engine::{BetaEngine, BetaRow, BetaTimeSeries, EngineConfig};
pub use error::{BetaError, Result};
pub use store::{DATE_COLUMN, PriceStore};
pub use window::{Window, WindowSpec};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
