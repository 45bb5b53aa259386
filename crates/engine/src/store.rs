//! Price store: the loaded table of daily adjusted closes.
//!
//! The store holds one wide DataFrame: a `date` column of ISO 8601
//! date strings (ascending, unique) plus one `Float64` adjusted-close
//! column per ticker or index symbol. Dates on which a symbol did not
//! trade are nulls, never zeros. The table is populated once by the
//! retrieval collaborator before any computation and is immutable for
//! the rest of the engine run.

use crate::{BetaError, Result, window::Window};
use polars::prelude::*;

/// Name of the shared date-axis column.
pub const DATE_COLUMN: &str = "date";

/// A load-once, slice-many table of adjusted-close prices.
#[derive(Debug, Default)]
pub struct PriceStore {
    data: Option<DataFrame>,
}

impl PriceStore {
    /// Create an empty, unloaded store.
    pub const fn new() -> Self {
        Self { data: None }
    }

    /// Populate the store with a price frame.
    ///
    /// The frame must carry a [`DATE_COLUMN`] of ISO 8601 date strings
    /// in strictly ascending order (which also enforces uniqueness).
    /// ISO strings sort lexicographically in date order, so all later
    /// range filtering works on the strings directly.
    pub fn load(&mut self, frame: DataFrame) -> Result<()> {
        let dates = frame
            .column(DATE_COLUMN)
            .map_err(|_| BetaError::InvalidPriceTable {
                reason: format!("missing '{DATE_COLUMN}' column"),
            })?
            .str()
            .map_err(|_| BetaError::InvalidPriceTable {
                reason: format!("'{DATE_COLUMN}' column must hold ISO 8601 date strings"),
            })?
            .clone();

        let mut previous: Option<&str> = None;
        for value in dates.iter() {
            let Some(date) = value else {
                return Err(BetaError::InvalidPriceTable {
                    reason: format!("null entry in '{DATE_COLUMN}' column"),
                });
            };
            if previous.is_some_and(|p| p >= date) {
                return Err(BetaError::InvalidPriceTable {
                    reason: format!("'{DATE_COLUMN}' column is not strictly ascending at {date}"),
                });
            }
            previous = Some(date);
        }

        self.data = Some(frame);
        Ok(())
    }

    /// Whether [`load`](Self::load) has ever succeeded.
    pub const fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    /// Symbols (non-date columns) currently loaded.
    pub fn symbols(&self) -> Vec<String> {
        self.data.as_ref().map_or_else(Vec::new, |frame| {
            frame
                .get_column_names()
                .iter()
                .filter(|name| name.as_str() != DATE_COLUMN)
                .map(|name| name.to_string())
                .collect()
        })
    }

    /// Rows of the table with date inside `window` (inclusive),
    /// restricted to the requested symbols.
    ///
    /// Rows where any requested symbol is null are dropped, so every
    /// return series later derived from the slice shares one
    /// fully-observed date axis and all series have equal length.
    ///
    /// Fails with [`BetaError::DataNotLoaded`] if the store was never
    /// populated, [`BetaError::MissingSymbol`] if a requested column is
    /// absent, and [`BetaError::EmptySlice`] if the filter leaves zero
    /// rows.
    pub fn slice(&self, symbols: &[&str], window: Window) -> Result<DataFrame> {
        let frame = self.data.as_ref().ok_or(BetaError::DataNotLoaded)?;

        let loaded = frame.get_column_names();
        for symbol in symbols {
            if !loaded.iter().any(|name| name.as_str() == *symbol) {
                return Err(BetaError::MissingSymbol {
                    symbol: (*symbol).to_string(),
                });
            }
        }

        let mut selection: Vec<Expr> = Vec::with_capacity(symbols.len() + 1);
        selection.push(col(DATE_COLUMN));
        selection.extend(symbols.iter().map(|symbol| col(*symbol)));

        let sliced = frame
            .clone()
            .lazy()
            .filter(
                col(DATE_COLUMN)
                    .gt_eq(lit(window.start.to_string()))
                    .and(col(DATE_COLUMN).lt_eq(lit(window.end.to_string()))),
            )
            .select(selection)
            .drop_nulls(None)
            .collect()?;

        if sliced.height() == 0 {
            return Err(BetaError::EmptySlice { window });
        }
        Ok(sliced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn loaded_store() -> PriceStore {
        let frame = df![
            DATE_COLUMN => ["2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05"],
            "^GSPC" => [100.0, 101.0, 102.0, 100.5],
            "SCGLY" => [50.0, 51.0, 51.0, 49.5],
        ]
        .unwrap();
        let mut store = PriceStore::new();
        store.load(frame).unwrap();
        store
    }

    #[test]
    fn test_unloaded_store_refuses_to_slice() {
        let store = PriceStore::new();
        let window = Window::new(date(2024, 1, 2), date(2024, 1, 5));
        let err = store.slice(&["^GSPC"], window).unwrap_err();
        assert!(matches!(err, BetaError::DataNotLoaded));
    }

    #[test]
    fn test_slice_is_inclusive_of_both_bounds() {
        let store = loaded_store();
        let window = Window::new(date(2024, 1, 3), date(2024, 1, 4));
        let slice = store.slice(&["^GSPC", "SCGLY"], window).unwrap();
        assert_eq!(slice.height(), 2);
        let dates: Vec<Option<&str>> = slice
            .column(DATE_COLUMN)
            .unwrap()
            .str()
            .unwrap()
            .iter()
            .collect();
        assert_eq!(dates, vec![Some("2024-01-03"), Some("2024-01-04")]);
    }

    #[test]
    fn test_missing_symbol_is_named() {
        let store = loaded_store();
        let window = Window::new(date(2024, 1, 2), date(2024, 1, 5));
        let err = store.slice(&["^GSPC", "BNPQY"], window).unwrap_err();
        match err {
            BetaError::MissingSymbol { symbol } => assert_eq!(symbol, "BNPQY"),
            other => panic!("expected MissingSymbol, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_slice_for_out_of_range_window() {
        let store = loaded_store();
        let window = Window::new(date(2030, 1, 1), date(2030, 12, 31));
        let err = store.slice(&["^GSPC"], window).unwrap_err();
        assert!(matches!(err, BetaError::EmptySlice { .. }));
    }

    #[test]
    fn test_null_rows_dropped_jointly_across_requested_symbols() {
        let frame = df![
            DATE_COLUMN => ["2024-01-02", "2024-01-03", "2024-01-04"],
            "^GSPC" => [Some(100.0), Some(101.0), Some(102.0)],
            "SCGLY" => [Some(50.0), None, Some(51.0)],
        ]
        .unwrap();
        let mut store = PriceStore::new();
        store.load(frame).unwrap();

        let window = Window::new(date(2024, 1, 2), date(2024, 1, 4));
        let slice = store.slice(&["^GSPC", "SCGLY"], window).unwrap();
        // The 2024-01-03 row disappears for both symbols, keeping the
        // date axes aligned.
        assert_eq!(slice.height(), 2);

        // Slicing only the fully-observed symbol keeps all three rows.
        let slice = store.slice(&["^GSPC"], window).unwrap();
        assert_eq!(slice.height(), 3);
    }

    #[test]
    fn test_load_rejects_missing_date_column() {
        let frame = df!["^GSPC" => [100.0, 101.0]].unwrap();
        let err = PriceStore::new().load(frame).unwrap_err();
        assert!(matches!(err, BetaError::InvalidPriceTable { .. }));
    }

    #[test]
    fn test_load_rejects_unsorted_dates() {
        let frame = df![
            DATE_COLUMN => ["2024-01-03", "2024-01-02"],
            "^GSPC" => [101.0, 100.0],
        ]
        .unwrap();
        let err = PriceStore::new().load(frame).unwrap_err();
        assert!(matches!(err, BetaError::InvalidPriceTable { .. }));
    }

    #[test]
    fn test_load_rejects_duplicate_dates() {
        let frame = df![
            DATE_COLUMN => ["2024-01-02", "2024-01-02"],
            "^GSPC" => [100.0, 100.0],
        ]
        .unwrap();
        let err = PriceStore::new().load(frame).unwrap_err();
        assert!(matches!(err, BetaError::InvalidPriceTable { .. }));
    }

    #[test]
    fn test_symbols_lists_non_date_columns() {
        let store = loaded_store();
        let mut symbols = store.symbols();
        symbols.sort();
        assert_eq!(symbols, vec!["SCGLY".to_string(), "^GSPC".to_string()]);
        assert!(PriceStore::new().symbols().is_empty());
    }
}
