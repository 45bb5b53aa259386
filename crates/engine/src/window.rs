//! Date windows over which betas are computed.
//!
//! Every window in a series run shares one fixed start date; only the
//! end date advances. Windows therefore overlap by construction, which
//! is what makes the resulting betas "rolling from inception" rather
//! than fixed-width rolling.

use crate::{BetaError, Result};
use chrono::{Datelike, NaiveDate};
use derive_more::Display;

/// An inclusive date range `[start, end]` for one beta computation.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[display("[{start} .. {end}]")]
pub struct Window {
    /// First date included in the slice.
    pub start: NaiveDate,
    /// Last date included in the slice.
    pub end: NaiveDate,
}

impl Window {
    /// Create a window covering `[start, end]` inclusive.
    ///
    /// A reversed window (`end < start`) is representable; its slice is
    /// always empty and the window fails downstream with an
    /// empty-slice error rather than here.
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

/// A fixed start date plus an ordered sequence of window end dates.
///
/// Defines the successive windows `[start, end_0]`, `[start, end_1]`,
/// ... handed to the engine in order. Callers supply end dates
/// ascending and unique, which keeps the output rows uniquely keyed
/// by end date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec {
    start: NaiveDate,
    end_dates: Vec<NaiveDate>,
}

impl WindowSpec {
    /// Build a spec from an explicit end-date sequence.
    ///
    /// Fails with [`BetaError::EmptyWindowRange`] if `end_dates` is
    /// empty; order is preserved exactly as given.
    pub fn new(start: NaiveDate, end_dates: Vec<NaiveDate>) -> Result<Self> {
        if end_dates.is_empty() {
            return Err(BetaError::EmptyWindowRange);
        }
        Ok(Self { start, end_dates })
    }

    /// Build a spec whose end dates are `periods` successive calendar
    /// month ends, beginning with the month of `first_end`.
    ///
    /// `monthly(start, 2021-01-31, 24)` yields end dates
    /// 2021-01-31, 2021-02-28, ... 2022-12-31.
    pub fn monthly(start: NaiveDate, first_end: NaiveDate, periods: usize) -> Result<Self> {
        if periods == 0 {
            return Err(BetaError::EmptyWindowRange);
        }
        let mut end_dates = Vec::with_capacity(periods);
        let (mut year, mut month) = (first_end.year(), first_end.month());
        for _ in 0..periods {
            end_dates.push(month_end(year, month));
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }
        Self::new(start, end_dates)
    }

    /// The shared start date of every window.
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// The ordered end dates.
    pub fn end_dates(&self) -> &[NaiveDate] {
        &self.end_dates
    }

    /// Iterate the windows in end-date order.
    pub fn windows(&self) -> impl Iterator<Item = Window> + '_ {
        self.end_dates.iter().map(|end| Window::new(self.start, *end))
    }

    /// Number of windows in the spec.
    pub const fn len(&self) -> usize {
        self.end_dates.len()
    }

    /// Whether the spec holds no windows. Always false for a
    /// successfully constructed spec.
    pub const fn is_empty(&self) -> bool {
        self.end_dates.is_empty()
    }
}

/// Last calendar day of the given month.
fn month_end(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    // Both dates are valid for any in-range year/month pair.
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(2021, 1, 31)]
    #[case(2021, 2, 28)]
    #[case(2024, 2, 29)]
    #[case(2021, 4, 30)]
    #[case(2021, 12, 31)]
    fn test_month_end(#[case] year: i32, #[case] month: u32, #[case] day: u32) {
        assert_eq!(month_end(year, month), date(year, month, day));
    }

    #[test]
    fn test_monthly_spec_rolls_over_year_boundary() {
        let spec = WindowSpec::monthly(date(2020, 1, 1), date(2021, 1, 31), 24).unwrap();
        assert_eq!(spec.len(), 24);
        assert_eq!(spec.end_dates()[0], date(2021, 1, 31));
        assert_eq!(spec.end_dates()[11], date(2021, 12, 31));
        assert_eq!(spec.end_dates()[12], date(2022, 1, 31));
        assert_eq!(spec.end_dates()[23], date(2022, 12, 31));
    }

    #[test]
    fn test_empty_end_dates_rejected() {
        let err = WindowSpec::new(date(2020, 1, 1), vec![]).unwrap_err();
        assert!(matches!(err, BetaError::EmptyWindowRange));

        let err = WindowSpec::monthly(date(2020, 1, 1), date(2021, 1, 31), 0).unwrap_err();
        assert!(matches!(err, BetaError::EmptyWindowRange));
    }

    #[test]
    fn test_windows_share_start_in_input_order() {
        let ends = vec![date(2021, 1, 31), date(2021, 2, 28), date(2021, 3, 31)];
        let spec = WindowSpec::new(date(2020, 1, 1), ends.clone()).unwrap();
        let windows: Vec<Window> = spec.windows().collect();
        assert_eq!(windows.len(), 3);
        for (window, end) in windows.iter().zip(&ends) {
            assert_eq!(window.start, date(2020, 1, 1));
            assert_eq!(window.end, *end);
        }
    }

    #[test]
    fn test_window_display() {
        let window = Window::new(date(2020, 1, 1), date(2021, 1, 31));
        assert_eq!(window.to_string(), "[2020-01-01 .. 2021-01-31]");
    }
}
