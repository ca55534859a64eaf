//! Calendar-daily sales series.

use crate::error::{DemandError, Result};
use chrono::{Datelike, Duration, NaiveDate};

/// A per-store daily sales series with a strictly increasing, contiguous
/// calendar-day index.
///
/// Construction from raw observations fills calendar gaps with zero sales (the
/// convention for missing days in retail transaction extracts) and remembers
/// how many days were filled, so data-quality reporting can surface it.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesSeries {
    start: NaiveDate,
    values: Vec<f64>,
    filled_gaps: usize,
}

impl SalesSeries {
    /// Create a series from already-contiguous daily values starting at `start`.
    pub fn new(start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(DemandError::EmptyData);
        }
        Ok(Self {
            start,
            values,
            filled_gaps: 0,
        })
    }

    /// Build a series from dated observations.
    ///
    /// Observations are sorted by date; duplicate dates are rejected. Any
    /// calendar day between the first and last observation without a record
    /// gets a zero value.
    pub fn from_observations(mut observations: Vec<(NaiveDate, f64)>) -> Result<Self> {
        if observations.is_empty() {
            return Err(DemandError::EmptyData);
        }
        observations.sort_by_key(|(date, _)| *date);

        for pair in observations.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(DemandError::DateIndex(format!(
                    "duplicate date: {}",
                    pair[0].0
                )));
            }
        }

        let start = observations[0].0;
        let end = observations[observations.len() - 1].0;
        let n = (end - start).num_days() as usize + 1;

        let mut values = vec![0.0; n];
        for (date, value) in &observations {
            let idx = (*date - start).num_days() as usize;
            values[idx] = *value;
        }

        let filled_gaps = n - observations.len();
        Ok(Self {
            start,
            values,
            filled_gaps,
        })
    }

    /// Number of days in the series.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the series holds no observations. Construction rejects empty
    /// input, so this is only reachable through `Default`-less manipulation in
    /// tests; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First date of the index.
    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    /// Last date of the index.
    pub fn end_date(&self) -> NaiveDate {
        self.start + Duration::days(self.len() as i64 - 1)
    }

    /// Date at position `index`.
    pub fn date_at(&self, index: usize) -> NaiveDate {
        self.start + Duration::days(index as i64)
    }

    /// Day-of-week at position `index`, as 0 = Monday .. 6 = Sunday.
    pub fn weekday_at(&self, index: usize) -> usize {
        self.date_at(index).weekday().num_days_from_monday() as usize
    }

    /// The daily values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Last observed value.
    pub fn last_value(&self) -> f64 {
        *self.values.last().unwrap_or(&f64::NAN)
    }

    /// How many calendar days were zero-filled during construction.
    pub fn filled_gaps(&self) -> usize {
        self.filled_gaps
    }

    /// The trailing `n` values (the whole series when `n >= len`).
    pub fn tail(&self, n: usize) -> &[f64] {
        let start = self.len().saturating_sub(n);
        &self.values[start..]
    }

    /// Sub-series over `[start, end)` positions, preserving the date index.
    pub fn slice(&self, start: usize, end: usize) -> Result<SalesSeries> {
        if start >= end || end > self.len() {
            return Err(DemandError::InvalidParameter(format!(
                "invalid slice range {start}..{end} for series of length {}",
                self.len()
            )));
        }
        Ok(SalesSeries {
            start: self.date_at(start),
            values: self.values[start..end].to_vec(),
            filled_gaps: 0,
        })
    }

    /// The `horizon` dates immediately following the series.
    pub fn future_dates(&self, horizon: usize) -> Vec<NaiveDate> {
        let end = self.end_date();
        (1..=horizon as i64).map(|d| end + Duration::days(d)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn from_observations_sorts_and_fills_gaps() {
        let series = SalesSeries::from_observations(vec![
            (date(2024, 1, 5), 50.0),
            (date(2024, 1, 1), 10.0),
            (date(2024, 1, 3), 30.0),
        ])
        .unwrap();

        assert_eq!(series.len(), 5);
        assert_eq!(series.start_date(), date(2024, 1, 1));
        assert_eq!(series.end_date(), date(2024, 1, 5));
        assert_eq!(series.values(), &[10.0, 0.0, 30.0, 0.0, 50.0]);
        assert_eq!(series.filled_gaps(), 2);
    }

    #[test]
    fn from_observations_rejects_duplicates() {
        let result = SalesSeries::from_observations(vec![
            (date(2024, 1, 1), 10.0),
            (date(2024, 1, 1), 20.0),
        ]);
        assert!(matches!(result, Err(DemandError::DateIndex(_))));
    }

    #[test]
    fn from_observations_rejects_empty() {
        assert!(matches!(
            SalesSeries::from_observations(vec![]),
            Err(DemandError::EmptyData)
        ));
    }

    #[test]
    fn contiguous_construction_has_no_gaps() {
        let series = SalesSeries::new(date(2024, 1, 1), vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(series.filled_gaps(), 0);
        assert_eq!(series.last_value(), 3.0);
    }

    #[test]
    fn date_index_is_contiguous() {
        let series = SalesSeries::new(date(2024, 1, 30), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(series.date_at(0), date(2024, 1, 30));
        assert_eq!(series.date_at(2), date(2024, 2, 1));
        assert_eq!(series.end_date(), date(2024, 2, 2));
    }

    #[test]
    fn weekday_index_is_monday_based() {
        // 2024-01-01 was a Monday.
        let series = SalesSeries::new(date(2024, 1, 1), vec![0.0; 8]).unwrap();
        assert_eq!(series.weekday_at(0), 0);
        assert_eq!(series.weekday_at(6), 6);
        assert_eq!(series.weekday_at(7), 0);
    }

    #[test]
    fn tail_degrades_to_full_series() {
        let series = SalesSeries::new(date(2024, 1, 1), vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(series.tail(2), &[2.0, 3.0]);
        assert_eq!(series.tail(10), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn slice_preserves_dates() {
        let series = SalesSeries::new(date(2024, 1, 1), vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let sub = series.slice(1, 4).unwrap();
        assert_eq!(sub.start_date(), date(2024, 1, 2));
        assert_eq!(sub.values(), &[2.0, 3.0, 4.0]);
        assert_relative_eq!(sub.last_value(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn slice_rejects_bad_ranges() {
        let series = SalesSeries::new(date(2024, 1, 1), vec![1.0, 2.0, 3.0]).unwrap();
        assert!(series.slice(2, 2).is_err());
        assert!(series.slice(0, 4).is_err());
    }

    #[test]
    fn future_dates_continue_the_index() {
        let series = SalesSeries::new(date(2024, 1, 1), vec![1.0, 2.0]).unwrap();
        let future = series.future_dates(3);
        assert_eq!(
            future,
            vec![date(2024, 1, 3), date(2024, 1, 4), date(2024, 1, 5)]
        );
    }
}
