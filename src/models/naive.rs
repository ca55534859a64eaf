//! Naive forecaster: repeat the last observed value.

use crate::core::{Forecast, SalesSeries};
use crate::error::{DemandError, Result};
use crate::models::Forecaster;
use crate::utils::stats::quantile_normal;
use chrono::{Duration, NaiveDate};

/// Forecasts `horizon` copies of the last observed value.
#[derive(Debug, Clone, Default)]
pub struct Naive {
    last_value: Option<f64>,
    end_date: Option<NaiveDate>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl Naive {
    pub fn new() -> Self {
        Self::default()
    }

    fn future_dates(&self, horizon: usize) -> Result<Vec<NaiveDate>> {
        let end = self.end_date.ok_or(DemandError::FitRequired)?;
        Ok((1..=horizon as i64).map(|d| end + Duration::days(d)).collect())
    }
}

impl Forecaster for Naive {
    fn fit(&mut self, series: &SalesSeries) -> Result<()> {
        let values = series.values();
        if values.is_empty() {
            return Err(DemandError::EmptyData);
        }

        self.last_value = Some(series.last_value());
        self.end_date = Some(series.end_date());

        // Fitted values are yesterday's sales; the first day has no fit.
        let mut fitted = Vec::with_capacity(values.len());
        fitted.push(f64::NAN);
        fitted.extend_from_slice(&values[..values.len() - 1]);
        self.fitted = Some(fitted);

        // Residuals are first differences.
        let residuals: Vec<f64> = (0..values.len())
            .map(|i| {
                if i == 0 {
                    f64::NAN
                } else {
                    values[i] - values[i - 1]
                }
            })
            .collect();
        self.residuals = Some(residuals);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let last = self.last_value.ok_or(DemandError::FitRequired)?;
        if horizon == 0 {
            return Ok(Forecast::empty());
        }
        Forecast::from_points(self.future_dates(horizon)?, vec![last; horizon])
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let last = self.last_value.ok_or(DemandError::FitRequired)?;
        if horizon == 0 {
            return Ok(Forecast::empty());
        }

        let residuals = self.residuals.as_ref().ok_or(DemandError::FitRequired)?;
        let valid: Vec<f64> = residuals.iter().copied().filter(|r| r.is_finite()).collect();
        if valid.is_empty() {
            return self.predict(horizon);
        }

        let sigma = (valid.iter().map(|r| r * r).sum::<f64>() / valid.len() as f64).sqrt();
        let z = quantile_normal((1.0 + level) / 2.0);

        let mut point = Vec::with_capacity(horizon);
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        for h in 1..=horizon {
            // Random-walk interval widens with sqrt(h).
            let se = sigma * (h as f64).sqrt();
            point.push(last);
            lower.push(last - z * se);
            upper.push(last + z * se);
        }

        Forecast::with_intervals(self.future_dates(horizon)?, point, lower, upper)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "Naive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_series(values: Vec<f64>) -> SalesSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        SalesSeries::new(start, values).unwrap()
    }

    #[test]
    fn repeats_last_value() {
        let mut model = Naive::new();
        model.fit(&make_series(vec![1.0, 2.0, 3.0, 4.0, 5.0])).unwrap();

        let forecast = model.predict(3).unwrap();
        assert_eq!(forecast.point(), &[5.0, 5.0, 5.0]);
    }

    #[test]
    fn forecast_dates_continue_the_index() {
        let mut model = Naive::new();
        let series = make_series(vec![1.0, 2.0, 3.0]);
        model.fit(&series).unwrap();

        let forecast = model.predict(2).unwrap();
        assert_eq!(forecast.dates()[0], NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert_eq!(forecast.dates()[1], NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn fitted_values_are_shifted_history() {
        let mut model = Naive::new();
        model.fit(&make_series(vec![1.0, 2.0, 3.0, 4.0])).unwrap();

        let fitted = model.fitted_values().unwrap();
        assert!(fitted[0].is_nan());
        assert_eq!(&fitted[1..], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn residuals_are_first_differences() {
        let mut model = Naive::new();
        model.fit(&make_series(vec![1.0, 3.0, 6.0, 10.0])).unwrap();

        let residuals = model.residuals().unwrap();
        assert!(residuals[0].is_nan());
        assert_eq!(&residuals[1..], &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn intervals_widen_with_horizon() {
        let values: Vec<f64> = (0..10).map(|i| i as f64 + 0.2 * (i as f64).sin()).collect();
        let mut model = Naive::new();
        model.fit(&make_series(values)).unwrap();

        let forecast = model.predict_with_intervals(5, 0.95).unwrap();
        let lower = forecast.lower().unwrap();
        let upper = forecast.upper().unwrap();
        for i in 1..5 {
            assert!(upper[i] - lower[i] > upper[i - 1] - lower[i - 1]);
        }
    }

    #[test]
    fn zero_horizon_returns_empty() {
        let mut model = Naive::new();
        model.fit(&make_series(vec![1.0, 2.0])).unwrap();
        let forecast = model.predict(0).unwrap();
        assert!(forecast.is_empty());
    }

    #[test]
    fn predict_requires_fit() {
        let model = Naive::new();
        assert!(matches!(model.predict(3), Err(DemandError::FitRequired)));
    }
}
