//! Moving-average forecaster.

use crate::core::{Forecast, SalesSeries};
use crate::error::{DemandError, Result};
use crate::models::Forecaster;
use crate::utils::stats::mean;
use chrono::{Duration, NaiveDate};

/// Forecasts `horizon` copies of the mean of the trailing window.
///
/// When the series is shorter than the window, the mean degrades gracefully
/// to the available tail.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    window: usize,
    forecast_value: Option<f64>,
    end_date: Option<NaiveDate>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl MovingAverage {
    /// Create a moving-average model with the given window size.
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            forecast_value: None,
            end_date: None,
            fitted: None,
            residuals: None,
        }
    }

    /// The configured window size.
    pub fn window(&self) -> usize {
        self.window
    }
}

impl Default for MovingAverage {
    fn default() -> Self {
        Self::new(7)
    }
}

impl Forecaster for MovingAverage {
    fn fit(&mut self, series: &SalesSeries) -> Result<()> {
        let values = series.values();
        if values.is_empty() {
            return Err(DemandError::EmptyData);
        }

        self.forecast_value = Some(mean(series.tail(self.window)));
        self.end_date = Some(series.end_date());

        // In-sample fit: trailing-window mean of *previous* days.
        let mut fitted = Vec::with_capacity(values.len());
        let mut residuals = Vec::with_capacity(values.len());
        for i in 0..values.len() {
            if i == 0 {
                fitted.push(f64::NAN);
                residuals.push(f64::NAN);
                continue;
            }
            let start = i.saturating_sub(self.window);
            let window_mean = mean(&values[start..i]);
            fitted.push(window_mean);
            residuals.push(values[i] - window_mean);
        }
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let value = self.forecast_value.ok_or(DemandError::FitRequired)?;
        let end = self.end_date.ok_or(DemandError::FitRequired)?;
        if horizon == 0 {
            return Ok(Forecast::empty());
        }

        let dates: Vec<NaiveDate> = (1..=horizon as i64).map(|d| end + Duration::days(d)).collect();
        Forecast::from_points(dates, vec![value; horizon])
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "MovingAverage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_series(values: Vec<f64>) -> SalesSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        SalesSeries::new(start, values).unwrap()
    }

    #[test]
    fn forecasts_mean_of_last_window() {
        let mut model = MovingAverage::new(3);
        model
            .fit(&make_series(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]))
            .unwrap();

        let forecast = model.predict(4).unwrap();
        assert_eq!(forecast.horizon(), 4);
        for &p in forecast.point() {
            assert_relative_eq!(p, 5.0, epsilon = 1e-10); // mean of 4, 5, 6
        }
    }

    #[test]
    fn default_window_is_seven() {
        let values: Vec<f64> = (1..=14).map(|i| i as f64).collect();
        let mut model = MovingAverage::default();
        model.fit(&make_series(values)).unwrap();

        let forecast = model.predict(1).unwrap();
        // mean of 8..=14
        assert_relative_eq!(forecast.point()[0], 11.0, epsilon = 1e-10);
    }

    #[test]
    fn short_series_degrades_to_available_tail() {
        let mut model = MovingAverage::new(7);
        model.fit(&make_series(vec![2.0, 4.0, 6.0])).unwrap();

        let forecast = model.predict(2).unwrap();
        assert_relative_eq!(forecast.point()[0], 4.0, epsilon = 1e-10);
    }

    #[test]
    fn window_of_zero_is_clamped_to_one() {
        let model = MovingAverage::new(0);
        assert_eq!(model.window(), 1);
    }

    #[test]
    fn fitted_values_lag_the_series() {
        let mut model = MovingAverage::new(2);
        model.fit(&make_series(vec![2.0, 4.0, 6.0, 8.0])).unwrap();

        let fitted = model.fitted_values().unwrap();
        assert!(fitted[0].is_nan());
        assert_relative_eq!(fitted[1], 2.0, epsilon = 1e-10); // mean of [2]
        assert_relative_eq!(fitted[2], 3.0, epsilon = 1e-10); // mean of [2, 4]
        assert_relative_eq!(fitted[3], 5.0, epsilon = 1e-10); // mean of [4, 6]
    }

    #[test]
    fn predict_requires_fit() {
        let model = MovingAverage::new(7);
        assert!(matches!(model.predict(3), Err(DemandError::FitRequired)));
    }
}
