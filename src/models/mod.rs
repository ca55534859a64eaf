//! Forecasting backends behind a common capability interface.

mod additive;
mod arima;
mod diff;
mod moving_average;
mod naive;
mod sarima;

pub use additive::AdditiveSeasonal;
pub use arima::Arima;
pub use moving_average::MovingAverage;
pub use naive::Naive;
pub use sarima::Sarima;

use crate::core::{Forecast, SalesSeries};
use crate::error::Result;

/// Common interface for all forecasting backends.
///
/// Object-safe, so backends can be selected at runtime and swapped in tests.
pub trait Forecaster {
    /// Fit the model to the sales series.
    fn fit(&mut self, series: &SalesSeries) -> Result<()>;

    /// Generate point predictions for the specified horizon.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// Generate predictions with prediction-interval bounds at `level`
    /// (e.g. 0.80 for an 80% interval). Backends without native intervals
    /// fall back to point predictions.
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let _ = level;
        self.predict(horizon)
    }

    /// In-sample predictions, when available after fitting.
    fn fitted_values(&self) -> Option<&[f64]>;

    /// In-sample residuals (actual minus fitted), when available.
    fn residuals(&self) -> Option<&[f64]>;

    /// Backend display name.
    fn name(&self) -> &str;

    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

impl<F: Forecaster + ?Sized> Forecaster for Box<F> {
    fn fit(&mut self, series: &SalesSeries) -> Result<()> {
        (**self).fit(series)
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        (**self).predict(horizon)
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        (**self).predict_with_intervals(horizon, level)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        (**self).fitted_values()
    }

    fn residuals(&self) -> Option<&[f64]> {
        (**self).residuals()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_fitted(&self) -> bool {
        (**self).is_fitted()
    }
}

/// Type alias for boxed forecaster trait objects.
pub type BoxedForecaster = Box<dyn Forecaster>;

/// The available forecasting backends, with their default parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Repeat the last observed value.
    Naive,
    /// Mean of the trailing 7-day window.
    MovingAverage,
    /// ARIMA(1,1,1).
    Arima,
    /// SARIMA(1,1,1)(1,1,1,7).
    Sarima,
    /// Additive linear trend plus weekly seasonality.
    AdditiveSeasonal,
}

impl Backend {
    /// All backends, in comparison-report order.
    pub const ALL: [Backend; 5] = [
        Backend::Naive,
        Backend::MovingAverage,
        Backend::Arima,
        Backend::Sarima,
        Backend::AdditiveSeasonal,
    ];

    /// Create a fresh, unfitted model instance.
    pub fn create(&self) -> BoxedForecaster {
        match self {
            Backend::Naive => Box::new(Naive::new()),
            Backend::MovingAverage => Box::new(MovingAverage::new(7)),
            Backend::Arima => Box::new(Arima::new(1, 1, 1)),
            Backend::Sarima => Box::new(Sarima::new((1, 1, 1), (1, 1, 1, 7))),
            Backend::AdditiveSeasonal => Box::new(AdditiveSeasonal::new()),
        }
    }

    /// Display name, matching the model's own `name()`.
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Naive => "Naive",
            Backend::MovingAverage => "MovingAverage",
            Backend::Arima => "ARIMA",
            Backend::Sarima => "SARIMA",
            Backend::AdditiveSeasonal => "AdditiveSeasonal",
        }
    }

    /// Whether the backend produces native prediction intervals.
    pub fn has_intervals(&self) -> bool {
        !matches!(self, Backend::MovingAverage)
    }
}
