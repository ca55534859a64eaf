//! Additive trend-plus-seasonality forecaster.

use crate::core::{Forecast, SalesSeries};
use crate::error::{DemandError, Result};
use crate::models::Forecaster;
use crate::utils::stats::quantile_normal;
use chrono::{Duration, NaiveDate};

/// Additive decomposition model: a linear trend fit by least squares plus a
/// weekly seasonal component estimated from day-of-week means of the
/// detrended series.
///
/// Two weeks of data is the minimum, so every weekday is observed at least
/// twice. Prediction intervals come from the in-sample residual spread and
/// default to the 80% level when requested through the pipeline.
#[derive(Debug, Clone)]
pub struct AdditiveSeasonal {
    slope: f64,
    intercept: f64,
    /// Seasonal effect indexed by weekday, 0 = Monday.
    weekday_effects: [f64; 7],
    start_weekday: usize,
    n_obs: usize,
    end_date: Option<NaiveDate>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    residual_sigma: Option<f64>,
}

impl AdditiveSeasonal {
    pub fn new() -> Self {
        Self {
            slope: 0.0,
            intercept: 0.0,
            weekday_effects: [0.0; 7],
            start_weekday: 0,
            n_obs: 0,
            end_date: None,
            fitted: None,
            residuals: None,
            residual_sigma: None,
        }
    }

    fn trend_at(&self, t: usize) -> f64 {
        self.intercept + self.slope * t as f64
    }
}

impl Default for AdditiveSeasonal {
    fn default() -> Self {
        Self::new()
    }
}

impl Forecaster for AdditiveSeasonal {
    fn fit(&mut self, series: &SalesSeries) -> Result<()> {
        let values = series.values();
        let n = values.len();
        if n < 14 {
            return Err(DemandError::InsufficientData { needed: 14, got: n });
        }

        // Closed-form OLS on t = 0..n.
        let nf = n as f64;
        let t_mean = (nf - 1.0) / 2.0;
        let y_mean = values.iter().sum::<f64>() / nf;
        let mut num = 0.0;
        let mut den = 0.0;
        for (t, &y) in values.iter().enumerate() {
            let dt = t as f64 - t_mean;
            num += dt * (y - y_mean);
            den += dt * dt;
        }
        self.slope = if den > 0.0 { num / den } else { 0.0 };
        self.intercept = y_mean - self.slope * t_mean;
        self.start_weekday = series.weekday_at(0);
        self.n_obs = n;

        // Day-of-week means of the detrended series, centered so the
        // effects sum to zero over a full week.
        let mut sums = [0.0; 7];
        let mut counts = [0usize; 7];
        for (t, &y) in values.iter().enumerate() {
            let weekday = (self.start_weekday + t) % 7;
            sums[weekday] += y - self.trend_at(t);
            counts[weekday] += 1;
        }
        let mut effects = [0.0; 7];
        for i in 0..7 {
            if counts[i] > 0 {
                effects[i] = sums[i] / counts[i] as f64;
            }
        }
        let effect_mean = effects.iter().sum::<f64>() / 7.0;
        for e in effects.iter_mut() {
            *e -= effect_mean;
        }
        self.weekday_effects = effects;

        let fitted: Vec<f64> = (0..n)
            .map(|t| self.trend_at(t) + self.weekday_effects[(self.start_weekday + t) % 7])
            .collect();
        let residuals: Vec<f64> = values
            .iter()
            .zip(fitted.iter())
            .map(|(y, f)| y - f)
            .collect();

        let variance = residuals.iter().map(|r| r * r).sum::<f64>() / residuals.len() as f64;
        self.residual_sigma = Some(variance.sqrt());
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        self.end_date = Some(series.end_date());

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let end = self.end_date.ok_or(DemandError::FitRequired)?;
        if horizon == 0 {
            return Ok(Forecast::empty());
        }

        let mut dates = Vec::with_capacity(horizon);
        let mut point = Vec::with_capacity(horizon);
        for h in 1..=horizon {
            let t = self.n_obs + h - 1;
            dates.push(end + Duration::days(h as i64));
            point.push(self.trend_at(t) + self.weekday_effects[(self.start_weekday + t) % 7]);
        }
        Forecast::from_points(dates, point)
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let forecast = self.predict(horizon)?;
        if horizon == 0 {
            return Ok(forecast);
        }

        let sigma = self.residual_sigma.unwrap_or(0.0);
        let z = quantile_normal((1.0 + level) / 2.0);
        let margin = z * sigma;

        let point = forecast.point();
        let lower: Vec<f64> = point.iter().map(|p| p - margin).collect();
        let upper: Vec<f64> = point.iter().map(|p| p + margin).collect();
        Forecast::with_intervals(forecast.dates().to_vec(), point.to_vec(), lower, upper)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "AdditiveSeasonal"
    }
}
